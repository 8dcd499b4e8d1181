//! PLC constraint recovery (spec.md §4.4): segment recovery by flips with a Steiner fallback,
//! facet recovery by half-cavity retetrahedralization with a Steiner fallback, region flooding
//! from ghost tetrahedra, and hole removal.

mod facet_recovery;
mod flip;
mod hole_flood;
mod region_flood;
mod segment_recovery;

use crate::{behavior::Behavior, error::MeshError, mesh::Mesh, plc::Plc};

/// Recovers `plc` into `mesh`, which must already hold the unconstrained Delaunay
/// tetrahedralization of the PLC's vertex set.
pub(crate) fn recover(mesh: &mut Mesh, plc: &Plc, behavior: &Behavior) -> Result<(), MeshError> {
    for (idx, facet) in plc.facets.iter().enumerate() {
        facet_recovery::check_planar(mesh, facet, idx)?;
    }

    let segment_leaves = segment_recovery::recover_segments(mesh, &plc.segments, behavior)?;

    let facet_triangles = facet_recovery::recover_facets(mesh, &plc.facets, behavior)?;

    if behavior.region_attributes {
        region_flood::flood(mesh, &plc.regions, &facet_triangles, behavior)?;
    }

    if !plc.holes.is_empty() {
        hole_flood::flood(mesh, &plc.holes, &facet_triangles, behavior)?;
    }

    mesh.constrained_segments = segment_leaves;
    mesh.constrained_facets = facet_triangles;

    Ok(())
}
