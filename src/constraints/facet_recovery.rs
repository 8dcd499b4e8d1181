//! Facet recovery (spec.md §4.4): each PLC facet is fan-triangulated from its first vertex, and
//! each resulting triangle is recovered independently. A missing triangle first tries a 2-3 flip
//! ([`super::flip`]) on each of its three edges; if none applies, it's split by inserting a
//! Steiner point — the facet-plane centroid, in place of the circumcenter the flat 3D kernel
//! otherwise uses, since a facet triangle's circumcenter is a 2D quantity our `predicates` module
//! doesn't compute — and recursing on the three sub-triangles it forms, bounded by
//! `Behavior::max_steiner_per_feature`.
//!
//! Holes are validated for planarity alongside the outer loop but are not yet cut out of the
//! triangulated surface; see DESIGN.md.

use std::collections::HashSet;

use super::flip;
use crate::{
    behavior::Behavior, error::MeshError, mesh::Mesh, node::VertexNode, plc::Facet, predicates,
    utils::types::VertexIdx, vertex::VertexClassification,
};

/// Checks that every vertex of `facet` lies on the plane through its first three vertices
/// (spec.md §9: non-planar facets are a rejected input, not silently fixed up).
pub(crate) fn check_planar(mesh: &Mesh, facet: &Facet, idx: usize) -> Result<(), MeshError> {
    if facet.polygon.len() < 3 {
        return Ok(());
    }

    let p0 = mesh.coords(facet.polygon[0]);
    let p1 = mesh.coords(facet.polygon[1]);
    let p2 = mesh.coords(facet.polygon[2]);

    let rest = facet.polygon[3..]
        .iter()
        .chain(facet.holes.iter().flatten());

    for &v in rest {
        let p = mesh.coords(v);
        if !predicates::orient3d(&p0, &p1, &p2, &p).is_zero() {
            return Err(MeshError::NonPlanarFacet(idx));
        }
    }

    Ok(())
}

fn triangle_present(mesh: &Mesh, a: VertexIdx, b: VertexIdx, c: VertexIdx) -> bool {
    let (na, nb, nc) = (
        VertexNode::Casual(a),
        VertexNode::Casual(b),
        VertexNode::Casual(c),
    );
    mesh.tds().get_half_tri_containing(&na, &nb, &nc).is_some()
}

fn centroid(mesh: &Mesh, a: VertexIdx, b: VertexIdx, c: VertexIdx) -> [f64; 3] {
    let (pa, pb, pc) = (mesh.coords(a), mesh.coords(b), mesh.coords(c));
    [
        (pa[0] + pb[0] + pc[0]) / 3.0,
        (pa[1] + pb[1] + pc[1]) / 3.0,
        (pa[2] + pb[2] + pc[2]) / 3.0,
    ]
}

#[allow(clippy::too_many_arguments)]
fn recover_triangle(
    mesh: &mut Mesh,
    a: VertexIdx,
    b: VertexIdx,
    c: VertexIdx,
    facet_idx: usize,
    budget: &mut usize,
    behavior: &Behavior,
    recovered: &mut HashSet<[VertexIdx; 3]>,
) -> Result<(), MeshError> {
    if behavior.is_interrupted() {
        return Err(MeshError::Interrupted);
    }

    if triangle_present(mesh, a, b, c) {
        let mut key = [a, b, c];
        key.sort_unstable();
        recovered.insert(key);
        return Ok(());
    }

    // The triangle is missing because one of its edges is; try to create each missing edge with a
    // 2-3 flip before falling back to a Steiner point.
    for &(p, q) in &[(a, b), (b, c), (c, a)] {
        if flip::try_create_edge(mesh, p, q) && triangle_present(mesh, a, b, c) {
            let mut key = [a, b, c];
            key.sort_unstable();
            recovered.insert(key);
            return Ok(());
        }
    }

    if *budget == 0 {
        return Err(MeshError::FacetRecoveryFailed(facet_idx));
    }
    *budget -= 1;

    let p = centroid(mesh, a, b, c);
    let mid = mesh.insert_steiner_point(p, VertexClassification::FacetSteiner, behavior)?;

    recover_triangle(mesh, a, b, mid, facet_idx, budget, behavior, recovered)?;
    recover_triangle(mesh, b, c, mid, facet_idx, budget, behavior, recovered)?;
    recover_triangle(mesh, c, a, mid, facet_idx, budget, behavior, recovered)
}

/// Recovers every facet's fan-triangulated faces, and returns the set of (sorted) vertex triples
/// that now bound the recovered surface — the boundary `region_flood` must not cross.
pub(crate) fn recover_facets(
    mesh: &mut Mesh,
    facets: &[Facet],
    behavior: &Behavior,
) -> Result<HashSet<[VertexIdx; 3]>, MeshError> {
    let mut recovered = HashSet::new();

    for (idx, facet) in facets.iter().enumerate() {
        if facet.polygon.len() < 3 {
            continue;
        }

        let mut budget = behavior.max_steiner_per_feature;
        let anchor = facet.polygon[0];

        for w in 1..facet.polygon.len() - 1 {
            let b = facet.polygon[w];
            let c = facet.polygon[w + 1];
            recover_triangle(mesh, anchor, b, c, idx, &mut budget, behavior, &mut recovered)?;
        }
    }

    Ok(recovered)
}
