//! # tetramesh
//!
//! Delaunay tetrahedralization, piecewise-linear-complex (PLC) constraint recovery, and
//! quality-bounded mesh refinement in 3D, with an optional dual Voronoi diagram.
//!
//! The entry point is [`tetrahedralize`], which takes an input point set (plus, for constrained
//! runs, a [`plc::Plc`] of segments/facets/regions) and a [`behavior::Behavior`] describing which
//! phases to run, and returns a [`mesh::Mesh`].

#![forbid(unsafe_code)]
#![deny(unused, clippy::incompatible_msrv)]
#![warn(clippy::all, clippy::missing_const_for_fn)]

pub use behavior::Behavior;
pub use error::{MeshError, MeshFailure};
pub use mesh::Mesh;
pub use node::VertexNode;
pub use plc::{Facet, Hole, Plc, Region, Segment};
pub use vertex::{Vertex, VertexClassification};

mod behavior;
#[cfg(feature = "cli")]
pub mod cli;
mod constraints;
mod delaunay;
mod error;
#[cfg(feature = "cli")]
pub mod io;
mod mesh;
mod node;
pub mod predicates;
mod refinement;
mod tetds;
mod utils;
mod vertex;
pub mod voronoi;

pub use refinement::RefinementStats;
pub use utils::types::Vertex3;

use std::sync::atomic::Ordering;

/// Runs the kernel end-to-end: Delaunay tetrahedralization, optional PLC recovery, optional
/// quality refinement, in that order, as governed by `behavior`.
///
/// Returns `Ok(Mesh)` on success. On failure, [`MeshFailure::partial`] carries the best mesh built
/// so far for the error kinds where a partial result is meaningful (spec's policy table, §7).
pub fn tetrahedralize(
    points: &[utils::types::Vertex3],
    plc: Option<&Plc>,
    behavior: &Behavior,
) -> Result<Mesh, MeshFailure> {
    if let Some(interrupt) = &behavior.interrupt {
        if interrupt.load(Ordering::Relaxed) {
            return Err(MeshFailure::new(MeshError::Interrupted));
        }
    }

    let mut mesh = delaunay::tetrahedralize(points, behavior).map_err(MeshFailure::new)?;

    if behavior.plc {
        let plc = plc.ok_or_else(|| MeshFailure::new(MeshError::MissingPlc))?;
        if let Err(err) = constraints::recover(&mut mesh, plc, behavior) {
            return Err(MeshFailure::with_partial(err, mesh));
        }
    }

    if behavior.conforming_delaunay {
        if let Err(err) = refinement::enforce_conforming(&mut mesh, behavior) {
            return Err(MeshFailure::with_partial(err, mesh));
        }
    }

    if behavior.quality {
        if let Err(err) = refinement::refine(&mut mesh, behavior) {
            return Err(MeshFailure::with_partial(err, mesh));
        }
    }

    Ok(mesh)
}

/// Inserts additional points into an already-built mesh (spec.md §6's `-i` switch), through the
/// same Delaunay insertion machinery as every other Steiner point.
pub fn insert_additional_points(
    mesh: &mut Mesh,
    points: &[Vertex3],
    behavior: &Behavior,
) -> Result<(), MeshError> {
    for &point in points {
        mesh.insert_steiner_point(point, VertexClassification::ExplicitInsert, behavior)?;
    }
    Ok(())
}
