//! Public error types (spec.md §7): one [`MeshError`] variant per listed error kind, and
//! [`MeshFailure`] which additionally carries a partial mesh where the policy table allows one.

use crate::mesh::Mesh;
use thiserror::Error;

/// The seven error kinds of spec.md §7.
#[derive(Debug, Error)]
pub enum MeshError {
    /// (1) Fewer than four input vertices, or all vertices coplanar/collinear: no tetrahedron can
    /// be formed. Not recoverable.
    #[error("at least four non-coplanar vertices are required to build a tetrahedralization")]
    DegenerateInput,

    /// (2) Two input vertices share identical coordinates. Not recoverable: spec.md mandates
    /// explicit failure over silent deduplication.
    #[error("duplicate input vertices at indices {0} and {1}")]
    DuplicatePoint(usize, usize),

    /// (3) `Behavior::plc` is set but no [`crate::Plc`] was supplied.
    #[error("PLC recovery requested but no constraint input was supplied")]
    MissingPlc,

    /// (4) A facet's vertex loop is not planar within tolerance. Partial mesh available: the
    /// Delaunay tetrahedralization prior to constraint recovery.
    #[error("facet {0} is not planar")]
    NonPlanarFacet(usize),

    /// (4) Segment recovery exhausted its Steiner point budget without resolving an encroachment.
    /// Partial mesh available.
    #[error("segment {0} could not be recovered within the Steiner point budget")]
    SegmentRecoveryFailed(usize),

    /// (4) Facet recovery exhausted its Steiner point budget without resolving an encroachment.
    /// Partial mesh available.
    #[error("facet {0} could not be recovered within the Steiner point budget")]
    FacetRecoveryFailed(usize),

    /// (5) Quality refinement did not converge within its Steiner point budget. Partial mesh
    /// available: the best mesh reached before the budget was exhausted.
    #[error("quality refinement did not converge within the Steiner point budget")]
    RefinementDidNotConverge,

    /// (6) The caller's interrupt flag was observed set. No mesh is returned, regardless of which
    /// phase was interrupted.
    #[error("operation interrupted")]
    Interrupted,

    /// (7) An internal invariant was violated (a bug, not a data problem). Not recoverable.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl MeshError {
    /// Whether the policy table (spec.md §7) allows returning a partial mesh alongside this
    /// error kind.
    #[must_use]
    pub const fn allows_partial(&self) -> bool {
        matches!(
            self,
            Self::NonPlanarFacet(_)
                | Self::SegmentRecoveryFailed(_)
                | Self::FacetRecoveryFailed(_)
                | Self::RefinementDidNotConverge
        )
    }
}

/// The error returned from [`crate::tetrahedralize`]: the error kind, plus the best mesh built so
/// far when the kind permits it.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct MeshFailure {
    pub kind: MeshError,
    pub partial: Option<Mesh>,
}

impl MeshFailure {
    pub(crate) fn new(kind: MeshError) -> Self {
        Self {
            kind,
            partial: None,
        }
    }

    pub(crate) fn with_partial(kind: MeshError, mesh: Mesh) -> Self {
        let partial = kind.allows_partial().then_some(mesh);
        Self { kind, partial }
    }
}
