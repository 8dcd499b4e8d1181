//! The vertex data-model entity (spec.md §3): coordinates plus the bookkeeping fields constraint
//! recovery and refinement hang off a vertex, as distinct from [`crate::node::VertexNode`], which
//! is only the mesh store's topological pointer to one.

use crate::utils::types::{TetIteratorIdx, Vertex3};

/// How a vertex entered the mesh, used by constraint recovery and refinement to decide whether a
/// vertex may be relocated, merged away, or must be kept fixed (spec.md §3/§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexClassification {
    /// Present in the original input point set.
    Input,
    /// A marker-carrying PLC vertex (segment or facet endpoint), immovable once placed.
    PlcVertex,
    /// Inserted by segment recovery to split an encroached subsegment.
    SegmentSteiner,
    /// Inserted by facet recovery to resolve an encroached subfacet.
    FacetSteiner,
    /// Inserted by quality refinement (radius-edge ratio or volume bound).
    RefinementSteiner,
    /// Supplied explicitly by the caller as an additional point to insert into an
    /// already-built mesh (TetGen's `-i` switch), rather than part of the original input set.
    ExplicitInsert,
}

/// A vertex of the mesh: its coordinates plus the metadata spec.md §3 attaches to every vertex.
#[derive(Debug, Clone)]
pub struct Vertex {
    point: Vertex3,
    /// Boundary marker carried through from input (`.node` file marker column, spec.md §6),
    /// `0` for unmarked/interior vertices.
    pub marker: i32,
    /// Free-form per-vertex attributes (the `.node` file's attribute columns, spec.md §6).
    pub attributes: Vec<f64>,
    pub classification: VertexClassification,
    /// One tetrahedron incident to this vertex, kept up to date as a fast re-entry point for
    /// point location and incident-tet walks (spec.md §4.2).
    pub incident_tet: Option<TetIteratorIdx>,
}

impl Vertex {
    #[must_use]
    pub fn new(point: Vertex3, classification: VertexClassification) -> Self {
        Self {
            point,
            marker: 0,
            attributes: Vec::new(),
            classification,
            incident_tet: None,
        }
    }

    #[must_use]
    pub const fn point(&self) -> Vertex3 {
        self.point
    }

    #[must_use]
    pub const fn is_steiner(&self) -> bool {
        matches!(
            self.classification,
            VertexClassification::SegmentSteiner
                | VertexClassification::FacetSteiner
                | VertexClassification::RefinementSteiner
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steiner_classification_is_recognized() {
        let v = Vertex::new([0.0, 0.0, 0.0], VertexClassification::RefinementSteiner);
        assert!(v.is_steiner());
        let v = Vertex::new([0.0, 0.0, 0.0], VertexClassification::Input);
        assert!(!v.is_steiner());
    }
}
