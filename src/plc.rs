//! The Piecewise Linear Complex input: segments, facets, and regions (spec.md §3/§6).

use crate::utils::types::VertexIdx;

/// A constrained edge between two input vertices that must appear in the final mesh, split by
/// Steiner points if necessary (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub endpoints: [VertexIdx; 2],
    /// Boundary marker carried from the `.poly` file, `0` if unmarked.
    pub marker: i32,
}

/// A planar polygonal facet, given as a simple polygon loop of input-vertex indices, that must
/// appear in the final mesh as a union of triangular faces (spec.md §4.4). Facets are assumed
/// planar at input time; non-planar facets are a rejected input (spec.md §9).
#[derive(Debug, Clone)]
pub struct Facet {
    pub polygon: Vec<VertexIdx>,
    /// Holes cut out of the polygon, each its own loop of vertex indices.
    pub holes: Vec<Vec<VertexIdx>>,
    pub marker: i32,
}

/// A region attribute seed point plus an optional volume constraint, used to flood-fill a
/// connected component of tetrahedra bounded by facets (spec.md §4.4).
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub seed: [f64; 3],
    pub attribute: f64,
    pub max_volume: Option<f64>,
}

/// A hole seed point (spec.md §3/§4.4/§6): every tetrahedron reachable from it without crossing a
/// recovered facet is exterior, and is removed from the output mesh.
#[derive(Debug, Clone, Copy)]
pub struct Hole {
    pub seed: [f64; 3],
}

/// The full constraint input to a PLC-constrained tetrahedralization.
#[derive(Debug, Clone, Default)]
pub struct Plc {
    pub segments: Vec<Segment>,
    pub facets: Vec<Facet>,
    pub regions: Vec<Region>,
    pub holes: Vec<Hole>,
}

impl Plc {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
            facets: Vec::new(),
            regions: Vec::new(),
            holes: Vec::new(),
        }
    }
}
