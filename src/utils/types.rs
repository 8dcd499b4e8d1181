//! Type aliases for data values and data-structure indices.
//!
//! Aliasing `usize` by role (vertex vs. tetrahedron vs. halfedge index) keeps call sites honest
//! about what a bare integer means without paying for a newtype everywhere.

/// A point in 3-space.
pub type Vertex3 = [f64; 3];
/// A triangle given by its three corner points.
pub type Triangle3 = [Vertex3; 3];
/// A tetrahedron given by its four corner points.
pub type Tetrahedron3 = [Vertex3; 4];

/// Index into the input/working vertex list.
pub type VertexIdx = usize;

/// Index of a halfedge within its owning half-triangle (0..=2).
pub type HedgeIteratorIdx = usize;
/// Index of a tetrahedron slot in [`crate::tetds::TetDataStructure`].
pub type TetIteratorIdx = usize;
