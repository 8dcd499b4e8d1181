//! The flat tetrahedron arena: the mesh store's topology layer.
//!
//! `TetDataStructure` stores tetrahedra as a flat, stride-4 array of [`crate::node::VertexNode`]
//! plus a parallel, symmetric array of opposite-half-triangle indices. Ghost tetrahedra (those
//! touching the point at infinity) are ordinary entries whose sentinel slot holds
//! `VertexNode::Conceptual`; ordinary orientation/insphere tests over them fall back to a 2D
//! orientation of the three finite vertices (spec.md §4.2).
//!
//! [`half_tri_iterator`] and [`hedge_iterator`] are zero-sized cursors over this arena — they
//! carry only an index and a `&TetDataStructure` borrow, so navigating "the opposite triangle" or
//! "the next halfedge" is pointer-chasing over plain integers rather than following real pointers.

pub mod half_tri_iterator;
pub mod hedge_iterator;
pub mod tet_data_structure;
pub mod tet_iterator;

pub use tet_data_structure::TetDataStructure;
pub use tet_iterator::TetIterator;
