//! [`Mesh`]: the façade over [`TetDataStructure`] that constraint recovery and refinement build
//! on, so neither reaches into the arena's index arithmetic directly (spec.md §4.2) — the same
//! layering the teacher keeps between `Tetrahedralization` and `TetDataStructure`.

use std::collections::{HashMap, HashSet};

use crate::{
    behavior::Behavior,
    delaunay,
    error::MeshError,
    node::VertexNode,
    tetds::{tet_data_structure::TetDataStructure, tet_iterator::TetIterator},
    utils::types::{TetIteratorIdx, Tetrahedron3, Vertex3, VertexIdx},
    vertex::{Vertex, VertexClassification},
};

/// A fully-built (or partially-built) mesh: topology (`tds`) plus the vertex data model and the
/// per-tetrahedron side tables the arena itself doesn't carry (spec.md §4.2).
#[derive(Debug)]
pub struct Mesh {
    pub(crate) tds: TetDataStructure,
    pub(crate) vertices: Vec<Vertex>,
    /// Region attribute assigned by flood-fill (spec.md §4.4), keyed by tetrahedron slot index.
    pub(crate) region_attr: HashMap<TetIteratorIdx, f64>,
    /// Per-tetrahedron volume constraint from a region's `max_volume` (spec.md §4.4/§4.5), keyed
    /// by tetrahedron slot index.
    pub(crate) volume_constraint: HashMap<TetIteratorIdx, f64>,
    /// Tetrahedra reachable from a hole seed without crossing a recovered facet (spec.md
    /// §3/§4.4/§6): excluded from the output mesh just like the ghost tetrahedra are.
    pub(crate) exterior: HashSet<TetIteratorIdx>,
    /// Leaf edges of recovered constrained segments, after any midpoint splitting (spec.md §4.4):
    /// consulted by refinement's encroachment check (spec.md §4.5).
    pub(crate) constrained_segments: Vec<[VertexIdx; 2]>,
    /// Leaf triangles of recovered constrained facets, after any Steiner splitting (spec.md §4.4):
    /// consulted by refinement's encroachment check (spec.md §4.5).
    pub(crate) constrained_facets: HashSet<[VertexIdx; 3]>,
}

impl Mesh {
    pub(crate) fn new(vertices: Vec<Vertex>, tds: TetDataStructure) -> Self {
        Self {
            tds,
            vertices,
            region_attr: HashMap::new(),
            volume_constraint: HashMap::new(),
            exterior: HashSet::new(),
            constrained_segments: Vec::new(),
            constrained_facets: HashSet::new(),
        }
    }

    pub(crate) fn is_excluded(&self, tet_idx: TetIteratorIdx) -> bool {
        self.exterior.contains(&tet_idx)
            || self.tds.get_tet(tet_idx).is_ok_and(|t| t.is_conceptual())
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[must_use]
    pub const fn tds(&self) -> &TetDataStructure {
        &self.tds
    }

    #[must_use]
    pub fn num_tets(&self) -> usize {
        self.tds.num_casual_tets() - self.exterior.len()
    }

    #[must_use]
    pub fn coords(&self, idx: usize) -> Vertex3 {
        self.vertices[idx].point()
    }

    fn tet_coords(&self, tet: &TetIterator<'_>) -> Option<Tetrahedron3> {
        let [n0, n1, n2, n3] = tet.nodes();
        Some([
            self.coords(n0.idx()?),
            self.coords(n1.idx()?),
            self.coords(n2.idx()?),
            self.coords(n3.idx()?),
        ])
    }

    /// The non-ghost tetrahedra as arrays of their four vertex coordinates.
    #[must_use]
    pub fn tets(&self) -> Vec<Tetrahedron3> {
        (0..self.tds.num_tets())
            .filter_map(|i| {
                let tet = self.tds.get_tet(i).ok()?;
                if tet.is_conceptual() || self.is_excluded(i) {
                    return None;
                }
                self.tet_coords(&tet)
            })
            .collect()
    }

    /// Like [`Mesh::tets`], but paired with each tetrahedron's arena slot index, so a caller can
    /// correlate a cell back to [`Mesh::region_attribute`] or a volume constraint.
    #[must_use]
    pub fn tets_indexed(&self) -> Vec<(TetIteratorIdx, Tetrahedron3)> {
        (0..self.tds.num_tets())
            .filter_map(|i| {
                let tet = self.tds.get_tet(i).ok()?;
                if tet.is_conceptual() || self.is_excluded(i) {
                    return None;
                }
                Some((i, self.tet_coords(&tet)?))
            })
            .collect()
    }

    /// The region attribute assigned to a tetrahedron by flood-fill (spec.md §4.4), if any.
    #[must_use]
    pub fn region_attribute(&self, tet_idx: TetIteratorIdx) -> Option<f64> {
        self.region_attr.get(&tet_idx).copied()
    }

    /// Boundary faces of the mesh domain: ghost-adjacent faces, plus faces between two casual
    /// tetrahedra carrying different region attributes (spec.md §4.2/§4.4).
    #[must_use]
    pub fn boundary_faces(&self) -> Vec<[VertexNode; 3]> {
        let mut faces = Vec::new();
        for tri in self.tds.enumerate_hull_faces() {
            faces.push(tri.nodes());
        }
        for tet_idx in 0..self.tds.num_tets() {
            let Ok(tet) = self.tds.get_tet(tet_idx) else {
                continue;
            };
            if tet.is_conceptual() || self.is_excluded(tet_idx) {
                continue;
            }
            let my_region = self.region_attr.get(&tet_idx);
            for tri in tet.half_triangles() {
                let opp = tri.opposite();
                if opp.tet().is_conceptual() || self.is_excluded(opp.tet().idx()) {
                    faces.push(tri.nodes());
                    continue;
                }
                let opp_region = self.region_attr.get(&opp.tet().idx());
                if my_region != opp_region {
                    faces.push(tri.nodes());
                }
            }
        }
        faces
    }

    pub(crate) fn push_vertex(&mut self, v: Vertex) -> usize {
        let idx = self.vertices.len();
        self.vertices.push(v);
        idx
    }

    pub(crate) fn classification_of(&self, idx: usize) -> VertexClassification {
        self.vertices[idx].classification
    }

    /// Inserts a Steiner point through the Delaunay insertion machinery, keeping the mesh
    /// Delaunay (or as close to it as constraint recovery allows) as it grows (spec.md
    /// §4.4/§4.5). Used by segment/facet recovery and by quality refinement.
    pub(crate) fn insert_steiner_point(
        &mut self,
        point: Vertex3,
        classification: VertexClassification,
        behavior: &Behavior,
    ) -> Result<VertexIdx, MeshError> {
        let tds = std::mem::take(&mut self.tds);
        let coords: Vec<Vertex3> = self.vertices.iter().map(Vertex::point).collect();

        let mut builder = delaunay::Builder::resume(tds, coords);
        let idx = builder.insert_point(point, behavior)?;
        let (tds, _coords) = builder.into_parts();

        self.tds = tds;
        self.push_vertex(Vertex::new(point, classification));

        Ok(idx)
    }

    #[must_use]
    pub fn is_sound(&self) -> bool {
        self.tds.is_sound().unwrap_or(false)
    }

    /// Checks regularity in parallel with [`rayon`]: no vertex of the mesh lies strictly inside
    /// the circumsphere of any tetrahedron that doesn't contain it (spec.md §8). This is a
    /// read-only post-hoc audit, exempt from the single-threaded construction requirement of
    /// spec.md §5 (it doesn't affect the mesh built, only how fast we can check it afterwards).
    #[must_use]
    pub fn par_is_regular(&self) -> f64 {
        use rayon::prelude::*;

        let num_tets = self.num_tets();
        if num_tets == 0 {
            return 1.0;
        }

        let num_violated: f64 = (0..self.tds.num_tets())
            .into_par_iter()
            .map(|tet_idx| {
                let Ok(tet) = self.tds.get_tet(tet_idx) else {
                    return 0.0;
                };
                if tet.is_conceptual() || self.is_excluded(tet_idx) {
                    return 0.0;
                }
                let Some([a, b, c, d]) = self.tet_coords(&tet) else {
                    return 0.0;
                };
                let tet_nodes = tet.nodes();
                let violated = self.vertices.iter().enumerate().any(|(idx, v)| {
                    if tet_nodes.contains(&VertexNode::Casual(idx)) {
                        return false;
                    }
                    crate::predicates::insphere(&a, &b, &c, &d, &v.point()).is_positive()
                });
                if violated {
                    1.0
                } else {
                    0.0
                }
            })
            .sum();

        1.0 - num_violated / num_tets as f64
    }
}

impl std::fmt::Display for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Mesh with {} vertices and {} tets",
            self.vertices.len(),
            self.tds.num_casual_tets()
        )
    }
}
