//! The Delaunay core (spec.md §4.3): BRIO + Hilbert-curve insertion order, stochastic
//! visibility-walk point location with an exhaustive fallback, and Bowyer-Watson cavity
//! insertion.

use std::cmp;

use crate::{
    behavior::Behavior,
    error::MeshError,
    mesh::Mesh,
    node::VertexNode,
    predicates::{self, Sign},
    tetds::{half_tri_iterator::HalfTriIterator, tet_data_structure::TetDataStructure},
    utils::{
        point_order::sort_along_hilbert_curve_3d,
        types::{Triangle3, Vertex3, VertexIdx},
    },
    vertex::{Vertex, VertexClassification},
};

/// Tetrahedron extended with the point at infinity: a ghost tet degenerates to its three finite
/// vertices, read as a triangle, for orientation purposes (spec.md §4.2).
enum ExtendedTet {
    Tetrahedron([Vertex3; 4]),
    Triangle(Triangle3),
}

/// Builds a Delaunay tetrahedralization of `points` and returns it wrapped as a [`Mesh`].
pub(crate) fn tetrahedralize(points: &[Vertex3], behavior: &Behavior) -> Result<Mesh, MeshError> {
    if points.len() < 4 {
        return Err(MeshError::DegenerateInput);
    }

    let mut builder = Builder::with_capacity(points.len());
    builder.insert_vertices(points, behavior)?;

    let Builder { tds, vertices, .. } = builder;
    let vertices = vertices
        .into_iter()
        .map(|p| Vertex::new(p, VertexClassification::Input))
        .collect();

    Ok(Mesh::new(vertices, tds))
}

/// Orientation/insphere evaluation with symbolic perturbation folded in: an exact-zero predicate
/// result is resolved by `crate::predicates::sos`'s simulated perturbation rather than left
/// ambiguous (spec.md §4.1).
fn resolve_orient3d(sign: Sign, pts: [&Vertex3; 4], indices: [VertexIdx; 4]) -> bool {
    match sign {
        Sign::Positive => true,
        Sign::Negative => false,
        Sign::Zero => predicates::sos::resolve_orient3d(pts, indices) == cmp::Ordering::Greater,
    }
}

fn resolve_insphere(sign: Sign, pts: [&Vertex3; 5], indices: [VertexIdx; 5]) -> bool {
    match sign {
        Sign::Positive => true,
        Sign::Negative => false,
        Sign::Zero => predicates::sos::resolve_insphere(pts, indices) == cmp::Ordering::Greater,
    }
}

pub(crate) struct Builder {
    tds: TetDataStructure,
    vertices: Vec<Vertex3>,
    used_vertices: Vec<VertexIdx>,
}

impl Builder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            tds: TetDataStructure::new(),
            vertices: Vec::with_capacity(capacity),
            used_vertices: Vec::new(),
        }
    }

    /// Resumes building on top of an already-constructed arena and vertex set, so constraint
    /// recovery and refinement can insert a single Steiner point through the same Bowyer-Watson
    /// machinery used for the initial build (spec.md §4.4/§4.5).
    pub(crate) fn resume(tds: TetDataStructure, vertices: Vec<Vertex3>) -> Self {
        let used_vertices = (0..vertices.len()).collect();
        Self {
            tds,
            vertices,
            used_vertices,
        }
    }

    pub(crate) fn into_parts(self) -> (TetDataStructure, Vec<Vertex3>) {
        (self.tds, self.vertices)
    }

    /// Inserts a single new point into an already-built arena, visibility-walking from the last
    /// tetrahedron as a default starting point.
    pub(crate) fn insert_point(
        &mut self,
        point: Vertex3,
        behavior: &Behavior,
    ) -> Result<VertexIdx, MeshError> {
        if self.tds.num_tets() == 0 {
            return Err(MeshError::Internal(anyhow::anyhow!(
                "cannot insert a point into an empty arena"
            )));
        }

        let v_idx = self.vertices.len();
        self.vertices.push(point);

        let near_to = self.tds.num_tets() - 1;
        self.insert_vertex_helper(v_idx, near_to, behavior)?;
        self.tds.clean_to_del().map_err(MeshError::Internal)?;

        Ok(v_idx)
    }

    fn get_tet_as_extended(&self, tet_idx: usize) -> Result<ExtendedTet, MeshError> {
        let [n0, n1, n2, n3] = self
            .tds
            .get_tet(tet_idx)
            .map_err(MeshError::Internal)?
            .nodes();

        let ext = match (n0, n1, n2, n3) {
            (VertexNode::Conceptual, VertexNode::Casual(i1), VertexNode::Casual(i2), VertexNode::Casual(i3)) => {
                ExtendedTet::Triangle([self.vertices[i1], self.vertices[i3], self.vertices[i2]])
            }
            (VertexNode::Casual(i0), VertexNode::Conceptual, VertexNode::Casual(i2), VertexNode::Casual(i3)) => {
                ExtendedTet::Triangle([self.vertices[i0], self.vertices[i2], self.vertices[i3]])
            }
            (VertexNode::Casual(i0), VertexNode::Casual(i1), VertexNode::Conceptual, VertexNode::Casual(i3)) => {
                ExtendedTet::Triangle([self.vertices[i0], self.vertices[i3], self.vertices[i1]])
            }
            (VertexNode::Casual(i0), VertexNode::Casual(i1), VertexNode::Casual(i2), VertexNode::Conceptual) => {
                ExtendedTet::Triangle([self.vertices[i0], self.vertices[i1], self.vertices[i2]])
            }
            (VertexNode::Casual(i0), VertexNode::Casual(i1), VertexNode::Casual(i2), VertexNode::Casual(i3)) => {
                ExtendedTet::Tetrahedron([
                    self.vertices[i0],
                    self.vertices[i1],
                    self.vertices[i2],
                    self.vertices[i3],
                ])
            }
            _ => return Err(MeshError::Internal(anyhow::anyhow!("deleted node in live tetrahedron"))),
        };

        Ok(ext)
    }

    fn tet_node_indices(&self, tet_idx: usize) -> Result<[VertexNode; 4], MeshError> {
        Ok(self.tds.get_tet(tet_idx).map_err(MeshError::Internal)?.nodes())
    }

    fn is_v_in_sphere(&self, v_idx: usize, tet_idx: usize) -> Result<bool, MeshError> {
        let p = self.vertices[v_idx];
        let nodes = self.tet_node_indices(tet_idx)?;

        match self.get_tet_as_extended(tet_idx)? {
            ExtendedTet::Tetrahedron([a, b, c, d]) => {
                let node_idxs: Vec<VertexIdx> = nodes.iter().map(|n| n.idx().unwrap()).collect();
                let idxs = [node_idxs[0], node_idxs[1], node_idxs[2], node_idxs[3], v_idx];
                Ok(resolve_insphere(
                    predicates::insphere(&a, &b, &c, &d, &p),
                    [&a, &b, &c, &d, &p],
                    idxs,
                ))
            }
            ExtendedTet::Triangle([a, b, c]) => {
                let node_idxs: Vec<VertexIdx> = nodes.iter().filter_map(VertexNode::idx).collect();
                let idxs = [node_idxs[0], node_idxs[1], node_idxs[2], v_idx];
                Ok(!resolve_orient3d(
                    predicates::orient3d(&a, &b, &c, &p),
                    [&a, &b, &c, &p],
                    idxs,
                ))
            }
        }
    }

    fn is_tet_flat(&self, tet_idx: usize) -> Result<bool, MeshError> {
        Ok(match self.get_tet_as_extended(tet_idx)? {
            ExtendedTet::Tetrahedron([a, b, c, d]) => predicates::orient3d(&a, &b, &c, &d).is_zero(),
            ExtendedTet::Triangle(_) => false,
        })
    }

    fn choose_tri<'a, 'hi>(
        &self,
        tris: &'hi [HalfTriIterator<'a>],
        v_idx: usize,
    ) -> Option<&'hi HalfTriIterator<'a>> {
        let v = self.vertices[v_idx];
        for tri in tris {
            let [n0, n1, n2] = tri.nodes();
            if let (VertexNode::Casual(i0), VertexNode::Casual(i1), VertexNode::Casual(i2)) =
                (n0, n1, n2)
            {
                let a = self.vertices[i0];
                let b = self.vertices[i1];
                let c = self.vertices[i2];
                let idxs = [i0, i1, i2, v_idx];
                let sign = predicates::orient3d(&a, &b, &c, &v);

                if tri.tet().is_conceptual() {
                    if !resolve_orient3d(sign, [&a, &b, &c, &v], idxs) {
                        return Some(tri);
                    }
                } else if sign.is_negative() {
                    return Some(tri);
                }
            }
        }
        None
    }

    fn walk_check_all(&self, v_idx: usize) -> Result<usize, MeshError> {
        for tet_idx in 0..self.tds.num_tets() {
            if self.is_tet_flat(tet_idx)? {
                continue;
            }
            if self.is_v_in_sphere(v_idx, tet_idx)? {
                return Ok(tet_idx);
            }
        }
        Err(MeshError::Internal(anyhow::anyhow!(
            "no tetrahedron's circumsphere contains the new vertex"
        )))
    }

    fn locate_vis_walk(&self, v_idx: usize, starting_tet_idx: usize) -> Result<usize, MeshError> {
        let mut curr_tet_idx = starting_tet_idx;
        let starting_tet = self.tds.get_tet(curr_tet_idx).map_err(MeshError::Internal)?;
        let mut tris = starting_tet.half_triangles().to_vec();

        let mut side = 0;
        let mut num_visited = 0;
        let tets_visitable = self.tds.num_tets() >> 2;

        loop {
            if num_visited > tets_visitable {
                return Err(MeshError::Internal(anyhow::anyhow!("visibility walk exceeded visit budget")));
            }

            if let Some(tri) = self.choose_tri(&tris, v_idx) {
                num_visited += 1;

                let opp_tri = tri.opposite();
                curr_tet_idx = opp_tri.tet().idx();

                tris.clear();
                let hedges = opp_tri.hedges();
                tris.push(hedges[side % 3].neighbor().tri());
                tris.push(hedges[(1 + side) % 3].neighbor().tri());
                tris.push(hedges[(2 + side) % 3].neighbor().tri());

                side = (side + 1) % 3;
            } else if self.is_v_in_sphere(v_idx, curr_tet_idx)? {
                return Ok(curr_tet_idx);
            } else {
                return Err(MeshError::Internal(anyhow::anyhow!("visibility walk found no containing tetrahedron")));
            }
        }
    }

    /// Rejects exact-duplicate input points (spec.md §9: duplicate points are an explicit failure,
    /// never silently deduplicated). A new vertex is a duplicate iff it shares coordinates with a
    /// vertex of the tetrahedron it locates into.
    fn check_not_duplicate(&self, v_idx: usize, tet_idx: usize) -> Result<(), MeshError> {
        let v = self.vertices[v_idx];
        for node in self.tet_node_indices(tet_idx)? {
            if let Some(existing_idx) = node.idx() {
                if self.vertices[existing_idx] == v {
                    return Err(MeshError::DuplicatePoint(existing_idx, v_idx));
                }
            }
        }
        Ok(())
    }

    fn insert_bw(&mut self, v_idx: usize, first_tet_idx: usize) -> Result<Vec<usize>, MeshError> {
        self.tds.bw_start(first_tet_idx).map_err(MeshError::Internal)?;

        while let Some(tet_idx) = self.tds.bw_tets_to_check() {
            if self.is_v_in_sphere(v_idx, tet_idx)? {
                self.tds.bw_rem_tet(tet_idx);
            } else {
                self.tds.bw_keep_tetra(tet_idx).map_err(MeshError::Internal)?;
            }
        }

        self.tds
            .bw_insert_node(VertexNode::Casual(v_idx))
            .map_err(MeshError::Internal)
    }

    fn insert_vertex_helper(
        &mut self,
        v_idx: usize,
        near_to_idx: usize,
        behavior: &Behavior,
    ) -> Result<usize, MeshError> {
        if behavior.is_interrupted() {
            return Err(MeshError::Interrupted);
        }

        let containing_tet_idx = match self.locate_vis_walk(v_idx, near_to_idx) {
            Ok(idx) => idx,
            Err(_) => {
                self.tds.clean_to_del().map_err(MeshError::Internal)?;
                self.walk_check_all(v_idx)?
            }
        };

        if self
            .tds
            .get_tet(containing_tet_idx)
            .map_err(MeshError::Internal)?
            .is_casual()
        {
            self.check_not_duplicate(v_idx, containing_tet_idx)?;
        }

        self.used_vertices.push(v_idx);
        let new_tets = self.insert_bw(v_idx, containing_tet_idx)?;
        Ok(new_tets[0])
    }

    /// Bootstraps the arena's first tetrahedron: pick two points, a third not collinear with
    /// them, and a fourth not coplanar with those three, falling back through the remaining
    /// candidates when ties (collinear/coplanar) occur (spec.md §4.3).
    fn insert_first_tet(&mut self, idxs_to_insert: &mut Vec<usize>) -> Result<(), MeshError> {
        let idx0 = idxs_to_insert.pop().unwrap();
        let idx1 = idxs_to_insert.pop().unwrap();

        let v0 = self.vertices[idx0];
        let v1 = self.vertices[idx1];

        let mut aligned = Vec::new();
        let v01 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];

        let i2 = idxs_to_insert
            .iter()
            .rev()
            .enumerate()
            .map(|(e, &idx)| (e, self.vertices[idx]))
            .map(|(e, v)| (e, [v[0] - v0[0], v[1] - v0[1], v[2] - v0[2]]))
            .map(|(e, vec)| (e, vec[0] * v01[0] + vec[1] * v01[1] + vec[2] * v01[2]))
            .map(|(e, scal)| (e, scal.abs()))
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(e, _)| e)
            .ok_or(MeshError::DegenerateInput)?;

        let idx2 = idxs_to_insert.remove(i2);
        let v2 = self.vertices[idx2];

        loop {
            let Some(idx3) = idxs_to_insert.pop() else {
                return Err(MeshError::DegenerateInput);
            };
            let v3 = self.vertices[idx3];

            let sign = predicates::orient3d(&v0, &v1, &v2, &v3);
            if sign.is_zero() {
                aligned.push(idx3);
                continue;
            }

            if sign.is_positive() {
                self.tds
                    .insert_first_tet([idx0, idx1, idx2, idx3])
                    .map_err(MeshError::Internal)?;
            } else {
                self.tds
                    .insert_first_tet([idx0, idx2, idx1, idx3])
                    .map_err(MeshError::Internal)?;
            }

            self.used_vertices.extend([idx0, idx1, idx2, idx3]);
            break;
        }

        idxs_to_insert.append(&mut aligned);
        Ok(())
    }

    fn insert_vertices(&mut self, points: &[Vertex3], behavior: &Behavior) -> Result<(), MeshError> {
        let mut idxs_to_insert = Vec::with_capacity(points.len());
        for &p in points {
            idxs_to_insert.push(self.vertices.len());
            self.vertices.push(p);
        }

        if self.vertices.len() < 4 {
            return Err(MeshError::DegenerateInput);
        }

        #[cfg(feature = "timing")]
        let now = std::time::Instant::now();
        idxs_to_insert = sort_along_hilbert_curve_3d(&self.vertices, &idxs_to_insert);
        #[cfg(feature = "logging")]
        log::trace!("hilbert curve sort computed");
        #[cfg(feature = "timing")]
        log::trace!("hilbert curve sort took {}us", now.elapsed().as_micros());

        if self.tds.num_tets() == 0 {
            self.insert_first_tet(&mut idxs_to_insert)?;
        }

        let mut last_added_idx = self.tds.num_tets() - 1;
        while let Some(v_idx) = idxs_to_insert.pop() {
            last_added_idx = self.insert_vertex_helper(v_idx, last_added_idx, behavior)?;
        }

        self.tds.clean_to_del().map_err(MeshError::Internal)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn behavior() -> Behavior {
        Behavior::default()
    }

    #[test]
    fn builds_tetrahedron_from_four_points() {
        let points = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let mesh = tetrahedralize(&points, &behavior()).unwrap();
        assert_eq!(mesh.tets().len(), 1);
        assert!(mesh.is_sound());
    }

    #[test]
    fn rejects_fewer_than_four_points() {
        let points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert!(matches!(
            tetrahedralize(&points, &behavior()),
            Err(MeshError::DegenerateInput)
        ));
    }

    #[test]
    fn rejects_duplicate_points() {
        let points = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
        ];
        assert!(matches!(
            tetrahedralize(&points, &behavior()),
            Err(MeshError::DuplicatePoint(_, _))
        ));
    }

    #[test]
    fn cube_corners_produce_regular_mesh() {
        let points = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
        ];
        let mesh = tetrahedralize(&points, &behavior()).unwrap();
        assert!(mesh.is_sound());
        assert_eq!(mesh.par_is_regular(), 1.0);
    }

    #[test]
    fn cospherical_octahedron_is_regular() {
        let points = vec![
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ];
        let mesh = tetrahedralize(&points, &behavior()).unwrap();
        assert!(mesh.is_sound());
        assert_eq!(mesh.par_is_regular(), 1.0);
    }
}
