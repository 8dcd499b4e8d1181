//! The dual Voronoi diagram (spec.md §2/§6's `-v` switch): one Voronoi vertex per Delaunay
//! tetrahedron (its circumcenter), one Voronoi edge per pair of tetrahedra sharing a face, and one
//! unbounded ray per hull face — dual to the convex-hull boundary, where the Voronoi cell of a
//! hull vertex extends to infinity.

use crate::{mesh::Mesh, predicates};

/// The Voronoi diagram dual to a tetrahedralization.
#[derive(Debug, Default, Clone)]
pub struct VoronoiDiagram {
    /// Voronoi vertices, indexed by the Delaunay tetrahedron they dualize; `None` where the
    /// source tetrahedron is a ghost (no finite circumcenter) or degenerate (flat).
    pub nodes: Vec<Option<[f64; 3]>>,
    /// Bounded Voronoi edges, as pairs of indices into `nodes`.
    pub edges: Vec<(usize, usize)>,
    /// Unbounded Voronoi edges: a finite endpoint (index into `nodes`) plus an outward direction,
    /// dual to a convex-hull face.
    pub rays: Vec<(usize, [f64; 3])>,
}

fn face_normal(mesh: &Mesh, nodes: [crate::node::VertexNode; 3]) -> Option<[f64; 3]> {
    let [n0, n1, n2] = nodes;
    let (a, b, c) = (
        mesh.coords(n0.idx()?),
        mesh.coords(n1.idx()?),
        mesh.coords(n2.idx()?),
    );
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    Some([
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ])
}

/// Builds the Voronoi dual of an already-built mesh.
#[must_use]
pub fn extract(mesh: &Mesh) -> VoronoiDiagram {
    let num_tets = mesh.tds().num_tets();
    let mut nodes = vec![None; num_tets];

    for tet_idx in 0..num_tets {
        let Ok(tet) = mesh.tds().get_tet(tet_idx) else {
            continue;
        };
        if tet.is_conceptual() || mesh.is_excluded(tet_idx) {
            continue;
        }
        let [n0, n1, n2, n3] = tet.nodes();
        let Some((a, b, c, d)) = n0.idx().zip(n1.idx()).zip(n2.idx()).zip(n3.idx()).map(
            |(((i0, i1), i2), i3)| {
                (
                    mesh.coords(i0),
                    mesh.coords(i1),
                    mesh.coords(i2),
                    mesh.coords(i3),
                )
            },
        ) else {
            continue;
        };
        if let Some((center, _)) = predicates::circumcenter(&a, &b, &c, &d) {
            nodes[tet_idx] = Some(center);
        }
    }

    let mut edges = Vec::new();
    let mut rays = Vec::new();

    for tet_idx in 0..num_tets {
        if nodes[tet_idx].is_none() {
            continue;
        }
        let Ok(tet) = mesh.tds().get_tet(tet_idx) else {
            continue;
        };

        for tri in tet.half_triangles() {
            let opp = tri.opposite();
            if opp.tet().is_conceptual() || mesh.is_excluded(opp.tet().idx()) {
                if let Some(normal) = face_normal(mesh, tri.nodes()) {
                    rays.push((tet_idx, normal));
                }
                continue;
            }

            let opp_idx = opp.tet().idx();
            if opp_idx > tet_idx && nodes[opp_idx].is_some() {
                edges.push((tet_idx, opp_idx));
            }
        }
    }

    VoronoiDiagram { nodes, edges, rays }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{behavior::Behavior, delaunay};

    #[test]
    fn single_tetrahedron_has_one_node_and_no_bounded_edges() {
        let points = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let mesh = delaunay::tetrahedralize(&points, &Behavior::default()).unwrap();
        let diagram = extract(&mesh);
        assert_eq!(diagram.nodes.iter().filter(|n| n.is_some()).count(), 1);
        assert!(diagram.edges.is_empty());
        assert_eq!(diagram.rays.len(), 4);
    }
}
