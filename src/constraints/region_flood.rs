//! Region attribute assignment (spec.md §4.4): flood-fill from each region's seed point through
//! tetrahedron adjacency, stopping at the mesh's outer hull and at recovered facet faces, the same
//! way TetGen-style region flooding starts "from ghost tetrahedra" and spreads inward bounded by
//! the PLC surface.

use std::collections::{HashSet, VecDeque};

use crate::{
    behavior::Behavior, error::MeshError, mesh::Mesh, plc::Region, predicates,
    utils::types::VertexIdx,
};

fn locate_seed(mesh: &Mesh, seed: [f64; 3]) -> Option<usize> {
    for tet_idx in 0..mesh.tds().num_tets() {
        let Ok(tet) = mesh.tds().get_tet(tet_idx) else {
            continue;
        };
        if tet.is_conceptual() {
            continue;
        }
        let [n0, n1, n2, n3] = tet.nodes();
        let (Some(i0), Some(i1), Some(i2), Some(i3)) =
            (n0.idx(), n1.idx(), n2.idx(), n3.idx())
        else {
            continue;
        };
        let (a, b, c, d) = (
            mesh.coords(i0),
            mesh.coords(i1),
            mesh.coords(i2),
            mesh.coords(i3),
        );
        if predicates::point_in_tetrahedron(&seed, &a, &b, &c, &d) {
            return Some(tet_idx);
        }
    }
    None
}

fn face_key(triple: [VertexIdx; 3]) -> [VertexIdx; 3] {
    let mut key = triple;
    key.sort_unstable();
    key
}

pub(crate) fn flood(
    mesh: &mut Mesh,
    regions: &[Region],
    facet_triangles: &HashSet<[VertexIdx; 3]>,
    behavior: &Behavior,
) -> Result<(), MeshError> {
    for region in regions {
        if behavior.is_interrupted() {
            return Err(MeshError::Interrupted);
        }

        let Some(start) = locate_seed(mesh, region.seed) else {
            continue;
        };

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited.insert(start);

        while let Some(tet_idx) = queue.pop_front() {
            mesh.region_attr.insert(tet_idx, region.attribute);
            if let Some(max_volume) = region.max_volume {
                mesh.volume_constraint.insert(tet_idx, max_volume);
            }

            let Ok(tet) = mesh.tds().get_tet(tet_idx) else {
                continue;
            };

            for tri in tet.half_triangles() {
                let opp = tri.opposite();
                let neighbor_idx = opp.tet().idx();

                if opp.tet().is_conceptual() || visited.contains(&neighbor_idx) {
                    continue;
                }

                let nodes = tri.nodes();
                let is_facet_boundary = nodes
                    .iter()
                    .map(|n| n.idx())
                    .collect::<Option<Vec<_>>>()
                    .map(|idxs| face_key([idxs[0], idxs[1], idxs[2]]))
                    .is_some_and(|key| facet_triangles.contains(&key));

                if is_facet_boundary {
                    continue;
                }

                visited.insert(neighbor_idx);
                queue.push_back(neighbor_idx);
            }
        }
    }

    Ok(())
}
