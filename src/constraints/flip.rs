//! Bistellar 2-3 flips (spec.md §4.4): the primary segment/facet recovery mechanism, tried before
//! falling back to a Steiner point. Two tetrahedra sharing a triangular face are replaced by three
//! tetrahedra sharing the new edge between their two apexes, whenever the bipyramid they form is
//! convex — this is the textbook flip underlying incremental constrained Delaunay recovery
//! (Shewchuk's "General-Dimension Constrained Delaunay Triangulations").
//!
//! Only the 2-3 flip is implemented. Recovering an edge or triangle that needs a longer flip
//! sequence (3-2, 4-4, or a non-convex local configuration) falls through to the Steiner fallback
//! the two recovery modules already have.

use crate::{mesh::Mesh, predicates, utils::types::VertexIdx};

/// Tries to create edge `(a, b)` with a single 2-3 flip. Scans every internal face for one whose
/// two apexes are exactly `{a, b}` and flips the first one found to be geometrically valid.
/// Returns `true` if the edge now exists.
pub(crate) fn try_create_edge(mesh: &mut Mesh, a: VertexIdx, b: VertexIdx) -> bool {
    let num_tets = mesh.tds().num_tets();
    for tet_idx in 0..num_tets {
        let Ok(tet) = mesh.tds().get_tet(tet_idx) else {
            continue;
        };
        if tet.is_conceptual() {
            continue;
        }

        for tri in tet.half_triangles() {
            let opp = tri.opposite();
            if opp.tet().is_conceptual() {
                continue;
            }

            let (Some(x), Some(y)) = (tri.opposite_node().idx(), opp.opposite_node().idx()) else {
                continue;
            };
            if !((x == a && y == b) || (x == b && y == a)) {
                continue;
            }

            if try_flip_at(mesh, tri.idx()) {
                return true;
            }
        }
    }
    false
}

/// Checks convexity of the bipyramid at half-triangle `shared` and, if valid, performs the flip.
fn try_flip_at(mesh: &mut Mesh, shared: usize) -> bool {
    let Ok(tri1) = mesh.tds().get_half_tri(shared) else {
        return false;
    };
    let tri2 = tri1.opposite();
    let [u, v, w] = tri1.nodes();
    let x = tri1.opposite_node();
    let y = tri2.opposite_node();

    let (Some(u), Some(v), Some(w), Some(x), Some(y)) =
        (u.idx(), v.idx(), w.idx(), x.idx(), y.idx())
    else {
        return false;
    };

    let (pu, pv, pw, px, py) = (
        mesh.coords(u),
        mesh.coords(v),
        mesh.coords(w),
        mesh.coords(x),
        mesh.coords(y),
    );

    // The flip is valid iff segment x-y crosses the interior of triangle (u, v, w), i.e. iff all
    // three sub-tetrahedra of the proposed retriangulation come out positively oriented, matching
    // the orientation convention the arena already holds T1 = (u, v, w, x) in.
    let valid = predicates::orient3d(&pu, &pv, &px, &py).is_positive()
        && predicates::orient3d(&pv, &pw, &px, &py).is_positive()
        && predicates::orient3d(&pw, &pu, &px, &py).is_positive();
    if !valid {
        return false;
    }

    mesh.tds.flip23(shared).is_ok()
}
