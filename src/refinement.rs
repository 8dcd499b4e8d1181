//! Quality refinement (spec.md §4.5): repeatedly finds the worst tetrahedron violating the
//! radius-edge ratio bound or a volume constraint, and splits it by inserting a Steiner point at
//! its circumcenter, until none remain or the Steiner point budget is exhausted.
//!
//! Before a tetrahedron is split at its raw circumcenter, we check whether that point would
//! encroach a constrained segment or facet triangle (spec.md §4.4's diametral-sphere/diametral-disk
//! test) — a constrained feature always wins over a tetrahedron's circumcenter, and a segment
//! always wins over a facet, matching Shewchuk's Delaunay refinement priority: a point that would
//! violate a constraint is never actually placed there. Each round also checks whether refinement
//! itself has left an existing vertex inside a constrained feature's diametral ball and splits that
//! feature first, before looking for the next worst tetrahedron.
//!
//! Per spec.md §9's Design Note, candidate tetrahedra are ranked with an actual
//! [`BinaryHeap`] (worst ratio first) rather than a plain queue, since either choice must
//! terminate and a priority order improves convergence. The heap is rebuilt every round: a single
//! Bowyer-Watson insertion can invalidate tetrahedron indices across the whole cavity (arena
//! entries are reclaimed by swap-removal, spec.md §3), so a heap entry from a prior round is not
//! safe to reuse once any insertion has happened.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::{
    behavior::Behavior, error::MeshError, mesh::Mesh, predicates, utils::types::Vertex3,
    utils::types::VertexIdx, vertex::VertexClassification,
};

/// The diametral sphere of segment `(a, b)`: centered at the midpoint, radius half the segment's
/// length. A vertex strictly inside it encroaches the segment (spec.md §4.4).
fn segment_diametral_sphere(mesh: &Mesh, seg: [VertexIdx; 2]) -> (Vertex3, f64) {
    let [a, b] = seg;
    let (pa, pb) = (mesh.coords(a), mesh.coords(b));
    let center = [
        (pa[0] + pb[0]) / 2.0,
        (pa[1] + pb[1]) / 2.0,
        (pa[2] + pb[2]) / 2.0,
    ];
    let radius = distance(&pa, &pb) / 2.0;
    (center, radius)
}

/// The diametral ball of facet triangle `tri`: the sphere sharing the triangle's circumcircle as a
/// great circle. A vertex strictly inside it encroaches the facet (spec.md §4.4).
fn facet_diametral_ball(mesh: &Mesh, tri: [VertexIdx; 3]) -> Option<(Vertex3, f64)> {
    let [a, b, c] = tri;
    let (pa, pb, pc) = (mesh.coords(a), mesh.coords(b), mesh.coords(c));
    predicates::triangle_circumcenter(&pa, &pb, &pc)
}

fn distance(p: &Vertex3, q: &Vertex3) -> f64 {
    ((p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2) + (p[2] - q[2]).powi(2)).sqrt()
}

/// A vertex of `mesh` other than `excluded` that lies strictly inside the ball at `center`/`radius`.
fn vertex_inside(mesh: &Mesh, center: &Vertex3, radius: f64, excluded: &[VertexIdx]) -> bool {
    mesh.vertices()
        .iter()
        .enumerate()
        .any(|(idx, v)| !excluded.contains(&idx) && distance(&v.point(), center) < radius)
}

/// Finds the first constrained segment some vertex encroaches, if any.
fn encroached_segment(mesh: &Mesh) -> Option<usize> {
    mesh.constrained_segments.iter().position(|&seg| {
        let (center, radius) = segment_diametral_sphere(mesh, seg);
        vertex_inside(mesh, &center, radius, &seg)
    })
}

/// Finds the first constrained facet triangle some vertex encroaches, if any.
fn encroached_facet(mesh: &Mesh) -> Option<[VertexIdx; 3]> {
    mesh.constrained_facets
        .iter()
        .copied()
        .find(|&tri| match facet_diametral_ball(mesh, tri) {
            Some((center, radius)) => vertex_inside(mesh, &center, radius, &tri),
            None => false,
        })
}

/// Splits constrained segment `seg` at its midpoint, replacing it in `mesh.constrained_segments`
/// with its two halves.
fn split_segment(mesh: &mut Mesh, seg: [VertexIdx; 2], behavior: &Behavior) -> Result<(), MeshError> {
    let [a, b] = seg;
    let (center, _) = segment_diametral_sphere(mesh, seg);
    let mid = mesh.insert_steiner_point(center, VertexClassification::SegmentSteiner, behavior)?;

    mesh.constrained_segments.retain(|&s| s != seg);
    mesh.constrained_segments.push([a, mid]);
    mesh.constrained_segments.push([mid, b]);
    Ok(())
}

/// Splits constrained facet triangle `tri` at its centroid, replacing it in
/// `mesh.constrained_facets` with its three sub-triangles — mirroring the facet-plane-centroid
/// Steiner point [`crate::constraints`]'s facet recovery uses, since the 3D `predicates` module has
/// no notion of a 2D circumcenter to insert at instead.
fn split_facet(mesh: &mut Mesh, tri: [VertexIdx; 3], behavior: &Behavior) -> Result<(), MeshError> {
    let [a, b, c] = tri;
    let (pa, pb, pc) = (mesh.coords(a), mesh.coords(b), mesh.coords(c));
    let centroid = [
        (pa[0] + pb[0] + pc[0]) / 3.0,
        (pa[1] + pb[1] + pc[1]) / 3.0,
        (pa[2] + pb[2] + pc[2]) / 3.0,
    ];
    let mid = mesh.insert_steiner_point(centroid, VertexClassification::FacetSteiner, behavior)?;

    let sort3 = |t: [VertexIdx; 3]| {
        let mut t = t;
        t.sort_unstable();
        t
    };
    mesh.constrained_facets.remove(&sort3(tri));
    mesh.constrained_facets.insert(sort3([a, b, mid]));
    mesh.constrained_facets.insert(sort3([b, c, mid]));
    mesh.constrained_facets.insert(sort3([c, a, mid]));
    Ok(())
}

/// Per-round statistics, useful for diagnosing whether refinement is converging.
#[derive(Debug, Default, Clone, Copy)]
pub struct RefinementStats {
    pub steiner_points_placed: usize,
    pub rounds: usize,
}

struct BadTet {
    badness: f64,
    tet_idx: usize,
}

impl PartialEq for BadTet {
    fn eq(&self, other: &Self) -> bool {
        self.badness == other.badness
    }
}
impl Eq for BadTet {}
impl PartialOrd for BadTet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for BadTet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.badness.partial_cmp(&other.badness).unwrap_or(Ordering::Equal)
    }
}

/// A tetrahedron's radius-edge ratio overshoot and/or volume overshoot, whichever is worse,
/// normalized so `<= 0.0` means the tetrahedron satisfies both bounds (spec.md §4.1/§4.5).
fn badness(mesh: &Mesh, tet_idx: usize, behavior: &Behavior) -> Option<f64> {
    let tet = mesh.tds().get_tet(tet_idx).ok()?;
    if tet.is_conceptual() || mesh.is_excluded(tet_idx) {
        return None;
    }
    let [n0, n1, n2, n3] = tet.nodes();
    let (i0, i1, i2, i3) = (n0.idx()?, n1.idx()?, n2.idx()?, n3.idx()?);
    let (a, b, c, d) = (
        mesh.coords(i0),
        mesh.coords(i1),
        mesh.coords(i2),
        mesh.coords(i3),
    );

    let ratio = predicates::radius_edge_ratio(&a, &b, &c, &d)?;
    let mut worst = ratio - behavior.quality_bound;

    let volume_bound = mesh
        .volume_constraint
        .get(&tet_idx)
        .copied()
        .or(behavior.max_volume);
    if let Some(bound) = volume_bound {
        let volume = predicates::volume(&a, &b, &c, &d);
        worst = worst.max(volume - bound);
    }

    (worst > 0.0).then_some(worst)
}

fn worst_tet(mesh: &Mesh, behavior: &Behavior) -> Option<usize> {
    let mut heap = BinaryHeap::new();
    for tet_idx in 0..mesh.tds().num_tets() {
        if let Some(badness) = badness(mesh, tet_idx, behavior) {
            heap.push(BadTet { badness, tet_idx });
        }
    }
    heap.pop().map(|b| b.tet_idx)
}

/// Enforces a conforming Delaunay tetrahedralization (spec.md §6's `-D` switch): eliminates every
/// vertex that encroaches a constrained segment or facet triangle, independent of any radius-edge
/// quality bound. Returns [`crate::error::MeshError::RefinementDidNotConverge`] if the Steiner
/// point budget runs out first.
pub(crate) fn enforce_conforming(mesh: &mut Mesh, behavior: &Behavior) -> Result<RefinementStats, MeshError> {
    let mut stats = RefinementStats::default();

    loop {
        if behavior.is_interrupted() {
            return Err(MeshError::Interrupted);
        }

        let seg = encroached_segment(mesh);
        let tri = seg.is_none().then(|| encroached_facet(mesh)).flatten();
        if seg.is_none() && tri.is_none() {
            break;
        }

        if stats.steiner_points_placed >= behavior.max_refinement_points {
            return Err(MeshError::RefinementDidNotConverge);
        }

        match (seg, tri) {
            (Some(seg), _) => split_segment(mesh, seg, behavior)?,
            (None, Some(tri)) => split_facet(mesh, tri, behavior)?,
            (None, None) => unreachable!(),
        }
        stats.steiner_points_placed += 1;
        stats.rounds += 1;
    }

    Ok(stats)
}

/// Refines `mesh` in place until it satisfies `behavior`'s quality bounds or the Steiner point
/// budget (`Behavior::max_refinement_points`) runs out, in which case
/// [`crate::error::MeshError::RefinementDidNotConverge`] is returned with the mesh left at its
/// last valid state (the caller recovers it from [`crate::error::MeshFailure::partial`]).
pub(crate) fn refine(mesh: &mut Mesh, behavior: &Behavior) -> Result<RefinementStats, MeshError> {
    let mut stats = RefinementStats::default();

    loop {
        if behavior.is_interrupted() {
            return Err(MeshError::Interrupted);
        }

        // A vertex already inside a constrained feature's diametral ball takes priority over tet
        // quality, and a segment always takes priority over a facet (spec.md §4.4).
        if let Some(seg) = encroached_segment(mesh) {
            if stats.steiner_points_placed >= behavior.max_refinement_points {
                return Err(MeshError::RefinementDidNotConverge);
            }
            split_segment(mesh, seg, behavior)?;
            stats.steiner_points_placed += 1;
            stats.rounds += 1;
            continue;
        }
        if let Some(tri) = encroached_facet(mesh) {
            if stats.steiner_points_placed >= behavior.max_refinement_points {
                return Err(MeshError::RefinementDidNotConverge);
            }
            split_facet(mesh, tri, behavior)?;
            stats.steiner_points_placed += 1;
            stats.rounds += 1;
            continue;
        }

        let Some(tet_idx) = worst_tet(mesh, behavior) else {
            break;
        };

        if stats.steiner_points_placed >= behavior.max_refinement_points {
            return Err(MeshError::RefinementDidNotConverge);
        }

        let tet = mesh.tds().get_tet(tet_idx).map_err(MeshError::Internal)?;
        let [n0, n1, n2, n3] = tet.nodes();
        let (i0, i1, i2, i3) = (
            n0.idx().ok_or_else(|| MeshError::Internal(anyhow::anyhow!("ghost tet in refinement queue")))?,
            n1.idx().ok_or_else(|| MeshError::Internal(anyhow::anyhow!("ghost tet in refinement queue")))?,
            n2.idx().ok_or_else(|| MeshError::Internal(anyhow::anyhow!("ghost tet in refinement queue")))?,
            n3.idx().ok_or_else(|| MeshError::Internal(anyhow::anyhow!("ghost tet in refinement queue")))?,
        );
        let (a, b, c, d) = (
            mesh.coords(i0),
            mesh.coords(i1),
            mesh.coords(i2),
            mesh.coords(i3),
        );

        let (center, _radius) = predicates::circumcenter(&a, &b, &c, &d)
            .ok_or_else(|| MeshError::Internal(anyhow::anyhow!("flat tetrahedron in refinement queue")))?;

        // The circumcenter we're about to insert might itself encroach a constrained feature;
        // when it does, split that feature instead of placing the raw circumcenter, segments
        // beating facets, so the point we actually place never violates a constraint.
        if let Some(seg) = mesh
            .constrained_segments
            .iter()
            .copied()
            .find(|&seg| {
                let (c, r) = segment_diametral_sphere(mesh, seg);
                distance(&center, &c) < r
            })
        {
            split_segment(mesh, seg, behavior)?;
        } else if let Some(tri) = mesh.constrained_facets.iter().copied().find(|&tri| {
            facet_diametral_ball(mesh, tri).is_some_and(|(c, r)| distance(&center, &c) < r)
        }) {
            split_facet(mesh, tri, behavior)?;
        } else {
            mesh.insert_steiner_point(center, VertexClassification::RefinementSteiner, behavior)?;
        }
        stats.steiner_points_placed += 1;
        stats.rounds += 1;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delaunay;

    #[test]
    fn refines_a_sliver_free_cube() {
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
        let mut behavior = Behavior::default();
        behavior.quality = true;
        behavior.quality_bound = 5.0;
        behavior.max_refinement_points = 1000;

        let mut mesh = delaunay::tetrahedralize(&points, &behavior).unwrap();
        let stats = refine(&mut mesh, &behavior).unwrap();
        assert!(stats.rounds < 1000);
        assert!(mesh.is_sound());
    }

    #[test]
    fn conforming_pass_splits_an_encroached_segment() {
        let points = vec![
            [0.0, 0.0, 0.0],
            [4.0, 0.0, 0.0],
            [2.0, 0.3, 0.0],
            [2.0, 3.0, 0.0],
            [2.0, 1.0, 3.0],
        ];
        let behavior = Behavior::default();
        let mut mesh = delaunay::tetrahedralize(&points, &behavior).unwrap();
        mesh.constrained_segments = vec![[0, 1]];

        assert_eq!(encroached_segment(&mesh), Some(0));

        let stats = enforce_conforming(&mut mesh, &behavior).unwrap();
        assert!(stats.steiner_points_placed > 0);
        assert!(!mesh.constrained_segments.contains(&[0, 1]));
        assert_eq!(encroached_segment(&mesh), None);
    }
}
