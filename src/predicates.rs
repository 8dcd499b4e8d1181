//! Sign-exact geometric predicates and the derived quantities built on top of them.
//!
//! `orient3d` and `insphere` are the two load-bearing tests (spec.md §4.1): both must be exact in
//! sign on all finite floating-point inputs. We get that from [`robust`], which implements
//! Shewchuk's adaptive-precision expansions (fast floating-point estimate, forward-error bound,
//! widen to an exact expansion only when the estimate is indeterminate) — the same fallback tower
//! spec.md §4.1 and the Design Notes (§9) describe, in safe Rust rather than FFI.
//!
//! `robust` does not implement symbolic perturbation, so exact zeros are possible. The `sos`
//! submodule resolves them deterministically: every tie is broken by the vertex indices involved,
//! never by anything that could vary between two runs on the same input.

use crate::utils::types::Vertex3;
use robust::{Coord3D, insphere as robust_insphere, orient3d as robust_orient3d};

/// The sign of a predicate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    #[must_use]
    pub const fn of(x: f64) -> Self {
        if x > 0.0 {
            Sign::Positive
        } else if x < 0.0 {
            Sign::Negative
        } else {
            Sign::Zero
        }
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Sign::Positive)
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        matches!(self, Sign::Negative)
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        matches!(self, Sign::Zero)
    }
}

#[inline]
fn coord3(p: &Vertex3) -> Coord3D<f64> {
    Coord3D {
        x: p[0],
        y: p[1],
        z: p[2],
    }
}

/// Sign of the signed volume of tetrahedron `abcd`. Positive iff `d` lies above the plane through
/// `a, b, c` seen from outside the outward normal given by the right-hand rule on `a -> b -> c`.
#[must_use]
pub fn orient3d(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> Sign {
    Sign::of(robust_orient3d(coord3(a), coord3(b), coord3(c), coord3(d)))
}

/// Sign distinguishing whether `e` lies inside (positive), on (zero), or outside (negative) the
/// circumsphere of `abcd`, assuming `orient3d(a, b, c, d)` is positive.
#[must_use]
pub fn insphere(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3, e: &Vertex3) -> Sign {
    Sign::of(robust_insphere(
        coord3(a),
        coord3(b),
        coord3(c),
        coord3(d),
        coord3(e),
    ))
}

/// Symbolic perturbation (simulation of simplicity), after Edelsbrunner & Mücke (1990).
///
/// When a predicate returns [`Sign::Zero`], the caller perturbs the matrix that defines it: every
/// vertex's row is displaced by an independent infinitesimal in each of its non-affine columns,
/// smaller vertex index first and, within a vertex, lower column first, each strictly dominant
/// over everything that comes after it. The tie resolves to the sign of the first substituted-row
/// minor that comes out nonzero. Because the perturbation is keyed by vertex identity rather than
/// argument position, swapping any two arguments swaps two rows of the same matrix under the same
/// priority order, which negates the determinant exactly as a real orientation/insphere test
/// must — so this is a genuine simulated perturbation of the point set, not a position-dependent
/// heuristic.
pub mod sos {
    use crate::utils::types::{Vertex3, VertexIdx};
    use core::cmp::Ordering;

    /// Exact determinant via cofactor expansion along the first row. Only ever called on the
    /// small (4x4, 5x5) matrices the predicates in this module need.
    fn det(m: &[Vec<f64>]) -> f64 {
        let n = m.len();
        if n == 1 {
            return m[0][0];
        }
        let mut total = 0.0;
        let mut sign = 1.0;
        for col in 0..n {
            if m[0][col] != 0.0 {
                let minor: Vec<Vec<f64>> = m[1..]
                    .iter()
                    .map(|row| {
                        row.iter()
                            .enumerate()
                            .filter(|&(c, _)| c != col)
                            .map(|(_, &v)| v)
                            .collect()
                    })
                    .collect();
                total += sign * m[0][col] * det(&minor);
            }
            sign = -sign;
        }
        total
    }

    /// Resolves a tied (exact-zero) predicate by perturbing its defining matrix.
    ///
    /// `rows` is the predicate's matrix, one row per argument in argument order, each row ending
    /// in the trailing affine `1` (every column before it is a candidate perturbation direction).
    /// `indices` gives the vertex index behind each row, same order. Never returns
    /// [`Ordering::Equal`]: real points carry distinct indices (the no-duplicate-vertices
    /// invariant, spec.md §3), so some substituted-row minor is always eventually nonzero.
    fn resolve(rows: &[Vec<f64>], indices: &[VertexIdx]) -> Ordering {
        debug_assert_eq!(rows.len(), indices.len());
        debug_assert!(
            indices.windows(2).all(|w| w[0] != w[1]),
            "symbolic perturbation requires distinct vertex indices"
        );

        let n = rows.len();
        let perturb_cols = n - 1;

        let mut row_order: Vec<usize> = (0..n).collect();
        row_order.sort_by_key(|&r| indices[r]);

        for r in row_order {
            for c in 0..perturb_cols {
                let mut m: Vec<Vec<f64>> = rows.to_vec();
                m[r] = vec![0.0; n];
                m[r][c] = 1.0;
                let d = det(&m);
                if d > 0.0 {
                    return Ordering::Greater;
                } else if d < 0.0 {
                    return Ordering::Less;
                }
            }
        }

        unreachable!("simulation of simplicity failed to resolve a tie among distinct vertices")
    }

    /// Resolves an exact-zero `orient3d(a, b, c, d)`.
    #[must_use]
    pub fn resolve_orient3d(pts: [&Vertex3; 4], indices: [VertexIdx; 4]) -> Ordering {
        let rows = pts.iter().map(|p| vec![p[0], p[1], p[2], 1.0]).collect::<Vec<_>>();
        resolve(&rows, &indices)
    }

    /// Resolves an exact-zero `insphere(a, b, c, d, e)`.
    #[must_use]
    pub fn resolve_insphere(pts: [&Vertex3; 5], indices: [VertexIdx; 5]) -> Ordering {
        let rows = pts
            .iter()
            .map(|p| {
                let w = p[0] * p[0] + p[1] * p[1] + p[2] * p[2];
                vec![p[0], p[1], p[2], w, 1.0]
            })
            .collect::<Vec<_>>();
        resolve(&rows, &indices)
    }
}

/// Signed volume of tetrahedron `abcd` (the real-valued quantity whose sign `orient3d` reports).
#[must_use]
pub fn signed_volume(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> f64 {
    let ad = [a[0] - d[0], a[1] - d[1], a[2] - d[2]];
    let bd = [b[0] - d[0], b[1] - d[1], b[2] - d[2]];
    let cd = [c[0] - d[0], c[1] - d[1], c[2] - d[2]];
    let cross = [
        bd[1] * cd[2] - bd[2] * cd[1],
        bd[2] * cd[0] - bd[0] * cd[2],
        bd[0] * cd[1] - bd[1] * cd[0],
    ];
    (ad[0] * cross[0] + ad[1] * cross[1] + ad[2] * cross[2]) / 6.0
}

/// Unsigned volume of tetrahedron `abcd`.
#[must_use]
pub fn volume(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> f64 {
    signed_volume(a, b, c, d).abs()
}

fn dist(a: &Vertex3, b: &Vertex3) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// The six edge lengths of tetrahedron `abcd`, in the order `ab, ac, ad, bc, bd, cd`.
#[must_use]
pub fn edge_lengths(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> [f64; 6] {
    [
        dist(a, b),
        dist(a, c),
        dist(a, d),
        dist(b, c),
        dist(b, d),
        dist(c, d),
    ]
}

/// Shortest edge length of tetrahedron `abcd`.
#[must_use]
pub fn shortest_edge(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> f64 {
    edge_lengths(a, b, c, d)
        .into_iter()
        .fold(f64::INFINITY, f64::min)
}

/// Longest edge length of tetrahedron `abcd`.
#[must_use]
pub fn longest_edge(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> f64 {
    edge_lengths(a, b, c, d)
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Circumcenter and circumradius of tetrahedron `abcd`, from the linear system equating each
/// vertex's distance to the center, solved with `nalgebra`.
///
/// Returns `None` for a degenerate (zero-volume) tetrahedron, which has no finite circumcenter.
#[must_use]
pub fn circumcenter(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> Option<(Vertex3, f64)> {
    use nalgebra::{Matrix3, Vector3};

    let to_v = |p: &Vertex3| Vector3::new(p[0], p[1], p[2]);
    let (va, vb, vc, vd) = (to_v(a), to_v(b), to_v(c), to_v(d));

    let row = |p: Vector3<f64>, q: Vector3<f64>| {
        let diff = q - p;
        let rhs = (q.dot(&q) - p.dot(&p)) / 2.0;
        (diff, rhs)
    };

    let (r0, rhs0) = row(va, vb);
    let (r1, rhs1) = row(va, vc);
    let (r2, rhs2) = row(va, vd);

    let m = Matrix3::new(r0.x, r0.y, r0.z, r1.x, r1.y, r1.z, r2.x, r2.y, r2.z);
    let rhs = Vector3::new(rhs0, rhs1, rhs2);

    let inv = m.try_inverse()?;
    let center = inv * rhs;
    let radius = (center - va).norm();

    Some(([center.x, center.y, center.z], radius))
}

/// Circumcenter and circumradius of a triangle embedded in 3D space (it lies in the triangle's own
/// plane). Used by encroachment checks on recovered facet triangles (spec.md §4.5): a point inside
/// the sphere with this center and radius encroaches the triangle.
///
/// Returns `None` for a degenerate (collinear) triangle.
#[must_use]
pub fn triangle_circumcenter(a: &Vertex3, b: &Vertex3, c: &Vertex3) -> Option<(Vertex3, f64)> {
    use nalgebra::Vector3;

    let to_v = |p: &Vertex3| Vector3::new(p[0], p[1], p[2]);
    let (va, vb, vc) = (to_v(a), to_v(b), to_v(c));

    let ab = vb - va;
    let ac = vc - va;
    let cross = ab.cross(&ac);
    let denom = 2.0 * cross.dot(&cross);
    if denom.abs() < f64::EPSILON {
        return None;
    }

    let offset = (ac.dot(&ac) * cross.cross(&ab) + ab.dot(&ab) * ac.cross(&cross)) / denom;
    let center = va + offset;
    let radius = offset.norm();

    Some(([center.x, center.y, center.z], radius))
}

/// Radius-edge ratio `circumradius / shortest edge length` used by refinement (spec.md §4.1/4.5).
#[must_use]
pub fn radius_edge_ratio(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> Option<f64> {
    let (_, radius) = circumcenter(a, b, c, d)?;
    let shortest = shortest_edge(a, b, c, d);
    if shortest <= 0.0 {
        None
    } else {
        Some(radius / shortest)
    }
}

/// Aspect ratio as defined by spec.md §4.1: `circumradius / shortest edge`. This is the exact
/// same quantity as [`radius_edge_ratio`]; the spec gives it two names and we keep both so call
/// sites can use whichever reads better in context.
#[must_use]
pub fn aspect_ratio(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> Option<f64> {
    radius_edge_ratio(a, b, c, d)
}

fn sub(a: &Vertex3, b: &Vertex3) -> Vertex3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: &Vertex3, b: &Vertex3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(a: &Vertex3) -> f64 {
    dot(a, a).sqrt()
}

/// Component of `v` orthogonal to `axis`.
fn reject(v: &Vertex3, axis: &Vertex3) -> Vertex3 {
    let k = dot(v, axis) / dot(axis, axis);
    [v[0] - k * axis[0], v[1] - k * axis[1], v[2] - k * axis[2]]
}

/// The six dihedral angles of tetrahedron `abcd`, in radians, in the edge order of
/// [`edge_lengths`] (`ab, ac, ad, bc, bd, cd`) — each is the angle, measured along that edge,
/// between the two faces that share it.
#[must_use]
pub fn dihedral_angles(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> [f64; 6] {
    let angle_along = |p: &Vertex3, q: &Vertex3, r: &Vertex3, s: &Vertex3| -> f64 {
        let u = sub(q, p);
        let v1 = reject(&sub(r, p), &u);
        let v2 = reject(&sub(s, p), &u);
        let cos_theta = dot(&v1, &v2) / (norm(&v1) * norm(&v2));
        cos_theta.clamp(-1.0, 1.0).acos()
    };

    [
        angle_along(a, b, c, d),
        angle_along(a, c, b, d),
        angle_along(a, d, b, c),
        angle_along(b, c, a, d),
        angle_along(b, d, a, c),
        angle_along(c, d, a, b),
    ]
}

/// Point-in-tetrahedron test via four `orient3d` calls against the tetrahedron's faces (spec.md
/// §4.1). Assumes `abcd` is positively oriented; `p` is inside (or on the boundary) iff it is on
/// the non-negative side of all four faces.
#[must_use]
pub fn point_in_tetrahedron(
    p: &Vertex3,
    a: &Vertex3,
    b: &Vertex3,
    c: &Vertex3,
    d: &Vertex3,
) -> bool {
    !orient3d(b, d, c, p).is_negative()
        && !orient3d(a, c, d, p).is_negative()
        && !orient3d(a, d, b, p).is_negative()
        && !orient3d(a, b, c, p).is_negative()
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Vertex3 = [0.0, 0.0, 0.0];
    const B: Vertex3 = [1.0, 0.0, 0.0];
    const C: Vertex3 = [0.0, 1.0, 0.0];
    const D: Vertex3 = [0.0, 0.0, 1.0];

    #[test]
    fn orient3d_sign_matches_handedness() {
        assert_eq!(orient3d(&A, &B, &C, &D), Sign::Positive);
        assert_eq!(orient3d(&A, &C, &B, &D), Sign::Negative);
    }

    #[test]
    fn insphere_detects_center_inside() {
        let center = [0.25, 0.25, 0.25];
        assert_eq!(insphere(&A, &B, &C, &D, &center), Sign::Positive);
        let far = [10.0, 10.0, 10.0];
        assert_eq!(insphere(&A, &B, &C, &D, &far), Sign::Negative);
    }

    #[test]
    fn regular_tetrahedron_volume_and_ratio() {
        let a = [1.0, 1.0, 1.0];
        let b = [1.0, -1.0, -1.0];
        let c = [-1.0, 1.0, -1.0];
        let d = [-1.0, -1.0, 1.0];
        let vol = volume(&a, &b, &c, &d);
        let e = dist(&a, &b);
        let expected = e.powi(3) / (6.0 * 2.0_f64.sqrt());
        assert!((vol - expected).abs() < 1e-9);

        let ratio = radius_edge_ratio(&a, &b, &c, &d).unwrap();
        assert!((ratio - (3.0_f64 / 8.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn sos_orient3d_tie_break_is_antisymmetric_under_swap() {
        // Four coplanar points: orient3d is an exact zero, forcing the tie-break.
        let a = [0.0, 0.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        let c = [0.0, 1.0, 0.0];
        let d = [1.0, 1.0, 0.0];
        assert_eq!(orient3d(&a, &b, &c, &d), Sign::Zero);

        let forward = sos::resolve_orient3d([&a, &b, &c, &d], [3, 5, 7, 20]);
        // swap(0, 1) is a single transposition: must negate.
        let swapped = sos::resolve_orient3d([&b, &a, &c, &d], [5, 3, 7, 20]);
        assert_eq!(forward, swapped.reverse());

        // swap(0,1) composed with swap(2,3) is an even permutation: must preserve sign.
        let even_perm = sos::resolve_orient3d([&b, &a, &d, &c], [5, 3, 20, 7]);
        assert_eq!(forward, even_perm);
    }

    #[test]
    fn sos_orient3d_tie_break_is_deterministic() {
        let a = [0.0, 0.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        let c = [0.0, 1.0, 0.0];
        let d = [1.0, 1.0, 0.0];
        let once = sos::resolve_orient3d([&a, &b, &c, &d], [1, 5, 9, 12]);
        let twice = sos::resolve_orient3d([&a, &b, &c, &d], [1, 5, 9, 12]);
        assert_eq!(once, twice);
    }

    #[test]
    fn point_in_tetrahedron_basic() {
        let inside = [0.1, 0.1, 0.1];
        let outside = [2.0, 2.0, 2.0];
        assert!(point_in_tetrahedron(&inside, &A, &B, &C, &D));
        assert!(!point_in_tetrahedron(&outside, &A, &B, &C, &D));
    }
}
