//! Integration tests for the boundary scenarios of spec.md §8 (A-F).

use tetramesh::{predicates, Behavior, Facet, Plc, Segment};

fn total_volume(mesh: &tetramesh::Mesh) -> f64 {
    mesh.tets()
        .iter()
        .map(|[a, b, c, d]| predicates::volume(a, b, c, d))
        .sum()
}

fn cube_vertices(origin: [f64; 3], size: f64) -> Vec<[f64; 3]> {
    let [x, y, z] = origin;
    vec![
        [x, y, z],
        [x + size, y, z],
        [x, y + size, z],
        [x, y, z + size],
        [x + size, y + size, z],
        [x + size, y, z + size],
        [x, y + size, z + size],
        [x + size, y + size, z + size],
    ]
}

/// Quad facets and their bounding segments for a cube whose 8 vertices are ordered as
/// `cube_vertices` produces them: 0=000 1=100 2=010 3=001 4=110 5=101 6=011 7=111.
fn cube_plc() -> Plc {
    let quads = [
        [0, 1, 4, 2], // z = 0
        [3, 5, 7, 6], // z = size
        [0, 1, 5, 3], // y = 0
        [2, 4, 7, 6], // y = size
        [0, 2, 6, 3], // x = 0
        [1, 4, 7, 5], // x = size
    ];

    let mut segments = Vec::new();
    let mut facets = Vec::new();
    for quad in quads {
        for i in 0..4 {
            segments.push(Segment {
                endpoints: [quad[i], quad[(i + 1) % 4]],
                marker: 1,
            });
        }
        facets.push(Facet {
            polygon: quad.to_vec(),
            holes: Vec::new(),
            marker: 1,
        });
    }

    Plc {
        segments,
        facets,
        regions: Vec::new(),
        holes: Vec::new(),
    }
}

#[test]
fn scenario_a_unit_cube_plc_has_no_steiner_points_and_unit_volume() {
    let points = cube_vertices([0.0, 0.0, 0.0], 1.0);
    let plc = cube_plc();

    let mut behavior = Behavior::default();
    behavior.plc = true;

    let mesh = tetramesh::tetrahedralize(&points, Some(&plc), &behavior).unwrap();

    // Every square facet has two valid diagonals; when the unconstrained Delaunay
    // tetrahedralization picks the other one, facet recovery flips it into place instead of
    // falling back to a Steiner point, so the cube's 8 corners are exactly the mesh's vertices.
    assert_eq!(mesh.vertices().len(), 8);
    assert!((total_volume(&mesh) - 1.0).abs() < 1e-9);
    assert!(mesh.is_sound());
}

#[test]
fn scenario_b_regular_tetrahedron_has_known_volume_and_ratio() {
    let a = [1.0, 1.0, 1.0];
    let b = [1.0, -1.0, -1.0];
    let c = [-1.0, 1.0, -1.0];
    let d = [-1.0, -1.0, 1.0];
    let points = vec![a, b, c, d];

    let mesh = tetramesh::tetrahedralize(&points, None, &Behavior::default()).unwrap();

    assert_eq!(mesh.tets().len(), 1);
    let [pa, pb, pc, pd] = mesh.tets()[0];
    let volume = predicates::volume(&pa, &pb, &pc, &pd);
    let edge = ((pa[0] - pb[0]).powi(2) + (pa[1] - pb[1]).powi(2) + (pa[2] - pb[2]).powi(2)).sqrt();
    let expected_volume = edge.powi(3) / (6.0 * 2.0_f64.sqrt());
    assert!((volume - expected_volume).abs() < 1e-9);

    let ratio = predicates::radius_edge_ratio(&pa, &pb, &pc, &pd).unwrap();
    assert!((ratio - (3.0_f64 / 8.0).sqrt()).abs() < 1e-9);
}

#[test]
fn scenario_c_twenty_point_convex_hull_keeps_every_vertex() {
    let points: Vec<[f64; 3]> = vec![
        [0.9, 0.1, -0.2],
        [-0.8, 0.4, 0.3],
        [0.2, -0.9, 0.5],
        [-0.3, -0.7, -0.6],
        [0.6, 0.6, 0.6],
        [-0.6, -0.6, 0.6],
        [0.6, -0.6, -0.6],
        [-0.6, 0.6, -0.6],
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [0.3, 0.3, -0.9],
        [-0.3, -0.3, 0.9],
        [0.7, -0.2, 0.4],
        [-0.7, 0.2, -0.4],
        [0.1, 0.8, -0.3],
        [-0.1, -0.8, 0.3],
    ];

    let mesh = tetramesh::tetrahedralize(&points, None, &Behavior::default()).unwrap();

    assert_eq!(mesh.vertices().len(), 20);
    assert!(mesh.is_sound());
    assert!(total_volume(&mesh) > 0.0);

    // Every boundary vertex participates in at least 3 hull triangles (a convex polyhedron
    // vertex has degree >= 3).
    let boundary = mesh.boundary_faces();
    let mut incidence = std::collections::HashMap::new();
    for face in &boundary {
        for node in face {
            if let Some(idx) = node.idx() {
                *incidence.entry(idx).or_insert(0) += 1;
            }
        }
    }
    assert!(incidence.values().all(|&count| count >= 3));
}

#[test]
fn scenario_d_cospherical_octahedron_is_deterministic() {
    let points = vec![
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];

    let first = tetramesh::tetrahedralize(&points, None, &Behavior::default()).unwrap();
    let second = tetramesh::tetrahedralize(&points, None, &Behavior::default()).unwrap();

    assert_eq!(first.tets().len(), 4);
    assert_eq!(second.tets().len(), 4);
    assert!(first.is_sound());
    assert_eq!(first.par_is_regular(), 1.0);

    for tet in first.tets() {
        let [a, b, c, d] = tet;
        assert!(predicates::volume(&a, &b, &c, &d) > 1e-12, "no zero-volume cells");
    }

    // Symbolic perturbation is index-deterministic, not RNG-seeded: the same input produces
    // bit-identical vertex coordinates and the same tetrahedron count run to run.
    assert_eq!(first.tets().len(), second.tets().len());
}

#[test]
fn scenario_e_quality_refinement_bounds_ratio_and_keeps_cube_planes() {
    let points = cube_vertices([0.0, 0.0, 0.0], 1.0);

    let mut behavior = Behavior::default();
    behavior.quality = true;
    behavior.quality_bound = 1.2;
    behavior.max_refinement_points = 2000;

    let mesh = tetramesh::tetrahedralize(&points, None, &behavior).unwrap();

    for tet in mesh.tets() {
        let [a, b, c, d] = tet;
        if let Some(ratio) = predicates::radius_edge_ratio(&a, &b, &c, &d) {
            assert!(ratio <= 1.2 + 1e-6, "ratio {ratio} exceeds bound");
        }
    }

    for face in mesh.boundary_faces() {
        let coords: Vec<[f64; 3]> = face.iter().filter_map(|n| n.idx()).map(|i| mesh.coords(i)).collect();
        if coords.len() < 3 {
            continue;
        }
        let on_plane = |axis: usize, value: f64| {
            coords.iter().all(|p| (p[axis] - value).abs() < 1e-9)
        };
        let on_cube_face = [0.0, 1.0].iter().any(|&v| on_plane(0, v))
            || [0.0, 1.0].iter().any(|&v| on_plane(1, v))
            || [0.0, 1.0].iter().any(|&v| on_plane(2, v));
        assert!(on_cube_face, "boundary triangle left the cube's six planes");
    }
}

#[test]
fn scenario_f_cube_with_hole_removes_interior_cube() {
    let outer = cube_vertices([0.0, 0.0, 0.0], 3.0);
    let inner = cube_vertices([1.0, 1.0, 1.0], 1.0);
    let points: Vec<[f64; 3]> = outer.iter().chain(inner.iter()).copied().collect();

    // The inner cube's facets bound the hole flood the same way the outer cube's bound the hull
    // (cube_plc() builds quads/segments relative to the 8-vertex numbering `cube_vertices`
    // produces; the inner cube's indices are the outer cube's plus 8).
    let mut plc = cube_plc();
    let mut inner_plc = cube_plc();
    for segment in &mut inner_plc.segments {
        segment.endpoints = segment.endpoints.map(|idx| idx + 8);
    }
    for facet in &mut inner_plc.facets {
        facet.polygon = facet.polygon.iter().map(|idx| idx + 8).collect();
    }
    plc.segments.extend(inner_plc.segments);
    plc.facets.extend(inner_plc.facets);

    plc.holes.push(tetramesh::Hole {
        seed: [1.5, 1.5, 1.5],
    });

    let mut behavior = Behavior::default();
    behavior.plc = true;

    let mesh = tetramesh::tetrahedralize(&points, Some(&plc), &behavior).unwrap();

    // No output tetrahedron's centroid lies inside the interior cube.
    for [a, b, c, d] in mesh.tets() {
        let centroid = [
            (a[0] + b[0] + c[0] + d[0]) / 4.0,
            (a[1] + b[1] + c[1] + d[1]) / 4.0,
            (a[2] + b[2] + c[2] + d[2]) / 4.0,
        ];
        let inside_hole = (1.0..2.0).contains(&centroid[0])
            && (1.0..2.0).contains(&centroid[1])
            && (1.0..2.0).contains(&centroid[2]);
        assert!(!inside_hole, "tetrahedron centroid {centroid:?} lies inside the hole");
    }

    let total: f64 = mesh
        .tets()
        .iter()
        .map(|[a, b, c, d]| predicates::volume(a, b, c, d))
        .sum();
    assert!((total - (27.0 - 1.0)).abs() < 1e-6);
}
