//! Segment recovery (spec.md §4.4): a constrained edge is "recovered" once the mesh store
//! contains a halfedge between its two endpoints. When it doesn't, we first try a single 2-3 flip
//! ([`super::flip`]) to create it directly. If no flip applies, we fall back to splitting the
//! segment at its midpoint and recursing on the two halves, bounded by
//! `Behavior::max_steiner_per_feature`.

use super::flip;
use crate::{
    behavior::Behavior, error::MeshError, mesh::Mesh, node::VertexNode, plc::Segment,
    utils::types::VertexIdx, vertex::VertexClassification,
};

fn is_recovered(mesh: &Mesh, a: VertexIdx, b: VertexIdx) -> bool {
    let node_a = VertexNode::Casual(a);
    let node_b = VertexNode::Casual(b);
    !mesh.tds().get_hedge_containing(&node_a, &node_b).is_empty()
        || !mesh.tds().get_hedge_containing(&node_b, &node_a).is_empty()
}

fn midpoint(mesh: &Mesh, a: VertexIdx, b: VertexIdx) -> [f64; 3] {
    let pa = mesh.coords(a);
    let pb = mesh.coords(b);
    [
        (pa[0] + pb[0]) / 2.0,
        (pa[1] + pb[1]) / 2.0,
        (pa[2] + pb[2]) / 2.0,
    ]
}

fn recover_one(
    mesh: &mut Mesh,
    a: VertexIdx,
    b: VertexIdx,
    seg_idx: usize,
    budget: &mut usize,
    behavior: &Behavior,
    leaves: &mut Vec<[VertexIdx; 2]>,
) -> Result<(), MeshError> {
    if behavior.is_interrupted() {
        return Err(MeshError::Interrupted);
    }
    if is_recovered(mesh, a, b) {
        leaves.push([a, b]);
        return Ok(());
    }
    if flip::try_create_edge(mesh, a, b) {
        leaves.push([a, b]);
        return Ok(());
    }
    if *budget == 0 {
        return Err(MeshError::SegmentRecoveryFailed(seg_idx));
    }
    *budget -= 1;

    let mid = mesh.insert_steiner_point(
        midpoint(mesh, a, b),
        VertexClassification::SegmentSteiner,
        behavior,
    )?;

    recover_one(mesh, a, mid, seg_idx, budget, behavior, leaves)?;
    recover_one(mesh, mid, b, seg_idx, budget, behavior, leaves)
}

/// Recovers every segment, and returns the leaf edges that now bound it (the original endpoints
/// if no splitting was needed, or the sub-segments left by midpoint splitting) — consulted by
/// refinement's encroachment check (spec.md §4.5).
pub(crate) fn recover_segments(
    mesh: &mut Mesh,
    segments: &[Segment],
    behavior: &Behavior,
) -> Result<Vec<[VertexIdx; 2]>, MeshError> {
    let mut leaves = Vec::new();
    for (idx, segment) in segments.iter().enumerate() {
        let [a, b] = segment.endpoints;
        let mut budget = behavior.max_steiner_per_feature;
        recover_one(mesh, a, b, idx, &mut budget, behavior, &mut leaves)?;
    }
    Ok(leaves)
}
