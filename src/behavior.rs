//! The immutable configuration record passed into [`crate::tetrahedralize`] (spec.md §6/§9's
//! Design Note: pass parameters explicitly rather than holding process-wide state).

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Switches controlling which phases run and how refinement bounds quality, mirroring the
/// original TetGen switch set named in spec.md §6 (`-p`, `-q`, `-a`, `-A`, `-r`, `-i`, `-c`, `-f`,
/// `-e`, `-v`, `-D`, `-z`, `-Q`, `-V`).
#[derive(Debug, Clone)]
pub struct Behavior {
    /// `-p`: a PLC is supplied and must be recovered into the mesh.
    pub plc: bool,
    /// `-q`: enforce the radius-edge ratio bound (`quality_bound`) via refinement.
    pub quality: bool,
    /// Radius-edge ratio bound for `-q` (TetGen default 2.0).
    pub quality_bound: f64,
    /// `-a`: global maximum tetrahedron volume constraint.
    pub max_volume: Option<f64>,
    /// `-A`: assign region attributes by flood-fill from `Plc::regions`.
    pub region_attributes: bool,
    /// `-r`: reconstruct/refine a previously-generated mesh rather than building from a raw
    /// point set (not implemented by the kernel's current input path; the CLI rejects it
    /// outright rather than silently ignoring it).
    pub reconstruct: bool,
    /// `-i`: additional points (beyond the CLI's own point-file reading) are being inserted into
    /// the mesh after it's built; set by the CLI driver, which does the actual reading/inserting
    /// through [`crate::insert_additional_points`].
    pub insert_points: bool,
    /// `-c`: compute the convex hull tetrahedralization only, ignoring any supplied PLC.
    pub convex_hull_only: bool,
    /// `-f`: emit `.face` boundary-face output.
    pub output_faces: bool,
    /// `-e`: emit `.edge` boundary-edge output.
    pub output_edges: bool,
    /// `-v`: emit the dual Voronoi diagram (`.v.node`/`.v.edge`/`.v.face`/`.v.cell`).
    pub output_voronoi: bool,
    /// `-D`: a stricter Delaunay check applied while inserting Steiner points.
    pub conforming_delaunay: bool,
    /// `-z`: input/output vertex indices are zero-based rather than one-based.
    pub zero_index: bool,
    /// `-Q`: suppress all non-error logging.
    pub quiet: bool,
    /// `-V`: verbose logging, one level per repetition in the original switch.
    pub verbosity: u8,
    /// Hard cap on Steiner points inserted per segment/facet feature during constraint recovery,
    /// resolving spec.md §9's Open Question on the Steiner budget as a tunable.
    pub max_steiner_per_feature: usize,
    /// Hard cap on Steiner points inserted by quality refinement overall, guaranteeing
    /// termination (spec.md §4.5) independent of whether the quality bound is reachable.
    pub max_refinement_points: usize,
    /// Cooperative cancellation flag, checked at well-defined points (spec.md §5).
    pub interrupt: Option<Arc<AtomicBool>>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            plc: false,
            quality: false,
            quality_bound: 2.0,
            max_volume: None,
            region_attributes: false,
            reconstruct: false,
            insert_points: false,
            convex_hull_only: false,
            output_faces: false,
            output_edges: false,
            output_voronoi: false,
            conforming_delaunay: false,
            zero_index: false,
            quiet: false,
            verbosity: 0,
            max_steiner_per_feature: 10_000,
            max_refinement_points: 100_000,
            interrupt: None,
        }
    }
}

impl Behavior {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(std::sync::atomic::Ordering::Relaxed))
    }
}
