//! Command-line switches (spec.md §6), mirroring TetGen's single-letter switch set.

use std::path::PathBuf;

use clap::Parser;

use crate::behavior::Behavior;

/// Tetrahedralize a point set or PLC, TetGen-switch-compatible.
#[derive(Debug, Parser)]
#[command(name = "tetrahedralize", version, about)]
pub struct Cli {
    /// Input file: a `.node` point set, or a `.poly` PLC (implies `-p`).
    pub input: PathBuf,

    /// -p: the input is a PLC (`.poly`) that must be recovered into the mesh.
    #[arg(short = 'p', long = "plc")]
    pub plc: bool,

    /// -q[bound]: enforce a radius-edge ratio bound via quality refinement.
    #[arg(short = 'q', long = "quality", num_args = 0..=1)]
    pub quality: Option<Option<f64>>,

    /// -a[volume]: global maximum tetrahedron volume constraint. Bare `-a` enables the constraint
    /// at the kernel's default (none applied, mirroring `-q`'s bare-flag default-bound behavior).
    #[arg(short = 'a', long = "max-volume", num_args = 0..=1)]
    pub max_volume: Option<Option<f64>>,

    /// -A: assign region attributes by flood-fill from the PLC's region list.
    #[arg(short = 'A', long = "region-attributes")]
    pub region_attributes: bool,

    /// -r: reconstruct/refine a previously generated mesh (input would be `.node` + `.ele`). Not
    /// implemented: the driver rejects it with an error instead of silently ignoring it.
    #[arg(short = 'r', long = "reconstruct")]
    pub reconstruct: bool,

    /// -i<file>: insert additional points from a secondary `.node` file into the mesh once built.
    #[arg(short = 'i', long = "insert")]
    pub insert_points_file: Option<PathBuf>,

    /// -c: compute the convex hull tetrahedralization only; any PLC facets/segments are ignored.
    #[arg(short = 'c', long = "convex-hull-only")]
    pub convex_hull_only: bool,

    /// -f: emit `.face` boundary-face output.
    #[arg(short = 'f', long = "faces")]
    pub output_faces: bool,

    /// -e: emit `.edge` boundary-edge output.
    #[arg(short = 'e', long = "edges")]
    pub output_edges: bool,

    /// -v: emit the dual Voronoi diagram (`.v.node`/`.v.edge`).
    #[arg(short = 'v', long = "voronoi")]
    pub output_voronoi: bool,

    /// -D: enforce a conforming Delaunay tetrahedralization — eliminate every vertex that
    /// encroaches a constrained segment or facet triangle, independent of `-q`'s quality bound.
    #[arg(short = 'D', long = "conforming-delaunay")]
    pub conforming_delaunay: bool,

    /// -z: input/output vertex indices are zero-based rather than one-based.
    #[arg(short = 'z', long = "zero-index")]
    pub zero_index: bool,

    /// -Q: suppress all non-error logging.
    #[arg(short = 'Q', long = "quiet")]
    pub quiet: bool,

    /// -V: verbose logging; repeat for more detail.
    #[arg(short = 'V', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Output file stem; defaults to the input file stem with a `.1` suffix, TetGen-style.
    #[arg(short = 'o', long = "output")]
    pub output_stem: Option<PathBuf>,
}

impl Cli {
    /// Builds a [`Behavior`] from the parsed switches.
    #[must_use]
    pub fn behavior(&self) -> Behavior {
        Behavior {
            plc: self.plc,
            quality: self.quality.is_some(),
            quality_bound: self
                .quality
                .flatten()
                .unwrap_or_else(|| Behavior::default().quality_bound),
            max_volume: self.max_volume.flatten(),
            region_attributes: self.region_attributes,
            reconstruct: self.reconstruct,
            insert_points: self.insert_points_file.is_some(),
            convex_hull_only: self.convex_hull_only,
            output_faces: self.output_faces,
            output_edges: self.output_edges,
            output_voronoi: self.output_voronoi,
            conforming_delaunay: self.conforming_delaunay,
            zero_index: self.zero_index,
            quiet: self.quiet,
            verbosity: self.verbosity,
            ..Behavior::default()
        }
    }
}
