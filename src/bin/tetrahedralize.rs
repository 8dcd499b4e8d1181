//! CLI driver: parse switches, read input, run the kernel, write output (spec.md §6).

use std::process::ExitCode;

use clap::Parser;
use log::error;

use tetramesh::cli::Cli;
use tetramesh::io::{edge, ele, face, node, poly, vnode};
use tetramesh::{voronoi, Plc};

fn output_stem(cli: &Cli) -> std::path::PathBuf {
    cli.output_stem.clone().unwrap_or_else(|| {
        let mut stem = cli.input.clone();
        stem.set_extension("");
        stem
    })
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.reconstruct {
        anyhow::bail!(
            "-r/--reconstruct (refine an existing .node/.ele mesh) is not implemented; \
             build from raw points via -p/.poly instead"
        );
    }

    let is_poly = cli.input.extension().is_some_and(|ext| ext == "poly");

    let (points, mut plc): (Vec<[f64; 3]>, Option<Plc>) = if is_poly {
        let parsed = poly::read(&cli.input)?;
        let points = match parsed.nodes {
            Some(nodes) => nodes.points,
            None => {
                let mut node_path = cli.input.clone();
                node_path.set_extension("node");
                node::read(node_path)?.points
            }
        };
        (points, Some(parsed.plc))
    } else {
        (node::read(&cli.input)?.points, None)
    };

    let mut behavior = cli.behavior();
    behavior.plc = behavior.plc || is_poly;

    if cli.convex_hull_only {
        plc = None;
        behavior.plc = false;
    }

    let mut mesh = match tetramesh::tetrahedralize(&points, plc.as_ref(), &behavior) {
        Ok(mesh) => mesh,
        Err(failure) => {
            if let Some(partial) = &failure.partial {
                error!("{}: writing partial mesh with {partial}", failure.kind);
                write_outputs(&cli, &behavior, partial)?;
            }
            return Err(failure.kind.into());
        }
    };

    if let Some(extra_path) = &cli.insert_points_file {
        let extra = node::read(extra_path)?;
        tetramesh::insert_additional_points(&mut mesh, &extra.points, &behavior)?;
    }

    write_outputs(&cli, &behavior, &mesh)
}

fn write_outputs(cli: &Cli, behavior: &tetramesh::Behavior, mesh: &tetramesh::Mesh) -> anyhow::Result<()> {
    let stem = output_stem(cli);

    node::write(stem.with_extension("node"), mesh.vertices(), behavior.zero_index)?;
    ele::write(stem.with_extension("ele"), mesh, behavior.zero_index)?;

    if behavior.output_faces {
        face::write(stem.with_extension("face"), mesh, behavior.zero_index)?;
    }
    if behavior.output_edges {
        edge::write(stem.with_extension("edge"), mesh, behavior.zero_index)?;
    }
    if behavior.output_voronoi {
        let diagram = voronoi::extract(mesh);
        let mut v_stem = stem.clone();
        v_stem.as_mut_os_string().push(".v");
        vnode::write(v_stem.with_extension("node"), &diagram, behavior.zero_index)?;
        vnode::write_edges(v_stem.with_extension("edge"), &diagram, behavior.zero_index)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else {
        builder.filter_level(match cli.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    }
    builder.init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
