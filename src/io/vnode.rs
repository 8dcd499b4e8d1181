//! `.v.node` files: Voronoi dual nodes (spec.md §6), emitted with `-v`.
//!
//! ```text
//! <# of nodes> 3 0 0
//! <node #> <x> <y> <z>
//! ```
//!
//! Unbounded rays and finite edges go to `.v.edge`; see `voronoi::VoronoiDiagram`.

use std::io::{self, Write};
use std::path::Path;

use crate::voronoi::VoronoiDiagram;

pub fn write(path: impl AsRef<Path>, diagram: &VoronoiDiagram, zero_index: bool) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    let base = usize::from(!zero_index);

    writeln!(file, "{} 3 0 0", diagram.nodes.len())?;
    for (idx, node) in diagram.nodes.iter().enumerate() {
        let [x, y, z] = node.unwrap_or([0.0, 0.0, 0.0]);
        writeln!(file, "{} {x} {y} {z}", idx + base)?;
    }

    Ok(())
}

pub fn write_edges(
    path: impl AsRef<Path>,
    diagram: &VoronoiDiagram,
    zero_index: bool,
) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    let base = usize::from(!zero_index);
    let total = diagram.edges.len() + diagram.rays.len();

    writeln!(file, "{total} 0")?;
    let mut idx = 0;
    for (a, b) in &diagram.edges {
        writeln!(file, "{} {} {}", idx + base, a + base, b + base)?;
        idx += 1;
    }
    for (node, direction) in &diagram.rays {
        // TetGen marks a ray's far endpoint as -1; we follow that convention here.
        writeln!(
            file,
            "{} {} -1 {} {} {}",
            idx + base,
            node + base,
            direction[0],
            direction[1],
            direction[2]
        )?;
        idx += 1;
    }

    Ok(())
}
