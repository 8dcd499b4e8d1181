//! `.edge` files: boundary edges (spec.md §6), emitted with `-e`.
//!
//! ```text
//! <# of edges> <boundary marker (0 or 1)>
//! <edge #> <endpoint> <endpoint> [boundary marker]
//! ```

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

use crate::mesh::Mesh;

pub fn write(path: impl AsRef<Path>, mesh: &Mesh, zero_index: bool) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    let base = usize::from(!zero_index);

    let mut edges = BTreeSet::new();
    for face in mesh.boundary_faces() {
        let idxs: Option<Vec<usize>> = face.iter().map(|n| n.idx()).collect();
        let Some(idxs) = idxs else { continue };
        for i in 0..3 {
            let a = idxs[i];
            let b = idxs[(i + 1) % 3];
            edges.insert(if a < b { (a, b) } else { (b, a) });
        }
    }

    writeln!(file, "{} 0", edges.len())?;
    for (idx, (a, b)) in edges.iter().enumerate() {
        writeln!(file, "{} {} {}", idx + base, a + base, b + base)?;
    }

    Ok(())
}
