//! `.face` files: boundary triangular faces (spec.md §6), emitted with `-f`.
//!
//! ```text
//! <# of faces> <boundary marker (0 or 1)>
//! <face #> <node> <node> <node> [boundary marker]
//! ```

use std::io::{self, Write};
use std::path::Path;

use crate::mesh::Mesh;

pub fn write(path: impl AsRef<Path>, mesh: &Mesh, zero_index: bool) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    let base = usize::from(!zero_index);

    let faces: Vec<[usize; 3]> = mesh
        .boundary_faces()
        .into_iter()
        .filter_map(|nodes| {
            Some([nodes[0].idx()?, nodes[1].idx()?, nodes[2].idx()?])
        })
        .collect();

    writeln!(file, "{} 0", faces.len())?;
    for (idx, face) in faces.iter().enumerate() {
        writeln!(
            file,
            "{} {} {} {}",
            idx + base,
            face[0] + base,
            face[1] + base,
            face[2] + base
        )?;
    }

    Ok(())
}
