//! `.ele` files: output tetrahedra (spec.md §6).
//!
//! ```text
//! <# of tetrahedra> <nodes per tet (4)> <# of attributes>
//! <tet #> <node> <node> <node> <node> [attribute]
//! ```

use std::io::{self, Write};
use std::path::Path;

use crate::mesh::Mesh;

pub fn write(path: impl AsRef<Path>, mesh: &Mesh, zero_index: bool) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    let base = usize::from(!zero_index);
    let has_regions = !mesh.region_attr.is_empty();

    let tets: Vec<(usize, [usize; 4])> = (0..mesh.tds().num_tets())
        .filter_map(|tet_idx| {
            let tet = mesh.tds().get_tet(tet_idx).ok()?;
            if tet.is_conceptual() || mesh.is_excluded(tet_idx) {
                return None;
            }
            let [n0, n1, n2, n3] = tet.nodes();
            Some((tet_idx, [n0.idx()?, n1.idx()?, n2.idx()?, n3.idx()?]))
        })
        .collect();

    writeln!(file, "{} 4 {}", tets.len(), usize::from(has_regions))?;
    for (out_idx, (tet_idx, nodes)) in tets.iter().enumerate() {
        write!(
            file,
            "{} {} {} {} {}",
            out_idx + base,
            nodes[0] + base,
            nodes[1] + base,
            nodes[2] + base,
            nodes[3] + base
        )?;
        if has_regions {
            let attr = mesh.region_attr.get(tet_idx).copied().unwrap_or(0.0);
            write!(file, " {attr}")?;
        }
        writeln!(file)?;
    }

    Ok(())
}
