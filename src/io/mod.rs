//! TetGen-compatible text I/O (spec.md §6): one module per file format. These are external
//! collaborators to the kernel (spec.md §1) — they never touch `tetds` directly, only
//! [`crate::mesh::Mesh`]'s public surface.

pub mod edge;
pub mod ele;
pub mod face;
pub mod node;
pub mod poly;
pub mod vnode;

use std::io;

/// Strips a TetGen `#`-prefixed trailing comment and surrounding whitespace from a line.
pub(crate) fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or("").trim()
}

pub(crate) fn parse_error(context: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, context.to_string())
}
