//! `.node` files: the input/output vertex list (spec.md §6).
//!
//! ```text
//! <# of points> <dimension (3)> <# of attributes> <# of boundary markers (0 or 1)>
//! <point #> <x> <y> <z> [attributes] [boundary marker]
//! ```

use std::io::{self, Write};
use std::path::Path;

use super::{parse_error, strip_comment};
use crate::vertex::{Vertex, VertexClassification};

/// A parsed `.node` file: vertex coordinates, per-vertex attributes, and boundary markers.
pub struct NodeFile {
    pub points: Vec<[f64; 3]>,
    pub attributes: Vec<Vec<f64>>,
    pub markers: Vec<i32>,
    pub zero_index: bool,
}

pub fn read(path: impl AsRef<Path>) -> io::Result<NodeFile> {
    let text = std::fs::read_to_string(path)?;
    let mut lines = text.lines().map(strip_comment).filter(|l| !l.is_empty());

    let header = lines
        .next()
        .ok_or_else(|| parse_error(".node file is empty"))?;
    let mut header_fields = header.split_whitespace();
    let num_points: usize = header_fields
        .next()
        .ok_or_else(|| parse_error("missing point count"))?
        .parse()
        .map_err(|_| parse_error("invalid point count"))?;
    let _dimension: usize = header_fields.next().unwrap_or("3").parse().unwrap_or(3);
    let num_attrs: usize = header_fields.next().unwrap_or("0").parse().unwrap_or(0);
    let has_marker: bool = header_fields.next().unwrap_or("0").trim() != "0";

    let mut points = Vec::with_capacity(num_points);
    let mut attributes = Vec::with_capacity(num_points);
    let mut markers = Vec::with_capacity(num_points);
    let mut zero_index = false;
    let mut first = true;

    for line in lines.by_ref().take(num_points) {
        let mut fields = line.split_whitespace();
        let idx: i64 = fields
            .next()
            .ok_or_else(|| parse_error("missing vertex index"))?
            .parse()
            .map_err(|_| parse_error("invalid vertex index"))?;
        if first {
            zero_index = idx == 0;
            first = false;
        }

        let mut coord = [0.0; 3];
        for c in &mut coord {
            *c = fields
                .next()
                .ok_or_else(|| parse_error("missing coordinate"))?
                .parse()
                .map_err(|_| parse_error("invalid coordinate"))?;
        }
        points.push(coord);

        let mut attrs = Vec::with_capacity(num_attrs);
        for _ in 0..num_attrs {
            attrs.push(
                fields
                    .next()
                    .ok_or_else(|| parse_error("missing attribute"))?
                    .parse()
                    .map_err(|_| parse_error("invalid attribute"))?,
            );
        }
        attributes.push(attrs);

        let marker = if has_marker {
            fields
                .next()
                .ok_or_else(|| parse_error("missing boundary marker"))?
                .parse()
                .map_err(|_| parse_error("invalid boundary marker"))?
        } else {
            0
        };
        markers.push(marker);
    }

    Ok(NodeFile {
        points,
        attributes,
        markers,
        zero_index,
    })
}

pub fn write(path: impl AsRef<Path>, vertices: &[Vertex], zero_index: bool) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    let base = usize::from(!zero_index);
    let num_attrs = vertices.first().map_or(0, |v| v.attributes.len());

    writeln!(file, "{} 3 {} 1", vertices.len(), num_attrs)?;
    for (i, v) in vertices.iter().enumerate() {
        let [x, y, z] = v.point();
        write!(file, "{} {x} {y} {z}", i + base)?;
        for a in &v.attributes {
            write!(file, " {a}")?;
        }
        let marker = match v.classification {
            VertexClassification::Input | VertexClassification::PlcVertex => v.marker,
            _ => 0,
        };
        writeln!(file, " {marker}")?;
    }

    Ok(())
}
