//! `.poly` files: the PLC input (spec.md §6) — an optional inline node list, a facet list, a hole
//! list, and a region list.
//!
//! ```text
//! <# of points> <dim> <# attr> <# bdry markers>   (0 points: read from a companion .node file)
//! ...
//! <# of facets> <# bdry markers>
//! <# of polygons> [# of holes] [bdry marker]
//! <# of corners> <corner> <corner> ...
//! ...
//! <# of holes>
//! <hole #> <x> <y> <z>
//! <# of regions>
//! <region #> <x> <y> <z> <attribute> <max volume>
//! ```

use std::io;
use std::path::Path;

use super::{node::NodeFile, parse_error, strip_comment};
use crate::plc::{Facet, Hole, Plc, Region, Segment};

pub struct PolyFile {
    pub nodes: Option<NodeFile>,
    pub plc: Plc,
}

pub fn read(path: impl AsRef<Path>) -> io::Result<PolyFile> {
    let text = std::fs::read_to_string(path)?;
    let mut lines = text.lines().map(strip_comment).filter(|l| !l.is_empty());

    let node_header = lines
        .next()
        .ok_or_else(|| parse_error(".poly file is empty"))?;
    let mut header_fields = node_header.split_whitespace();
    let num_points: usize = header_fields
        .next()
        .ok_or_else(|| parse_error("missing point count"))?
        .parse()
        .map_err(|_| parse_error("invalid point count"))?;
    let num_attrs: usize = header_fields.next().unwrap_or("0").parse().unwrap_or(0);
    let has_marker = header_fields.next().unwrap_or("0").trim() != "0";

    let nodes = if num_points > 0 {
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
            let attrs = (0..num_attrs)
                .map(|_| fields.next().unwrap_or("0").parse().unwrap_or(0.0))
                .collect();
            attributes.push(attrs);
            let marker = if has_marker {
                fields.next().unwrap_or("0").parse().unwrap_or(0)
            } else {
                0
            };
            markers.push(marker);
        }

        Some(NodeFile {
            points,
            attributes,
            markers,
            zero_index,
        })
    } else {
        None
    };

    let facet_header = lines
        .next()
        .ok_or_else(|| parse_error("missing facet list header"))?;
    let mut facet_header_fields = facet_header.split_whitespace();
    let num_facets: usize = facet_header_fields
        .next()
        .ok_or_else(|| parse_error("missing facet count"))?
        .parse()
        .map_err(|_| parse_error("invalid facet count"))?;
    let facet_has_marker = facet_header_fields.next().unwrap_or("0").trim() != "0";

    let zero_index = nodes.as_ref().is_some_and(|n| n.zero_index);
    let base: i64 = if zero_index { 0 } else { 1 };

    let mut facets = Vec::with_capacity(num_facets);
    for _ in 0..num_facets {
        let polygon_header = lines
            .next()
            .ok_or_else(|| parse_error("missing polygon count"))?;
        let mut fields = polygon_header.split_whitespace();
        let num_polygons: usize = fields
            .next()
            .ok_or_else(|| parse_error("missing polygon count"))?
            .parse()
            .map_err(|_| parse_error("invalid polygon count"))?;
        let num_holes: usize = fields.next().unwrap_or("0").parse().unwrap_or(0);
        let marker: i32 = if facet_has_marker {
            fields.next().unwrap_or("0").parse().unwrap_or(0)
        } else {
            0
        };

        let mut polygon = Vec::new();
        for p in 0..num_polygons {
            let corner_line = lines
                .next()
                .ok_or_else(|| parse_error("missing polygon corner list"))?;
            let mut corner_fields = corner_line.split_whitespace();
            let num_corners: usize = corner_fields
                .next()
                .ok_or_else(|| parse_error("missing corner count"))?
                .parse()
                .map_err(|_| parse_error("invalid corner count"))?;
            let loop_: Vec<usize> = (0..num_corners)
                .map(|_| {
                    corner_fields
                        .next()
                        .ok_or_else(|| parse_error("missing corner index"))
                        .and_then(|s| {
                            s.parse::<i64>()
                                .map_err(|_| parse_error("invalid corner index"))
                        })
                        .map(|idx| (idx - base) as usize)
                })
                .collect::<io::Result<_>>()?;
            if p == 0 {
                polygon = loop_;
            }
        }

        let mut holes = Vec::with_capacity(num_holes);
        for _ in 0..num_holes {
            let _hole_line = lines.next().ok_or_else(|| parse_error("missing facet hole"))?;
        }

        facets.push(Facet {
            polygon,
            holes,
            marker,
        });
    }

    let hole_header = lines.next().unwrap_or("0");
    let num_holes: usize = hole_header.split_whitespace().next().unwrap_or("0").parse().unwrap_or(0);
    let mut holes = Vec::with_capacity(num_holes);
    for line in lines.by_ref().take(num_holes) {
        let mut fields = line.split_whitespace();
        let _idx = fields.next();
        let x: f64 = fields.next().unwrap_or("0").parse().unwrap_or(0.0);
        let y: f64 = fields.next().unwrap_or("0").parse().unwrap_or(0.0);
        let z: f64 = fields.next().unwrap_or("0").parse().unwrap_or(0.0);
        holes.push(Hole { seed: [x, y, z] });
    }

    let mut regions = Vec::new();
    if let Some(region_header) = lines.next() {
        let num_regions: usize = region_header
            .split_whitespace()
            .next()
            .unwrap_or("0")
            .parse()
            .unwrap_or(0);
        for line in lines.by_ref().take(num_regions) {
            let mut fields = line.split_whitespace();
            let _idx = fields.next();
            let x: f64 = fields.next().unwrap_or("0").parse().unwrap_or(0.0);
            let y: f64 = fields.next().unwrap_or("0").parse().unwrap_or(0.0);
            let z: f64 = fields.next().unwrap_or("0").parse().unwrap_or(0.0);
            let attribute: f64 = fields.next().unwrap_or("0").parse().unwrap_or(0.0);
            let max_volume: f64 = fields.next().unwrap_or("-1").parse().unwrap_or(-1.0);
            regions.push(Region {
                seed: [x, y, z],
                attribute,
                max_volume: (max_volume > 0.0).then_some(max_volume),
            });
        }
    }

    // TetGen's .poly format has no standalone segment section in 3D; segments are implied by
    // facet polygon edges. We surface those as explicit `Segment`s so constraint recovery treats
    // every facet boundary edge as constrained, matching spec.md §3's "a facet's boundary is
    // always a set of constrained segments" invariant.
    let mut segments = Vec::new();
    for facet in &facets {
        let n = facet.polygon.len();
        for i in 0..n {
            segments.push(Segment {
                endpoints: [facet.polygon[i], facet.polygon[(i + 1) % n]],
                marker: facet.marker,
            });
        }
    }

    Ok(PolyFile {
        nodes,
        plc: Plc {
            segments,
            facets,
            regions,
            holes,
        },
    })
}
