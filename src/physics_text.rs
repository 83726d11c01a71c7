//! Extraction of polytope vertex blocks from `.physics.yml` text.
//!
//! The document is scanned line by line rather than parsed as YAML: every
//! `vertex_num` line opens a new shape and every following `vertex_<n>`
//! line contributes one coordinate triple to it. Everything else in the
//! file (rigid body parameters, materials, tags) is ignored.

use glam::Vec3;

use crate::error::{ConvertError, Result};
use crate::shape::Shape;

const VERTEX_COUNT_KEY: &str = "vertex_num";
const VERTEX_KEY: &str = "vertex_";
const SHAPE_HEADER_KEY: &str = "ShapeParam_";

/// Returns the shapes described by the vertex blocks of `data`, in file order.
pub fn parse_shapes(data: &str) -> Result<Vec<Shape>> {
    let mut shapes: Vec<Shape> = Vec::new();
    let mut pending_name = None;

    for (line_no, line) in data.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim_start();

        if trimmed.starts_with(SHAPE_HEADER_KEY) {
            pending_name = header_comment(trimmed);
        } else if trimmed.starts_with(VERTEX_COUNT_KEY) {
            shapes.push(Shape {
                name: pending_name.take(),
                vertices: Vec::new(),
            });
        } else if trimmed.starts_with(VERTEX_KEY) {
            let vertex = parse_vertex_entry(trimmed, line_no)?;
            let shape = shapes.last_mut().ok_or_else(|| {
                ConvertError::parse(line_no, "vertex entry appears before any vertex_num")
            })?;
            shape.vertices.push(vertex);
        }
    }

    Ok(shapes)
}

/// Name left by the exporter in `ShapeParam_0: !obj # Name`.
fn header_comment(line: &str) -> Option<String> {
    let (_, comment) = line.split_once('#')?;
    let comment = comment.trim();
    (!comment.is_empty()).then(|| comment.to_string())
}

fn parse_vertex_entry(line: &str, line_no: usize) -> Result<Vec3> {
    let open = line
        .find('[')
        .ok_or_else(|| ConvertError::parse(line_no, "vertex entry is missing '['"))?;
    let close = line[open..]
        .find(']')
        .map(|offset| open + offset)
        .ok_or_else(|| ConvertError::parse(line_no, "vertex entry is missing ']'"))?;

    let mut components = [0.0f32; 3];
    let mut count = 0;
    for part in line[open + 1..close].split(',') {
        if count == components.len() {
            return Err(ConvertError::parse(
                line_no,
                "vertex entry has more than three components",
            ));
        }
        let part = part.trim();
        let value = part.parse::<f32>().map_err(|err| {
            ConvertError::parse(line_no, format!("invalid coordinate {part:?}: {err}"))
        })?;
        if !value.is_finite() {
            return Err(ConvertError::parse(
                line_no,
                format!("coordinate {part:?} is not finite"),
            ));
        }
        components[count] = value;
        count += 1;
    }
    if count != components.len() {
        return Err(ConvertError::parse(
            line_no,
            format!("vertex entry has {count} components, expected 3"),
        ));
    }

    Ok(Vec3::from_array(components))
}
