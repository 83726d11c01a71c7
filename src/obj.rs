use glam::Vec3;

use crate::error::{ConvertError, Result};
use crate::shape::Shape;

/// Serializes shapes as an OBJ point list, one `o Shape_<index>` object per shape.
pub fn write_obj(shapes: &[Shape]) -> String {
    let mut output = String::new();
    for (index, shape) in shapes.iter().enumerate() {
        output.push_str(&format!("o Shape_{index}\n"));
        for vertex in &shape.vertices {
            output.push_str(&format!("v {} {} {}\n", vertex.x, vertex.y, vertex.z));
        }
    }
    output
}

/// Splits OBJ text into shapes delimited by `o` lines.
///
/// Only object headers and vertex positions are understood; blank lines and
/// `#` comments are skipped and any other statement is rejected. Objects
/// without vertices do not produce a shape.
pub fn read_obj(data: &str) -> Result<Vec<Shape>> {
    let mut shapes = Vec::new();
    let mut current: Option<Shape> = None;

    for (line_no, line) in data.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        match tag {
            "o" => {
                if let Some(shape) = current.take().filter(|s| !s.vertices.is_empty()) {
                    shapes.push(shape);
                }
                let name = parts.collect::<Vec<_>>().join(" ");
                current = Some(Shape::named(name, Vec::new()));
            }
            "v" => {
                let shape = current
                    .as_mut()
                    .ok_or(ConvertError::UnexpectedVertex { line: line_no })?;
                shape.vertices.push(parse_vec3(parts, line_no)?);
            }
            _ => {
                return Err(ConvertError::UnrecognizedLine {
                    line: line_no,
                    text: trimmed.to_string(),
                })
            }
        }
    }

    if let Some(shape) = current.filter(|s| !s.vertices.is_empty()) {
        shapes.push(shape);
    }
    Ok(shapes)
}

fn parse_vec3<'a>(mut parts: impl Iterator<Item = &'a str>, line_no: usize) -> Result<Vec3> {
    let mut component = || -> Result<f32> {
        let text = parts
            .next()
            .ok_or_else(|| ConvertError::parse(line_no, "missing vertex component"))?;
        let value = text.parse::<f32>().map_err(|err| {
            ConvertError::parse(line_no, format!("invalid coordinate {text:?}: {err}"))
        })?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ConvertError::parse(
                line_no,
                format!("coordinate {text:?} is not finite"),
            ))
        }
    };
    let x = component()?;
    let y = component()?;
    let z = component()?;
    Ok(Vec3::new(x, y, z))
}
