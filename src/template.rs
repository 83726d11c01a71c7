//! Rendering of shapes and rigid bodies into `.physics.yml` text.
//!
//! The output is assembled in two steps: a [`PhysicsDocument`] describing
//! what goes into the file, and a [`Renderer`] that emits the fixed
//! indentation and tag spelling expected by the binary compiler. The
//! surrounding document comes from a [`Template`] with a `{count}` and a
//! `{body}` slot that are filled by plain string substitution.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::shape::{RigidBody, Shape};

pub const COUNT_SLOT: &str = "{count}";
pub const BODY_SLOT: &str = "{body}";

const BODY_INDENT: &str = "                ";
const PARAM_INDENT: &str = "                    ";
const FIELD_INDENT: &str = "                      ";

/// Built-in document for a single rigid body holding every shape.
pub const SIMPLE_TEMPLATE: &str = "\
!io
version: 0
type: physics
param_root: !list
  objects:
    ParamSet: !obj
      use_rigid_body_set_num: 1
      use_ragdoll: false
      use_support_bone: false
      use_cloth: false
      use_contact_info: false
      use_edge_rigid_body_num: 0
      use_system_group_handler: false
  lists:
    ParamSet: !list
      objects: {}
      lists:
        RigidBodySet: !list
          objects: {}
          lists:
            RigidBodySet_0: !list
              objects:
                RigidBodySetParam: !obj
                  set_name: !str32 collision
                  type: !str32 from_shape_type
                  num: 1
              lists:
                RigidBody_0: !list
                  objects:
                    RigidBodyParam: !obj
                      rigid_body_name: !str64 collision
                      mass: 1000.0
                      volume: 1.0
                      inertia: !vec3 [1.0, 1.0, 1.0]
                      center_of_mass: !vec3 [0.0, 0.0, 0.0]
                      linear_damping: 0.0
                      angular_damping: 0.05
                      max_linear_velocity: 200.0
                      max_angular_velocity_rad: 198.0
                      max_impulse: -1.0
                      col_impulse_scale: 1.0
                      friction_scale: 1.0
                      restitution_scale: 1.0
                      water_buoyancy_scale: 1.0
                      water_flow_effective_rate: 1.0
                      motion_type: !str32 Fixed
                      layer: !str32 EntityGroundObject
                      shape_num: {count}
{body}
                  lists: {}
";

/// Built-in document for one rigid body per parent object.
pub const GROUPED_TEMPLATE: &str = "\
!io
version: 0
type: physics
param_root: !list
  objects:
    ParamSet: !obj
      use_rigid_body_set_num: 1
      use_ragdoll: false
      use_support_bone: false
      use_cloth: false
      use_contact_info: false
      use_edge_rigid_body_num: 0
      use_system_group_handler: false
  lists:
    ParamSet: !list
      objects: {}
      lists:
        RigidBodySet: !list
          objects: {}
          lists:
            RigidBodySet_0: !list
              objects:
                RigidBodySetParam: !obj
                  set_name: !str32 collision
                  type: !str32 from_shape_type
                  num: {count}
              lists:
{body}
";

/// What ends up in the rendered file.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsDocument {
    Simple(Vec<Shape>),
    Grouped(Vec<RigidBody>),
}

impl PhysicsDocument {
    /// Value substituted into the `{count}` slot.
    pub fn count(&self) -> usize {
        match self {
            PhysicsDocument::Simple(shapes) => shapes.len(),
            PhysicsDocument::Grouped(bodies) => bodies.len(),
        }
    }

    pub fn shape_count(&self) -> usize {
        match self {
            PhysicsDocument::Simple(shapes) => shapes.len(),
            PhysicsDocument::Grouped(bodies) => bodies.iter().map(|b| b.shapes.len()).sum(),
        }
    }
}

/// Document skeleton with `{count}` and `{body}` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn simple() -> Self {
        Self::new(SIMPLE_TEMPLATE)
    }

    pub fn grouped() -> Self {
        Self::new(GROUPED_TEMPLATE)
    }

    /// Built-in template matching the layout of `document`.
    pub fn for_document(document: &PhysicsDocument) -> Self {
        match document {
            PhysicsDocument::Simple(_) => Self::simple(),
            PhysicsDocument::Grouped(_) => Self::grouped(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| ConvertError::io(path, err))?;
        Ok(Self::new(text))
    }

    /// Substitutes both slots. The template itself is not validated.
    pub fn fill(&self, count: usize, body: &str) -> String {
        self.text
            .replace(COUNT_SLOT, &count.to_string())
            .replace(BODY_SLOT, body)
    }
}

/// Per-shape material fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeDefaults {
    pub shape_type: String,
    pub material: String,
    pub sub_material: String,
    pub wall_code: String,
    pub floor_code: String,
}

impl Default for ShapeDefaults {
    fn default() -> Self {
        Self {
            shape_type: "polytope".to_string(),
            material: "Metal".to_string(),
            sub_material: "Metal_Heavy".to_string(),
            wall_code: "NoClimb".to_string(),
            floor_code: "None".to_string(),
        }
    }
}

/// Physical properties written into every grouped `RigidBodyParam`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDefaults {
    pub mass: f32,
    pub volume: f32,
    pub inertia: [f32; 3],
    pub center_of_mass: [f32; 3],
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub max_linear_velocity: f32,
    pub max_angular_velocity_rad: f32,
    pub max_impulse: f32,
    pub col_impulse_scale: f32,
    pub friction_scale: f32,
    pub restitution_scale: f32,
    pub water_buoyancy_scale: f32,
    pub water_flow_effective_rate: f32,
    pub motion_type: String,
    pub layer: String,
}

impl Default for BodyDefaults {
    fn default() -> Self {
        Self {
            mass: 1000.0,
            volume: 1.0,
            inertia: [1.0, 1.0, 1.0],
            center_of_mass: [0.0, 0.0, 0.0],
            linear_damping: 0.0,
            angular_damping: 0.05,
            max_linear_velocity: 200.0,
            max_angular_velocity_rad: 198.0,
            max_impulse: -1.0,
            col_impulse_scale: 1.0,
            friction_scale: 1.0,
            restitution_scale: 1.0,
            water_buoyancy_scale: 1.0,
            water_flow_effective_rate: 1.0,
            motion_type: "Fixed".to_string(),
            layer: "EntityGroundObject".to_string(),
        }
    }
}

/// Emits parameter blocks for shapes and bodies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Renderer {
    pub shape: ShapeDefaults,
    pub body: BodyDefaults,
}

impl Renderer {
    pub fn new(shape: ShapeDefaults, body: BodyDefaults) -> Self {
        Self { shape, body }
    }

    /// Renders `document` into `template`.
    pub fn render(&self, document: &PhysicsDocument, template: &Template) -> String {
        let body = self.render_body(document);
        template.fill(document.count(), body.trim_end_matches('\n'))
    }

    /// Text for the `{body}` slot, before trailing newlines are stripped.
    pub fn render_body(&self, document: &PhysicsDocument) -> String {
        let mut out = String::new();
        match document {
            PhysicsDocument::Simple(shapes) => {
                for (index, shape) in shapes.iter().enumerate() {
                    self.write_shape(&mut out, index, shape);
                }
            }
            PhysicsDocument::Grouped(bodies) => {
                for (index, body) in bodies.iter().enumerate() {
                    self.write_body(&mut out, index, body);
                }
            }
        }
        out
    }

    fn write_shape(&self, out: &mut String, index: usize, shape: &Shape) {
        let defaults = &self.shape;
        out.push_str(&format!("{PARAM_INDENT}ShapeParam_{index}: !obj"));
        // Names with line breaks would escape the comment.
        if let Some(name) = shape.name.as_deref().filter(|n| !n.contains(['\n', '\r'])) {
            out.push_str(&format!(" # {name}"));
        }
        out.push('\n');
        out.push_str(&format!(
            "{FIELD_INDENT}shape_type: !str32 {}\n",
            defaults.shape_type
        ));
        out.push_str(&format!(
            "{FIELD_INDENT}vertex_num: {}\n",
            shape.vertex_count()
        ));
        for (vertex_index, vertex) in shape.vertices.iter().enumerate() {
            out.push_str(&format!(
                "{FIELD_INDENT}vertex_{vertex_index}: !vec3 [{}, {}, {}]\n",
                format_float(vertex.x),
                format_float(vertex.y),
                format_float(vertex.z)
            ));
        }
        let fields = [
            ("material", &defaults.material),
            ("sub_material", &defaults.sub_material),
            ("wall_code", &defaults.wall_code),
            ("floor_code", &defaults.floor_code),
        ];
        for (key, value) in fields {
            out.push_str(&format!("{FIELD_INDENT}{key}: !str32 {value}\n"));
        }
    }

    fn write_body(&self, out: &mut String, index: usize, body: &RigidBody) {
        let b = &self.body;
        out.push_str(&format!("{BODY_INDENT}RigidBody_{index}: !list\n"));
        out.push_str(&format!("{BODY_INDENT}  objects:\n"));
        out.push_str(&format!("{PARAM_INDENT}RigidBodyParam: !obj\n"));
        let fields: [(&str, String); 17] = [
            ("rigid_body_name", format!("!str64 {}", body.name)),
            ("mass", format_float(b.mass)),
            ("volume", format_float(b.volume)),
            ("inertia", format_vec3(b.inertia)),
            ("center_of_mass", format_vec3(b.center_of_mass)),
            ("linear_damping", format_float(b.linear_damping)),
            ("angular_damping", format_float(b.angular_damping)),
            ("max_linear_velocity", format_float(b.max_linear_velocity)),
            ("max_angular_velocity_rad", format_float(b.max_angular_velocity_rad)),
            ("max_impulse", format_float(b.max_impulse)),
            ("col_impulse_scale", format_float(b.col_impulse_scale)),
            ("friction_scale", format_float(b.friction_scale)),
            ("restitution_scale", format_float(b.restitution_scale)),
            ("water_buoyancy_scale", format_float(b.water_buoyancy_scale)),
            ("water_flow_effective_rate", format_float(b.water_flow_effective_rate)),
            ("motion_type", format!("!str32 {}", b.motion_type)),
            ("layer", format!("!str32 {}", b.layer)),
        ];
        for (key, value) in fields {
            out.push_str(&format!("{FIELD_INDENT}{key}: {value}\n"));
        }
        out.push_str(&format!(
            "{FIELD_INDENT}shape_num: {}\n",
            body.shapes.len()
        ));
        for (shape_index, shape) in body.shapes.iter().enumerate() {
            self.write_shape(out, shape_index, shape);
        }
        out.push_str(&format!("{BODY_INDENT}  lists: {{}}\n"));
    }
}

/// Decimal notation that always reads back as a float (`1.0`, not `1`).
pub fn format_float(value: f32) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

fn format_vec3(value: [f32; 3]) -> String {
    format!(
        "!vec3 [{}, {}, {}]",
        format_float(value[0]),
        format_float(value[1]),
        format_float(value[2])
    )
}
