//! Conversion tools for Breath of the Wild physics files.
//!
//! The crate turns `.physics.yml` vertex blocks into OBJ point lists and
//! back, groups authoring-tool geometry into collision shapes and rigid
//! bodies, renders the result into the tagged text format and hands it to
//! an external compiler for `.bphysics` output. The authoring tool itself
//! stays outside: geometry arrives as plain [`SceneObject`] values.

pub mod aggregate;
pub mod compiler;
pub mod dedup;
pub mod error;
pub mod obj;
pub mod physics_text;
pub mod pipeline;
pub mod scene;
pub mod shape;
pub mod template;

pub use aggregate::{grouped_bodies, simple_shapes, AXIS_CONVERSION, DEFAULT_PROXY_MARKER};
pub use compiler::Compiler;
pub use error::ConvertError;
pub use obj::{read_obj, write_obj};
pub use physics_text::parse_shapes;
pub use pipeline::{
    export, import_physics, ExportMode, ExportOptions, ExportReport, ExportSource, ExportStage,
};
pub use scene::{Scene, SceneObject};
pub use shape::{RigidBody, Shape};
pub use template::{BodyDefaults, PhysicsDocument, Renderer, ShapeDefaults, Template};
