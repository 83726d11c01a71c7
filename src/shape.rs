use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Ordered point cloud that becomes one `ShapeParam` polytope.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub vertices: Vec<Vec3>,
}

impl Shape {
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self {
            name: None,
            vertices,
        }
    }

    pub fn named(name: impl Into<String>, vertices: Vec<Vec3>) -> Self {
        Self {
            name: Some(name.into()),
            vertices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Named body owning the collision shapes derived from its proxies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RigidBody {
    pub name: String,
    pub shapes: Vec<Shape>,
}

impl RigidBody {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shapes: Vec::new(),
        }
    }
}
