use anyhow::{anyhow, ensure, Context, Result};
use glam::{EulerRot, Mat4, Quat, Vec3};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Geometry snapshot handed over by the authoring tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Parses a scene description.
    ///
    /// ```xml
    /// <scene>
    ///   <object>
    ///     <name>Crate_hull_0</name>
    ///     <position>0 0 1</position>
    ///     <vertex>0 0 0</vertex>
    ///     <vertex>1 0 0</vertex>
    ///   </object>
    /// </scene>
    /// ```
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let mut objects = Vec::new();

        for node in document.descendants().filter(|n| n.has_tag_name("object")) {
            let mut object = SceneObject::default();
            object.name = required_text(&node, "name")?;
            ensure!(
                !object.name.contains(['\n', '\r']),
                "object name {:?} spans several lines",
                object.name
            );
            object.object_type = optional_text(&node, "type").unwrap_or_else(|| "mesh".to_string());
            object.position = parse_vec3(optional_text(&node, "position"), object.position)
                .with_context(|| format!("invalid position for {}", object.name))?;
            object.rotation = parse_vec3(optional_text(&node, "rotation"), object.rotation)
                .with_context(|| format!("invalid rotation for {}", object.name))?;
            object.scale = parse_vec3(optional_text(&node, "scale"), object.scale)
                .with_context(|| format!("invalid scale for {}", object.name))?;
            object.matrix = parse_matrix(optional_text(&node, "matrix"))
                .with_context(|| format!("invalid matrix for {}", object.name))?;
            for (index, vertex) in node
                .children()
                .filter(|child| child.has_tag_name("vertex"))
                .enumerate()
            {
                let text = vertex.text().map(str::trim).unwrap_or_default();
                let position = parse_vec3(Some(text.to_string()), Vec3::ZERO)
                    .with_context(|| format!("invalid vertex {index} of {}", object.name))?;
                object.vertices.push(position);
            }
            objects.push(object);
        }

        Ok(Self { objects })
    }
}

/// Scene object as exported by the authoring tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub position: Vec3,
    /// Euler XYZ angles in degrees.
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    /// Explicit world matrix; takes precedence over position/rotation/scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Mat4>,
    /// Local-space vertex positions.
    #[serde(default)]
    pub vertices: Vec<Vec3>,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            object_type: String::new(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
            matrix: None,
            vertices: Vec::new(),
        }
    }
}

impl SceneObject {
    /// Creates a mesh object with an identity transform.
    pub fn mesh(name: impl Into<String>, vertices: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            object_type: "mesh".to_string(),
            vertices,
            ..Self::default()
        }
    }

    pub fn is_mesh(&self) -> bool {
        self.object_type == "mesh"
    }

    /// Local-to-world matrix of the object.
    pub fn world_transform(&self) -> Mat4 {
        if let Some(matrix) = self.matrix {
            return matrix;
        }
        let rotation = Quat::from_euler(
            EulerRot::ZYX,
            self.rotation.z.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.x.to_radians(),
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_numbers(value: &str) -> Result<Vec<f32>> {
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|component| !component.is_empty())
        .map(|component| -> Result<f32> {
            let value = component
                .parse::<f32>()
                .map_err(|err| anyhow!("failed to parse float {component:?}: {err}"))?;
            ensure!(value.is_finite(), "float {component:?} is not finite");
            Ok(value)
        })
        .collect()
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    match parse_numbers(&value)?.as_slice() {
        &[x, y, z] => Ok(Vec3::new(x, y, z)),
        other => Err(anyhow!("expected 3 components, found {}", other.len())),
    }
}

/// Sixteen numbers in row-major order, the way the authoring tool prints them.
fn parse_matrix(value: Option<String>) -> Result<Option<Mat4>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let numbers = parse_numbers(&value)?;
    let rows: [f32; 16] = numbers
        .as_slice()
        .try_into()
        .map_err(|_| anyhow!("expected 16 matrix components, found {}", numbers.len()))?;
    Ok(Some(Mat4::from_cols_array(&rows).transpose()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <scene>
        <object>
            <name>Crate</name>
            <position>1 2 3</position>
            <vertex>0 0 0</vertex>
            <vertex>1, 0, 0</vertex>
        </object>
        <object>
            <name>Camera</name>
            <type>camera</type>
        </object>
        <object>
            <name>Crate_hull_0</name>
            <matrix>
                1 0 0 5
                0 1 0 0
                0 0 1 0
                0 0 0 1
            </matrix>
            <vertex>0 1 0</vertex>
        </object>
    </scene>
    "#;

    #[test]
    fn parse_scene_populates_objects() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        assert_eq!(scene.objects.len(), 3);
        let crate_object = &scene.objects[0];
        assert!(crate_object.is_mesh());
        assert_eq!(crate_object.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            crate_object.vertices,
            vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)]
        );
        assert!(!scene.objects[1].is_mesh());
    }

    #[test]
    fn matrix_is_read_row_major() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        let hull = &scene.objects[2];
        let moved = hull.world_transform().transform_point3(Vec3::ZERO);
        assert_eq!(moved, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn trs_transform_applies_scale_then_translation() {
        let object = SceneObject {
            position: Vec3::new(0.0, 0.0, 1.0),
            scale: Vec3::splat(2.0),
            ..SceneObject::mesh("Box", Vec::new())
        };
        let world = object.world_transform().transform_point3(Vec3::X);
        assert!((world - Vec3::new(2.0, 0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn missing_name_is_an_error() {
        let bad = "<scene><object><type>mesh</type></object></scene>";
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn short_vertex_is_an_error() {
        let bad = "<scene><object><name>A</name><vertex>1 2</vertex></object></scene>";
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn euler_rotation_is_in_degrees() {
        let object = SceneObject {
            rotation: Vec3::new(0.0, 0.0, 90.0),
            ..SceneObject::mesh("Box", Vec::new())
        };
        let world = object.world_transform().transform_point3(Vec3::X);
        assert!((world - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn non_finite_coordinates_are_errors() {
        for value in ["NaN 0 0", "0 inf 0", "0 0 -infinity"] {
            let bad = format!(
                "<scene><object><name>A</name><vertex>{value}</vertex></object></scene>"
            );
            assert!(Scene::from_xml(&bad).is_err(), "{value} was accepted");
        }
        let bad = "<scene><object><name>A</name><position>nan 0 0</position></object></scene>";
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn multiline_name_is_an_error() {
        let bad = "<scene><object><name>Crate&#10;vertex_num: 9</name></object></scene>";
        let err = Scene::from_xml(bad).unwrap_err();
        assert!(err.to_string().contains("spans several lines"));
    }
}
