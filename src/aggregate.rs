//! Turns scene objects into shapes and rigid bodies.

use glam::{Mat4, Vec3};
use log::{debug, warn};

use crate::error::{ConvertError, Result};
use crate::scene::SceneObject;
use crate::shape::{RigidBody, Shape};

/// Naming convention used by V-HACD for generated convex hulls.
pub const DEFAULT_PROXY_MARKER: &str = "_hull";

/// Z-up to Y-up: a -90° rotation about X, `(x, y, z) -> (x, z, -y)`.
///
/// Spelled out entry by entry so that axis-aligned input stays exact.
pub const AXIS_CONVERSION: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0, //
    0.0, 0.0, -1.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
]);

/// Vertices of `object` in target-engine world space.
pub fn world_vertices(object: &SceneObject) -> Vec<Vec3> {
    let transform = AXIS_CONVERSION * object.world_transform();
    object
        .vertices
        .iter()
        .map(|vertex| transform.transform_point3(*vertex))
        .collect()
}

/// One shape per mesh object, in scene order.
pub fn simple_shapes(objects: &[SceneObject]) -> Vec<Shape> {
    objects
        .iter()
        .filter(|object| {
            let keep = object.is_mesh();
            if !keep {
                debug!("skipping {} ({})", object.name, object.object_type);
            }
            keep
        })
        .map(|object| Shape::named(object.name.clone(), world_vertices(object)))
        .collect()
}

/// Text before the first occurrence of `marker`, if `name` is a proxy.
pub fn proxy_parent<'a>(name: &'a str, marker: &str) -> Option<&'a str> {
    if marker.is_empty() {
        return None;
    }
    name.find(marker).map(|index| &name[..index])
}

/// One rigid body per non-proxy mesh object, owning the shapes of its proxies.
///
/// Fails with [`ConvertError::NoCollisionProxies`] when no object name
/// contains `marker`.
pub fn grouped_bodies(objects: &[SceneObject], marker: &str) -> Result<Vec<RigidBody>> {
    group_shapes(simple_shapes(objects), marker)
}

/// Groups named shapes into bodies: shapes whose name contains `marker` are
/// attached to the body named after their prefix, every other shape only
/// contributes its name.
pub fn group_shapes(shapes: Vec<Shape>, marker: &str) -> Result<Vec<RigidBody>> {
    let (proxies, parents): (Vec<Shape>, Vec<Shape>) = shapes
        .into_iter()
        .partition(|shape| proxy_parent(shape_name(shape), marker).is_some());
    if proxies.is_empty() {
        return Err(ConvertError::NoCollisionProxies);
    }

    let mut bodies: Vec<RigidBody> = parents
        .iter()
        .map(|shape| RigidBody::new(shape_name(shape)))
        .collect();

    for proxy in proxies {
        let name = shape_name(&proxy).to_string();
        let Some(parent) = proxy_parent(&name, marker) else {
            continue;
        };
        match bodies.iter_mut().find(|body| body.name == parent) {
            Some(body) => body.shapes.push(proxy),
            None => warn!("collision proxy {name} has no parent object {parent:?}"),
        }
    }

    Ok(bodies)
}

fn shape_name(shape: &Shape) -> &str {
    shape.name.as_deref().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(name: &str, vertices: &[[f32; 3]]) -> SceneObject {
        SceneObject::mesh(name, vertices.iter().copied().map(Vec3::from).collect())
    }

    #[test]
    fn axis_conversion_maps_z_up_to_y_up() {
        let converted = AXIS_CONVERSION.transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(converted, Vec3::new(1.0, 3.0, -2.0));
    }

    #[test]
    fn simple_mode_applies_world_transform_before_axis_conversion() {
        let mut moved = object("Box", &[[0.0, 0.0, 0.0]]);
        moved.position = Vec3::new(0.0, 5.0, 0.0);
        let shapes = simple_shapes(&[moved]);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].name.as_deref(), Some("Box"));
        assert_eq!(shapes[0].vertices, vec![Vec3::new(0.0, 0.0, -5.0)]);
    }

    #[test]
    fn simple_mode_skips_non_mesh_objects() {
        let mut camera = object("Camera", &[]);
        camera.object_type = "camera".to_string();
        let shapes = simple_shapes(&[camera, object("Box", &[[1.0, 0.0, 0.0]])]);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].vertices, vec![Vec3::X]);
    }

    #[test]
    fn simple_mode_accepts_empty_scene() {
        assert!(simple_shapes(&[]).is_empty());
    }

    #[test]
    fn grouped_mode_assigns_proxies_to_parents() {
        let objects = vec![
            object("Crate_hull_1", &[[0.0, 0.0, 1.0]]),
            object("Crate", &[[9.0, 9.0, 9.0]]),
            object("Barrel", &[]),
            object("Barrel_hull_0", &[[1.0, 0.0, 0.0]]),
            object("Crate_hull_0", &[[0.0, 1.0, 0.0]]),
        ];
        let bodies = grouped_bodies(&objects, DEFAULT_PROXY_MARKER).unwrap();
        assert_eq!(bodies.len(), 2);

        assert_eq!(bodies[0].name, "Crate");
        let names: Vec<_> = bodies[0]
            .shapes
            .iter()
            .map(|shape| shape.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["Crate_hull_1", "Crate_hull_0"]);
        assert_eq!(bodies[0].shapes[0].vertices, vec![Vec3::new(0.0, 1.0, 0.0)]);

        assert_eq!(bodies[1].name, "Barrel");
        assert_eq!(bodies[1].shapes.len(), 1);
    }

    #[test]
    fn grouped_mode_shapes_belong_to_exactly_one_body() {
        let objects = vec![
            object("A", &[]),
            object("AB", &[]),
            object("A_hull_0", &[[0.0, 0.0, 0.0]]),
            object("AB_hull_0", &[[0.0, 0.0, 0.0]]),
            object("Orphan_hull_0", &[[0.0, 0.0, 0.0]]),
        ];
        let bodies = grouped_bodies(&objects, DEFAULT_PROXY_MARKER).unwrap();
        let total: usize = bodies.iter().map(|body| body.shapes.len()).sum();
        assert_eq!(total, 2);
        for body in &bodies {
            for shape in &body.shapes {
                let name = shape.name.as_deref().unwrap();
                assert_eq!(proxy_parent(name, DEFAULT_PROXY_MARKER), Some(body.name.as_str()));
            }
        }
    }

    #[test]
    fn grouped_mode_without_proxies_fails() {
        let objects = vec![object("Crate", &[[0.0, 0.0, 0.0]])];
        let err = grouped_bodies(&objects, DEFAULT_PROXY_MARKER).unwrap_err();
        assert!(matches!(err, ConvertError::NoCollisionProxies));
        assert!(matches!(
            grouped_bodies(&[], DEFAULT_PROXY_MARKER),
            Err(ConvertError::NoCollisionProxies)
        ));
    }

    #[test]
    fn group_shapes_works_on_named_point_clouds() {
        let shapes = vec![
            Shape::named("Gate", vec![Vec3::ONE]),
            Shape::named("Gate_hull_0", vec![Vec3::X]),
        ];
        let bodies = group_shapes(shapes, DEFAULT_PROXY_MARKER).unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].shapes, vec![Shape::named("Gate_hull_0", vec![Vec3::X])]);
    }

    #[test]
    fn proxy_parent_uses_first_marker_occurrence() {
        assert_eq!(proxy_parent("Rock_hull_hull_2", "_hull"), Some("Rock"));
        assert_eq!(proxy_parent("Rock", "_hull"), None);
        assert_eq!(proxy_parent("Rock_hull", ""), None);
    }
}
