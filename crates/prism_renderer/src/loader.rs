//! Scene construction from a validated description.

use std::path::Path;

use prism_core::{CameraSpec, DescriptionResult, LightSpec, SceneDescription, ShapeSpec, TransformOp};
use prism_math::Vec3;

use crate::{
    make_box_mesh, Light, MeshGeometry, Plane, PointLight, Scene, Shape, Sphere, SphereLight, Triangle,
    TriangleMesh,
};

fn v(a: [f64; 3]) -> Vec3 {
    Vec3::from_array(a)
}

fn build_shape(spec: &ShapeSpec) -> DescriptionResult<Shape> {
    let surface = spec.surface();
    let color = surface.color();
    let material = surface.material()?;

    let shape = match spec {
        ShapeSpec::Sphere { center, radius, .. } => Sphere::new(v(*center), *radius, color, material).into(),
        ShapeSpec::Plane { normal, point, .. } => Plane::new(v(*normal), v(*point), color, material).into(),
        ShapeSpec::Triangle { a, b, c, normals, .. } => {
            let tri = Triangle::new(v(*a), v(*b), v(*c), color, material);
            match normals {
                Some(ns) => tri.with_vertex_normals(ns.map(v)).into(),
                None => tri.into(),
            }
        }
        ShapeSpec::Mesh {
            positions,
            normals,
            faces,
            face_normals,
            transform,
            ..
        } => {
            let geometry = MeshGeometry {
                positions: positions.iter().copied().map(v).collect(),
                normals: normals.iter().copied().map(v).collect(),
                faces: faces.clone(),
                face_normals: face_normals.clone(),
            };
            TriangleMesh::new(geometry, &TransformOp::compose(transform), color, material).into()
        }
        ShapeSpec::Box { min, max, transform, .. } => {
            make_box_mesh(v(*min), v(*max), &TransformOp::compose(transform), color, material).into()
        }
    };
    Ok(shape)
}

fn build_light(spec: &LightSpec) -> Light {
    match spec {
        LightSpec::Point {
            position,
            color,
            intensity,
        } => PointLight::new(v(*position), color.to_color(), *intensity).into(),
        LightSpec::Sphere {
            center,
            radius,
            color,
            intensity,
            samples,
        } => SphereLight::new(v(*center), *radius, color.to_color(), *intensity, *samples).into(),
    }
}

/// Build the traceable scene for a description.
///
/// The description is validated again here, so hand-built descriptions get
/// the same checks as loaded ones.
pub fn scene_from_description(description: &SceneDescription) -> DescriptionResult<Scene> {
    description.validate()?;

    let shapes = description
        .shapes
        .iter()
        .map(build_shape)
        .collect::<DescriptionResult<Vec<_>>>()?;
    let lights = description.lights.iter().map(build_light).collect();

    let scene = Scene::new(shapes, lights)
        .with_background(description.background())
        .with_tolerances(description.tolerances);

    log::info!(
        "Built scene: {} shapes ({} triangles), {} lights",
        scene.shapes().len(),
        scene.triangle_count(),
        scene.lights().len()
    );
    Ok(scene)
}

/// Load a description file and build its scene. The camera overrides from
/// the file are returned alongside for the caller to apply.
pub fn load_scene<P: AsRef<Path>>(path: P) -> DescriptionResult<(Scene, CameraSpec)> {
    let description = SceneDescription::load(path)?;
    let scene = scene_from_description(&description)?;
    Ok((scene, description.camera))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RayTracing, Surface};
    use prism_core::{Material, Tolerances};
    use prism_math::Ray;

    const SCENE: &str = r#"{
        "background": { "rgb8": [0, 0, 0] },
        "tolerances": { "lift_epsilon": 1e-4 },
        "shapes": [
            { "type": "sphere", "center": [0, 0, 20], "radius": 5, "color": [1, 0, 0], "material": "gold" },
            { "type": "plane", "normal": [0, 1, 0], "point": [0, -5, 0] },
            { "type": "box", "min": [-1, -1, -1], "max": [1, 1, 1],
              "transform": [ { "rotate_y": 45 }, { "translate": [8, 0, 20] } ] },
            { "type": "mesh",
              "positions": [[-1, -1, 0], [-1, 1, 0], [1, 1, 0], [1, -1, 0]],
              "faces": [[0, 1, 2], [0, 2, 3]],
              "transform": [ { "translate": [-8, 0, 20] } ] }
        ],
        "lights": [
            { "type": "point", "position": [10, 10, 10], "intensity": 0.8 },
            { "type": "sphere", "center": [0, 20, 0], "radius": 1, "intensity": 2, "samples": 4 }
        ]
    }"#;

    #[test]
    fn test_build_scene() {
        let description = SceneDescription::from_json_str(SCENE).unwrap();
        let scene = scene_from_description(&description).unwrap();

        assert_eq!(scene.shapes().len(), 4);
        assert_eq!(scene.lights().len(), 2);
        assert_eq!(scene.triangle_count(), 14);
        assert_eq!(scene.background(), Vec3::ZERO);
        assert_eq!(scene.tolerances().lift_epsilon, 1e-4);
        assert_eq!(scene.tolerances().shadow_tolerance, Tolerances::DEFAULT_SHADOW_TOLERANCE);
        assert!(matches!(scene.lights()[1], Light::Sphere(SphereLight { samples: 4, .. })));
    }

    #[test]
    fn test_materials_resolved() {
        let description = SceneDescription::from_json_str(SCENE).unwrap();
        let scene = scene_from_description(&description).unwrap();

        let hit = Ray::new(Vec3::ZERO, Vec3::Z).find_first_intersection(&scene).unwrap();
        assert!(matches!(hit.surface, Surface::Sphere(_)));
        assert_eq!(hit.material(), Material::preset("gold").unwrap());

        let floor = Ray::new(Vec3::ZERO, -Vec3::Y).find_first_intersection(&scene).unwrap();
        assert_eq!(floor.material(), Material::DEFAULT_NON_REFLECTIVE);
    }

    #[test]
    fn test_transformed_box_is_where_described() {
        let description = SceneDescription::from_json_str(SCENE).unwrap();
        let scene = scene_from_description(&description).unwrap();

        // Rotated 45 degrees the box reaches sqrt(2) from its center along x.
        let ray = Ray::new(Vec3::new(5.5, 0.0, 20.0), Vec3::X);
        let hit = ray.find_first_intersection(&scene).unwrap();
        assert!((hit.point.x - (8.0 - 2f64.sqrt())).abs() < 1e-9);
    }
}
