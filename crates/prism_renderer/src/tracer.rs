//! Nearest-hit search and recursive reflection tracing.

use prism_core::{Color, BLANK};
use prism_math::{Ray, Vec3Ext};
use rand::RngCore;

use crate::{Intersection, Scene, Shader};

/// Tracing operations on a [`Ray`].
pub trait RayTracing {
    /// Closest intersection over every shape in the scene.
    fn find_first_intersection<'a>(&self, scene: &'a Scene) -> Option<Intersection<'a>>;

    /// Mirror this ray about the surface normal at `hit`. The new origin is
    /// lifted off the surface by `lift` so it does not hit the same spot.
    fn reflected_ray(&self, hit: &Intersection<'_>, lift: f64) -> Ray;

    /// Color seen along this ray, following mirror reflections.
    ///
    /// `depth` counts surfaces still allowed to contribute; at zero the
    /// result is [`BLANK`]. Non-reflective surfaces end the recursion early.
    fn trace_with_reflections(
        &self,
        scene: &Scene,
        shader: &dyn Shader,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color;
}

impl RayTracing for Ray {
    fn find_first_intersection<'a>(&self, scene: &'a Scene) -> Option<Intersection<'a>> {
        scene
            .shapes()
            .iter()
            .filter_map(|shape| shape.intersect(self))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn reflected_ray(&self, hit: &Intersection<'_>, lift: f64) -> Ray {
        let normal = hit.normal();
        let direction = self.direction.reflect_about(normal).normalize();
        Ray::new(hit.point + normal * lift, direction)
    }

    fn trace_with_reflections(
        &self,
        scene: &Scene,
        shader: &dyn Shader,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        if depth == 0 {
            return BLANK;
        }

        let Some(hit) = self.find_first_intersection(scene) else {
            return scene.background();
        };

        let direct = shader.evaluate(&hit, self, scene, rng);
        let material = hit.material();
        if !material.is_reflective() {
            return direct;
        }

        let reflected = self
            .reflected_ray(&hit, scene.tolerances().lift_epsilon)
            .trace_with_reflections(scene, shader, depth - 1, rng);
        shader.mix_reflected(direct, reflected, material.reflectivity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Light, PhongShader, Plane, PointLight, Shape, Sphere};
    use prism_core::{Material, BACKGROUND};
    use prism_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mirror() -> Material {
        Material::preset("mirror").unwrap()
    }

    #[test]
    fn test_reflected_ray_off_floor() {
        let scene = Scene::new(vec![Plane::new(Vec3::Y, Vec3::ZERO, Color::ONE, mirror()).into()], vec![]);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));

        let hit = ray.find_first_intersection(&scene).unwrap();
        let reflected = ray.reflected_ray(&hit, 1e-6);

        let h = 2f64.sqrt() / 2.0;
        assert!((reflected.direction - Vec3::new(h, h, 0.0)).length() < 1e-12);
        assert!(reflected.origin.y > 0.0);
    }

    #[test]
    fn test_double_mirror_restores_direction() {
        let floor: Shape = Plane::new(Vec3::Y, Vec3::ZERO, Color::ONE, mirror()).into();
        let ceiling: Shape = Plane::new(-Vec3::Y, Vec3::new(0.0, 2.0, 0.0), Color::ONE, mirror()).into();
        let scene = Scene::new(vec![floor, ceiling], vec![]);

        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let first = ray.reflected_ray(&ray.find_first_intersection(&scene).unwrap(), 1e-6);
        let second = first.reflected_ray(&first.find_first_intersection(&scene).unwrap(), 1e-6);

        let h = 2f64.sqrt() / 2.0;
        assert!((first.direction - Vec3::new(h, h, 0.0)).length() < 1e-12);
        assert!((second.direction - Vec3::new(h, -h, 0.0)).length() < 1e-12);
        assert!(second.direction.cross(ray.direction).length() < 1e-12);
    }

    #[test]
    fn test_nearest_of_several_shapes() {
        let near = Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0, Color::X, Material::default());
        let far = Sphere::new(Vec3::new(0.0, 0.0, 20.0), 5.0, Color::Y, Material::default());
        let scene = Scene::new(vec![far.into(), near.into()], vec![]);

        let hit = Ray::new(Vec3::ZERO, Vec3::Z).find_first_intersection(&scene).unwrap();
        assert_eq!(hit.color(), Color::X);
        assert!((hit.distance - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_depth_zero_is_blank() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0, Color::ONE, mirror());
        let light = PointLight::new(Vec3::new(0.0, 5.0, 0.0), Color::ONE, 100.0);
        let scene = Scene::new(vec![sphere.into()], vec![Light::from(light)]);
        let mut rng = StdRng::seed_from_u64(42);

        for direction in [Vec3::Z, -Vec3::Z, Vec3::X] {
            let c = Ray::new(Vec3::ZERO, direction).trace_with_reflections(&scene, &PhongShader, 0, &mut rng);
            assert_eq!(c, BLANK);
        }
    }

    #[test]
    fn test_miss_returns_background() {
        let scene = Scene::new(vec![], vec![]);
        let mut rng = StdRng::seed_from_u64(42);

        let c = Ray::new(Vec3::ZERO, Vec3::Z).trace_with_reflections(&scene, &PhongShader, 5, &mut rng);
        assert_eq!(c, BACKGROUND);
    }

    #[test]
    fn test_facing_mirrors_terminate() {
        let floor: Shape = Plane::new(Vec3::Y, Vec3::ZERO, Color::ONE, mirror()).into();
        let ceiling: Shape = Plane::new(-Vec3::Y, Vec3::new(0.0, 2.0, 0.0), Color::ONE, mirror()).into();
        let scene = Scene::new(vec![floor, ceiling], vec![]);
        let mut rng = StdRng::seed_from_u64(42);

        // Straight up and down between the mirrors never escapes.
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        for depth in [1, 2, 10, 200] {
            let c = ray.trace_with_reflections(&scene, &PhongShader, depth, &mut rng);
            assert!(c.is_finite());
        }
    }

    #[test]
    fn test_non_reflective_ignores_depth() {
        let matte = Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0, Color::ONE, Material::default());
        let light = PointLight::new(Vec3::new(0.0, 5.0, 0.0), Color::ONE, 100.0);
        let scene = Scene::new(vec![matte.into()], vec![light.into()]);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        let shallow = ray.trace_with_reflections(&scene, &PhongShader, 1, &mut StdRng::seed_from_u64(1));
        let deep = ray.trace_with_reflections(&scene, &PhongShader, 8, &mut StdRng::seed_from_u64(1));
        assert_eq!(shallow, deep);
    }
}
