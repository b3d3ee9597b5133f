//! Shadow rays.

use prism_math::{Ray, Vec3};

use crate::{Intersection, Scene};

/// A ray from a lifted surface point toward a light sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowRay {
    pub ray: Ray,
    pub target: Vec3,
    target_distance: f64,
}

impl ShadowRay {
    /// Shadow ray leaving `hit` toward `target`. The origin is lifted by the
    /// scene's lift epsilon so the surface does not shadow itself.
    pub fn new(hit: &Intersection<'_>, target: Vec3, lift: f64) -> Self {
        let origin = hit.lifted_point(lift);
        Self {
            ray: Ray::towards(origin, target),
            target,
            target_distance: origin.distance(target),
        }
    }

    pub fn target_distance(&self) -> f64 {
        self.target_distance
    }

    /// True when any shape sits in front of the target, or at the target
    /// within the shadow tolerance.
    pub fn is_occluded(&self, scene: &Scene) -> bool {
        let tolerance = scene.tolerances().shadow_tolerance;
        scene
            .shapes()
            .iter()
            .filter_map(|shape| shape.intersect(&self.ray))
            .any(|hit| {
                hit.distance < self.target_distance
                    || (hit.distance - self.target_distance).abs() < tolerance
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Plane, Shape, Sphere};
    use prism_core::{Color, Material};

    fn floor() -> Shape {
        Plane::new(Vec3::Y, Vec3::ZERO, Color::ONE, Material::default()).into()
    }

    #[test]
    fn test_unblocked_shadow_ray() {
        let scene = Scene::new(vec![floor()], vec![]);
        let hit = scene.shapes()[0]
            .intersect(&Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y))
            .unwrap();

        let shadow = ShadowRay::new(&hit, Vec3::new(3.0, 4.0, 0.0), 1e-6);
        assert!((shadow.target_distance() - 5.0).abs() < 1e-5);
        assert!((shadow.ray.direction.length() - 1.0).abs() < 1e-12);
        assert!(!shadow.is_occluded(&scene));
    }

    #[test]
    fn test_blocker_between_point_and_light() {
        let blocker: Shape = Sphere::new(Vec3::new(0.0, 2.0, 0.0), 0.5, Color::ONE, Material::default()).into();
        let scene = Scene::new(vec![floor(), blocker], vec![]);
        let hit = scene.shapes()[0]
            .intersect(&Ray::new(Vec3::new(0.0, 5.0, 1.0), Vec3::new(0.0, -5.0, -1.0)))
            .unwrap();

        let shadow = ShadowRay::new(&hit, Vec3::new(0.0, 10.0, 0.0), 1e-6);
        assert!(shadow.is_occluded(&scene));
    }

    #[test]
    fn test_blocker_beyond_light_does_not_occlude() {
        let beyond: Shape = Sphere::new(Vec3::new(0.0, 20.0, 0.0), 0.5, Color::ONE, Material::default()).into();
        let scene = Scene::new(vec![floor(), beyond], vec![]);
        let hit = scene.shapes()[0]
            .intersect(&Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y))
            .unwrap();

        let shadow = ShadowRay::new(&hit, Vec3::new(0.0, 10.0, 0.0), 1e-6);
        assert!(!shadow.is_occluded(&scene));
    }
}
