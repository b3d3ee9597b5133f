//! Sphere primitive.

use prism_core::{Color, Material};
use prism_math::{Ray, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
    pub color: Color,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64, color: Color, material: Material) -> Self {
        debug_assert!(radius > 0.0, "sphere radius must be positive");
        Self {
            center,
            radius,
            color,
            material,
        }
    }

    /// Smallest positive ray parameter where the ray meets the sphere.
    ///
    /// Solves `|O + sD - C|^2 = r^2`. Roots at or behind the origin are
    /// rejected, so a ray starting inside returns the far wall.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let half_b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let near = (-half_b - sqrtd) / a;
        if near > 0.0 {
            return Some(near);
        }
        let far = (-half_b + sqrtd) / a;
        (far > 0.0).then_some(far)
    }

    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        (point - self.center).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere_at(center: Vec3, radius: f64) -> Sphere {
        Sphere::new(center, radius, Color::ONE, Material::default())
    }

    #[test]
    fn test_sphere_hit_front() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, 20.0), 5.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        let s = sphere.intersect(&ray).unwrap();
        assert!((s - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_sphere_hit_lies_on_surface_and_ray() {
        let sphere = unit_sphere_at(Vec3::new(1.0, -2.0, 12.0), 3.5);
        let ray = Ray::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.03, -0.15, 1.0));

        let s = sphere.intersect(&ray).unwrap();
        let p = ray.at(s);
        assert!(s >= 0.0);
        assert!(((p - sphere.center).length() - sphere.radius).abs() < 1e-9);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, 20.0), 5.0);

        // Passes beside it
        let ray = Ray::new(Vec3::new(6.0, 0.0, 0.0), Vec3::Z);
        assert!(sphere.intersect(&ray).is_none());

        // Points away from it
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_from_inside_returns_far_wall() {
        let sphere = unit_sphere_at(Vec3::ZERO, 5.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let s = sphere.intersect(&ray).unwrap();
        assert!((s - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_sphere_normal_faces_incoming_ray() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, 20.0), 5.0);
        let ray = Ray::new(Vec3::new(1.0, 1.0, 0.0), Vec3::new(-0.05, -0.05, 1.0));

        let p = ray.at(sphere.intersect(&ray).unwrap());
        let n = sphere.normal_at(p);
        assert!((n.length() - 1.0).abs() < 1e-9);
        assert!(ray.direction.dot(n) < 0.0);
    }
}
