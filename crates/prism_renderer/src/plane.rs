//! Infinite plane primitive.

use prism_core::{Color, Material, Tolerances};
use prism_math::{Ray, Vec3};

/// Plane through `point` with a unit `normal`. The normal is the outward
/// side for shading no matter which side a ray arrives from.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub point: Vec3,
    pub color: Color,
    pub material: Material,
}

impl Plane {
    pub fn new(normal: Vec3, point: Vec3, color: Color, material: Material) -> Self {
        Self {
            normal: normal.normalize(),
            point,
            color,
            material,
        }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        intersect_plane(self.point, self.normal, ray)
    }

    pub fn normal_at(&self, _point: Vec3) -> Vec3 {
        self.normal
    }
}

/// Solve `(O + sD - A).N = 0`. Rays parallel to the plane, or meeting it at
/// or behind their origin, miss. `normal` need not be unit length.
pub(crate) fn intersect_plane(point: Vec3, normal: Vec3, ray: &Ray) -> Option<f64> {
    let denom = ray.direction.dot(normal);
    if denom.abs() < Tolerances::INTERSECTION_EPSILON {
        return None;
    }
    let s = -(ray.origin - point).dot(normal) / denom;
    (s > 0.0).then_some(s)
}
