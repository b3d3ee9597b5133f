use crate::Vec3;

/// A ray `P = origin + s * direction` with `s >= 0`.
///
/// The direction is not required to be normalized. Hit distances are
/// measured in world units from the origin, not in parameter units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray from `origin` passing through `target`, with a unit direction.
    pub fn towards(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, (target - origin).normalize())
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter s.
    pub fn at(&self, s: f64) -> Vec3 {
        self.origin + self.direction * s
    }

    /// Euclidean distance from the ray origin to `point`.
    pub fn distance_to(&self, point: Vec3) -> f64 {
        self.origin.distance(point)
    }
}
