use crate::Vec3;

/// Tracer specific helpers on top of glam's `DVec3`.
pub trait Vec3Ext {
    /// Mirror `self` about the plane with unit normal `normal`: `d - 2(d.n)n`.
    fn reflect_about(self, normal: Vec3) -> Vec3;

    /// True when the magnitude is 1 within `tolerance`.
    fn is_unit(self, tolerance: f64) -> bool;
}

impl Vec3Ext for Vec3 {
    fn reflect_about(self, normal: Vec3) -> Vec3 {
        debug_assert!(normal.is_unit(1e-6), "reflection normal must be unit length");
        self - 2.0 * self.dot(normal) * normal
    }

    fn is_unit(self, tolerance: f64) -> bool {
        (self.length() - 1.0).abs() <= tolerance
    }
}
