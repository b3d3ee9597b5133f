// Transform utilities for Mat4
//
// glam already provides transform_point3(), transform_vector3() and inverse();
// this adds the normal matrix and the tracer's degree-based builders.

use crate::{Mat3, Mat4};

/// Extension trait for affine `Mat4` transforms.
pub trait Mat4Ext {
    /// Rotation about an axis given in degrees.
    fn from_rotation_x_degrees(degrees: f64) -> Mat4;
    fn from_rotation_y_degrees(degrees: f64) -> Mat4;
    fn from_rotation_z_degrees(degrees: f64) -> Mat4;

    /// Inverse-transpose of the upper-left 3x3 block.
    ///
    /// Normals transformed by this stay perpendicular to surfaces under
    /// non-uniform scale. The block must be invertible.
    fn normal_matrix(&self) -> Mat3;
}

impl Mat4Ext for Mat4 {
    fn from_rotation_x_degrees(degrees: f64) -> Mat4 {
        Mat4::from_rotation_x(degrees.to_radians())
    }

    fn from_rotation_y_degrees(degrees: f64) -> Mat4 {
        Mat4::from_rotation_y(degrees.to_radians())
    }

    fn from_rotation_z_degrees(degrees: f64) -> Mat4 {
        Mat4::from_rotation_z(degrees.to_radians())
    }

    fn normal_matrix(&self) -> Mat3 {
        let upper = Mat3::from_mat4(*self);
        debug_assert!(upper.determinant().abs() > 1e-12, "singular transform");
        upper.inverse().transpose()
    }
}
