//! Prism math - double precision linear algebra for the ray tracer.
//!
//! Vectors and matrices come straight from glam's `f64` types and are
//! re-exported under short names. A `Vec3` is used for both points and free
//! vectors; callers track which is which. On top of glam this crate adds the
//! pieces a tracer needs: rays, intervals, axis-aligned boxes and a couple of
//! extension traits for reflection and affine transforms.

pub use glam::{DMat3 as Mat3, DMat4 as Mat4, DVec3 as Vec3, DVec4 as Vec4};

mod aabb;
mod interval;
mod ray;
mod transform;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Mat4Ext;
pub use vector::Vec3Ext;
