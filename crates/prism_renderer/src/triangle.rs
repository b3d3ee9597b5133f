//! Triangle primitive.
//!
//! Intersects the supporting plane first, then classifies the hit point by
//! barycentric coordinates from the 2x2 normal equations of the edge
//! vectors. The same helpers serve standalone triangles and mesh faces.

use prism_core::{Color, Material, Tolerances};
use prism_math::{Ray, Vec3};

use crate::plane::intersect_plane;

#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    /// Per-vertex normals for smooth shading; `None` shades flat.
    pub vertex_normals: Option<[Vec3; 3]>,
    pub color: Color,
    pub material: Material,
    face_normal: Vec3,
}

impl Triangle {
    /// Flat shaded triangle.
    pub fn new(a: Vec3, b: Vec3, c: Vec3, color: Color, material: Material) -> Self {
        Self {
            vertices: [a, b, c],
            vertex_normals: None,
            color,
            material,
            face_normal: face_normal(a, b, c),
        }
    }

    /// Smooth shaded triangle. Identical vertex normals fall back to flat
    /// shading since interpolation would change nothing.
    pub fn with_vertex_normals(mut self, normals: [Vec3; 3]) -> Self {
        let normals = normals.map(Vec3::normalize);
        if normals[0] != normals[1] || normals[1] != normals[2] {
            self.vertex_normals = Some(normals);
        }
        self
    }

    pub fn face_normal(&self) -> Vec3 {
        self.face_normal
    }

    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let [a, b, c] = self.vertices;
        intersect_triangle(a, b, c, self.face_normal, ray)
    }

    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        match &self.vertex_normals {
            None => self.face_normal,
            Some(normals) => {
                let [a, b, c] = self.vertices;
                interpolate_normal(normals, barycentric(a, b, c, point))
            }
        }
    }
}

/// Unit normal `(B - A) x (C - A)`, counter-clockwise winding faces out.
pub(crate) fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize()
}

/// Barycentric weights `(u, v, w)` of `p` with `p = uA + vB + wC`.
///
/// `p` is assumed to lie in the triangle's plane. Collinear vertices make
/// the system singular; that is a malformed scene, not a miss.
pub(crate) fn barycentric(a: Vec3, b: Vec3, c: Vec3, p: Vec3) -> Vec3 {
    let c0 = b - a;
    let c1 = c - a;
    let c2 = p - a;

    let a00 = c0.dot(c0);
    let a01 = c1.dot(c0);
    let a11 = c1.dot(c1);
    let b0 = c0.dot(c2);
    let b1 = c1.dot(c2);

    let det = a00 * a11 - a01 * a01;
    debug_assert!(det.abs() > Tolerances::INTERSECTION_EPSILON, "degenerate triangle");

    let v = (b0 * a11 - b1 * a01) / det;
    let w = (a00 * b1 - a01 * b0) / det;
    Vec3::new(1.0 - v - w, v, w)
}

/// Ray parameter of the hit inside triangle ABC, edges and vertices included.
pub(crate) fn intersect_triangle(a: Vec3, b: Vec3, c: Vec3, normal: Vec3, ray: &Ray) -> Option<f64> {
    let s = intersect_plane(a, normal, ray)?;
    let weights = barycentric(a, b, c, ray.at(s));
    let inside = weights.min_element() >= -Tolerances::INTERSECTION_EPSILON;
    inside.then_some(s)
}

pub(crate) fn interpolate_normal(normals: &[Vec3; 3], weights: Vec3) -> Vec3 {
    (normals[0] * weights.x + normals[1] * weights.y + normals[2] * weights.z).normalize()
}
