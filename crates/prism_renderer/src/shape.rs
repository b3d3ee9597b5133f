//! The closed set of traceable primitives.

use prism_core::{Color, Material};
use prism_math::{Ray, Vec3};

use crate::{Plane, Sphere, Triangle, TriangleMesh};

#[derive(Debug, Clone)]
pub enum Shape {
    Sphere(Sphere),
    Plane(Plane),
    Triangle(Triangle),
    /// Also used for boxes, see [`crate::make_box_mesh`].
    Mesh(TriangleMesh),
}

impl Shape {
    /// Closest hit in front of the ray origin, if any.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let (surface, s) = match self {
            Shape::Sphere(sphere) => (Surface::Sphere(sphere), sphere.intersect(ray)?),
            Shape::Plane(plane) => (Surface::Plane(plane), plane.intersect(ray)?),
            Shape::Triangle(tri) => (Surface::Triangle(tri), tri.intersect(ray)?),
            Shape::Mesh(mesh) => {
                let (face, s) = mesh.intersect(ray)?;
                (Surface::MeshFace { mesh, face }, s)
            }
        };
        let point = ray.at(s);
        Some(Intersection {
            surface,
            point,
            distance: ray.distance_to(point),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Sphere(_) => "sphere",
            Shape::Plane(_) => "plane",
            Shape::Triangle(_) => "triangle",
            Shape::Mesh(_) => "mesh",
        }
    }

    pub fn triangle_count(&self) -> usize {
        match self {
            Shape::Triangle(_) => 1,
            Shape::Mesh(mesh) => mesh.face_count(),
            _ => 0,
        }
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Shape::Sphere(sphere)
    }
}

impl From<Plane> for Shape {
    fn from(plane: Plane) -> Self {
        Shape::Plane(plane)
    }
}

impl From<Triangle> for Shape {
    fn from(triangle: Triangle) -> Self {
        Shape::Triangle(triangle)
    }
}

impl From<TriangleMesh> for Shape {
    fn from(mesh: TriangleMesh) -> Self {
        Shape::Mesh(mesh)
    }
}

/// The exact piece of geometry a ray hit. A mesh hit resolves to one face
/// so normal, color and material queries see that face, not the mesh.
#[derive(Debug, Clone, Copy)]
pub enum Surface<'a> {
    Sphere(&'a Sphere),
    Plane(&'a Plane),
    Triangle(&'a Triangle),
    MeshFace { mesh: &'a TriangleMesh, face: usize },
}

impl<'a> Surface<'a> {
    /// Unit outward normal at a point on this surface.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        match self {
            Surface::Sphere(sphere) => sphere.normal_at(point),
            Surface::Plane(plane) => plane.normal_at(point),
            Surface::Triangle(tri) => tri.normal_at(point),
            Surface::MeshFace { mesh, face } => mesh.normal_at(*face, point),
        }
    }

    pub fn color_at(&self, _point: Vec3) -> Color {
        match self {
            Surface::Sphere(sphere) => sphere.color,
            Surface::Plane(plane) => plane.color,
            Surface::Triangle(tri) => tri.color,
            Surface::MeshFace { mesh, .. } => mesh.color,
        }
    }

    pub fn material_at(&self, _point: Vec3) -> Material {
        match self {
            Surface::Sphere(sphere) => sphere.material,
            Surface::Plane(plane) => plane.material,
            Surface::Triangle(tri) => tri.material,
            Surface::MeshFace { mesh, .. } => mesh.material,
        }
    }
}

/// Record of a ray hitting a surface.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    pub surface: Surface<'a>,
    /// World-space hit point
    pub point: Vec3,
    /// Euclidean distance from the ray origin
    pub distance: f64,
}

impl<'a> Intersection<'a> {
    pub fn normal(&self) -> Vec3 {
        self.surface.normal_at(self.point)
    }

    pub fn color(&self) -> Color {
        self.surface.color_at(self.point)
    }

    pub fn material(&self) -> Material {
        self.surface.material_at(self.point)
    }

    /// Hit point pushed off the surface along its normal, the origin for
    /// shadow and reflection rays.
    pub fn lifted_point(&self, lift: f64) -> Vec3 {
        self.point + self.normal() * lift
    }
}
