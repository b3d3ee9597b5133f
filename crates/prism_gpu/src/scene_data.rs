//! Flattening a [`Scene`] into the plain-old-data buffers the kernel reads.
//!
//! Every struct here mirrors one in `trace.wgsl` and is built from `[f32; 4]`
//! and `[u32; 4]` fields only, so the Rust and WGSL layouts agree without
//! any padding rules to think about.

use bytemuck::{Pod, Zeroable};
use prism_core::{Color, Material};
use prism_math::Vec3;
use prism_renderer::{Light, Scene, Shape, TriangleMesh, Viewport};

/// Smallest lift that survives f32 rounding at typical scene scales.
pub const MIN_GPU_LIFT: f64 = 1e-4;

/// Smallest shadow tolerance the kernel can resolve in f32.
pub const MIN_GPU_SHADOW_TOLERANCE: f64 = 1e-6;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuMaterial {
    pub color: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// `w` holds the Phong exponent.
    pub specular: [f32; 4],
    /// `x` holds the reflectivity.
    pub extra: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuSphere {
    pub center_radius: [f32; 4],
    pub info: [u32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuPlane {
    pub normal: [f32; 4],
    pub point: [f32; 4],
    pub info: [u32; 4],
}

/// A run of triangles sharing one material and an optional bounding box.
///
/// Standalone triangles become single-triangle runs without bounds.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuMesh {
    /// `w` is 1 when the bounds should be tested before the triangles.
    pub bounds_min: [f32; 4],
    pub bounds_max: [f32; 4],
    /// First triangle, triangle count, material.
    pub info: [u32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuTriangle {
    pub a: [f32; 4],
    pub b: [f32; 4],
    pub c: [f32; 4],
    pub na: [f32; 4],
    pub nb: [f32; 4],
    pub nc: [f32; 4],
    /// Face normal, `w` is 1 when vertex normals are interpolated.
    pub normal: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    /// Radius is 0 for point lights.
    pub position_radius: [f32; 4],
    pub color_intensity: [f32; 4],
    /// Shadow samples, 0 for point lights.
    pub info: [u32; 4],
}

/// Uniform block shared by every batch; only `batch` changes between them.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuParams {
    pub screen: [f32; 4],
    pub tracing: [f32; 4],
    pub background: [f32; 4],
    pub counts: [u32; 4],
    pub config: [u32; 4],
    pub batch: [u32; 4],
}

impl GpuParams {
    pub fn new(scene: &Scene, data: &SceneData, viewport: &Viewport, max_depth: u32, seed: u64) -> Self {
        let tolerances = scene.tolerances();
        let lift = tolerances.lift_epsilon.max(MIN_GPU_LIFT);
        let shadow = tolerances.shadow_tolerance.max(MIN_GPU_SHADOW_TOLERANCE);
        Self {
            screen: [
                viewport.screen_width as f32,
                viewport.screen_height as f32,
                viewport.pixel_width as f32,
                viewport.pixel_height as f32,
            ],
            tracing: [viewport.depth as f32, lift as f32, shadow as f32, 0.0],
            background: vec4(scene.background(), 1.0),
            counts: [
                data.spheres.len() as u32,
                data.planes.len() as u32,
                data.meshes.len() as u32,
                data.lights.len() as u32,
            ],
            config: [viewport.width_px, viewport.height_px, viewport.samples_per_side, max_depth],
            batch: [fold_seed(seed), 0, 0, 0],
        }
    }

    /// Restrict the kernel to pixels `start..end`.
    pub fn with_batch(mut self, start: u32, end: u32) -> Self {
        self.batch[1] = start;
        self.batch[2] = end;
        self
    }
}

/// The whole scene as kernel-ready arrays.
#[derive(Debug, Default, Clone)]
pub struct SceneData {
    pub materials: Vec<GpuMaterial>,
    pub spheres: Vec<GpuSphere>,
    pub planes: Vec<GpuPlane>,
    pub meshes: Vec<GpuMesh>,
    pub triangles: Vec<GpuTriangle>,
    pub lights: Vec<GpuLight>,
}

impl SceneData {
    pub fn from_scene(scene: &Scene) -> Self {
        let mut data = Self::default();
        for shape in scene.shapes() {
            match shape {
                Shape::Sphere(sphere) => {
                    let material = data.push_material(sphere.color, &sphere.material);
                    data.spheres.push(GpuSphere {
                        center_radius: vec4(sphere.center, sphere.radius as f32),
                        info: [material, 0, 0, 0],
                    });
                }
                Shape::Plane(plane) => {
                    let material = data.push_material(plane.color, &plane.material);
                    data.planes.push(GpuPlane {
                        normal: vec4(plane.normal, 0.0),
                        point: vec4(plane.point, 1.0),
                        info: [material, 0, 0, 0],
                    });
                }
                Shape::Triangle(tri) => {
                    let material = data.push_material(tri.color, &tri.material);
                    let first = data.triangles.len() as u32;
                    data.triangles.push(gpu_triangle(
                        tri.vertices,
                        tri.face_normal(),
                        tri.vertex_normals,
                    ));
                    data.meshes.push(GpuMesh {
                        bounds_min: [0.0; 4],
                        bounds_max: [0.0; 4],
                        info: [first, 1, material, 0],
                    });
                }
                Shape::Mesh(mesh) => data.push_mesh(mesh),
            }
        }
        data.lights = scene.lights().iter().map(gpu_light).collect();
        data
    }

    fn push_material(&mut self, color: Color, material: &Material) -> u32 {
        self.materials.push(GpuMaterial {
            color: vec4(color, 1.0),
            ambient: vec4(material.ambient, 0.0),
            diffuse: vec4(material.diffuse, 0.0),
            specular: vec4(material.specular, material.phong_exponent() as f32),
            extra: [material.reflectivity as f32, 0.0, 0.0, 0.0],
        });
        (self.materials.len() - 1) as u32
    }

    fn push_mesh(&mut self, mesh: &TriangleMesh) {
        let material = self.push_material(mesh.color, &mesh.material);
        let first = self.triangles.len() as u32;
        for face in 0..mesh.face_count() {
            self.triangles.push(gpu_triangle(
                mesh.face_vertices(face),
                mesh.face_normal(face),
                mesh.face_vertex_normals(face),
            ));
        }
        let (bounds_min, bounds_max) = match mesh.bounds() {
            Some(bounds) => (vec4(bounds.min(), 1.0), vec4(bounds.max(), 0.0)),
            None => ([0.0; 4], [0.0; 4]),
        };
        self.meshes.push(GpuMesh {
            bounds_min,
            bounds_max,
            info: [first, mesh.face_count() as u32, material, 0],
        });
    }
}

/// Storage bindings cannot be empty; a single zeroed element stands in and
/// the counts in [`GpuParams`] keep the kernel from reading it.
pub fn padded<T: Pod>(items: &[T]) -> Vec<T> {
    if items.is_empty() {
        vec![T::zeroed()]
    } else {
        items.to_vec()
    }
}

fn gpu_triangle(vertices: [Vec3; 3], normal: Vec3, vertex_normals: Option<[Vec3; 3]>) -> GpuTriangle {
    let (smooth, [na, nb, nc]) = match vertex_normals {
        Some(normals) => (1.0, normals),
        None => (0.0, [normal; 3]),
    };
    GpuTriangle {
        a: vec4(vertices[0], 1.0),
        b: vec4(vertices[1], 1.0),
        c: vec4(vertices[2], 1.0),
        na: vec4(na, 0.0),
        nb: vec4(nb, 0.0),
        nc: vec4(nc, 0.0),
        normal: vec4(normal, smooth),
    }
}

fn gpu_light(light: &Light) -> GpuLight {
    let (radius, samples) = match light {
        Light::Point(_) => (0.0, 0),
        Light::Sphere(sphere) => (sphere.radius as f32, sphere.samples),
    };
    GpuLight {
        position_radius: vec4(light.position(), radius),
        color_intensity: vec4(light.color(), light.intensity() as f32),
        info: [samples, 0, 0, 0],
    }
}

fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x as f32, v.y as f32, v.z as f32, w]
}

fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}
