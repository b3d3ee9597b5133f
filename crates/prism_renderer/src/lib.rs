//! Prism Renderer - recursive ray tracing on the CPU.
//!
//! Rays leave a pinhole at the origin through a screen plane, find the
//! nearest primitive, get Phong shaded with shadow rays toward every light,
//! and reflect until the material stops them or the depth budget runs out.
//! Pixels are independent, so the same per-pixel function runs either in a
//! plain loop or spread over rayon's thread pool.

mod camera;
mod light;
mod loader;
mod mesh;
mod plane;
mod progress;
mod raster;
mod renderer;
mod scene;
mod shader;
mod shadow;
mod shape;
mod sphere;
mod tracer;
mod triangle;

pub use camera::{Camera, Viewport};
pub use light::{Light, PointLight, SphereLight};
pub use loader::{load_scene, scene_from_description};
pub use mesh::{make_box_mesh, MeshGeometry, TriangleMesh};
pub use plane::Plane;
pub use progress::{NoProgress, ProgressSink, ProgressTracker};
pub use raster::Raster;
pub use renderer::{render, render_pixel, RenderError, RenderResult, Strategy};
pub use scene::Scene;
pub use shader::{PhongShader, Shader};
pub use shadow::ShadowRay;
pub use shape::{Intersection, Shape, Surface};
pub use sphere::Sphere;
pub use tracer::RayTracing;
pub use triangle::Triangle;

/// Re-export the value types every caller needs
pub use prism_core::{Color, Material, Tolerances};
pub use prism_math::{Aabb, Interval, Ray, Vec3};

use rand::{Rng, RngCore};

/// Uniform sample in [0, 1).
#[inline]
pub(crate) fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen()
}
