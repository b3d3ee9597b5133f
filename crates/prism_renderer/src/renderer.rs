//! Render orchestration.
//!
//! Every pixel is a pure function of (scene, camera, pixel index): jitter
//! and area light sampling draw from a generator seeded by the camera seed
//! and the pixel index. That is what lets the sequential and parallel
//! strategies produce identical rasters.

use prism_core::{Color, ColorExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use thiserror::Error;

use crate::shader::average_samples;
use crate::{
    Camera, PhongShader, ProgressSink, ProgressTracker, Raster, RayTracing, Scene, Shader, Viewport,
};

/// Errors that can occur while rendering or writing an image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid camera {field}: {reason}")]
    InvalidCamera { field: &'static str, reason: String },

    #[error("Expected {expected} pixels, got {actual}")]
    PixelCount { expected: usize, actual: usize },

    #[error("Cannot encode an empty {width}x{height} raster")]
    EmptyRaster { width: u32, height: u32 },

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// How pixels are distributed on the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// One loop over all pixels on the calling thread.
    Sequential,
    /// Pixels spread over rayon's thread pool.
    #[default]
    Parallel,
}

/// Generator for one pixel's random draws.
fn pixel_rng(seed: u64, index: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Final, clamped color of pixel (x, y).
///
/// With one sample per side a single ray goes through the pixel center.
/// Otherwise every cell of the n x n grid gets one jittered ray and the
/// results are averaged.
pub fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    viewport: &Viewport,
    shader: &dyn Shader,
    x: u32,
    y: u32,
) -> Color {
    let index = y as u64 * viewport.width_px as u64 + x as u64;
    let mut rng = pixel_rng(camera.seed, index);
    let n = viewport.samples_per_side;

    if n == 1 {
        let ray = viewport.pixel_center_ray(x, y);
        return average_samples(
            ray.trace_with_reflections(scene, shader, camera.max_depth, &mut rng),
            1,
        );
    }

    let mut sum = Color::ZERO;
    for i in 0..n {
        for j in 0..n {
            let ray = viewport.jittered_ray(x, y, i, j, &mut rng);
            sum += ray.trace_with_reflections(scene, shader, camera.max_depth, &mut rng);
        }
    }
    average_samples(sum, n * n)
}

/// Render the scene with the Phong shader.
///
/// The camera is validated before any pixel work starts.
pub fn render(
    scene: &Scene,
    camera: &Camera,
    strategy: Strategy,
    progress: &dyn ProgressSink,
) -> RenderResult<Raster> {
    camera.validate()?;
    let viewport = camera.viewport();
    log::info!(
        "Rendering {}x{} ({} samples/pixel, depth {}) with {:?} strategy",
        viewport.width_px,
        viewport.height_px,
        viewport.samples_per_side * viewport.samples_per_side,
        camera.max_depth,
        strategy
    );

    let shader = PhongShader;
    let tracker = ProgressTracker::new(viewport.pixel_count(), progress);
    let width = viewport.width_px as usize;

    let shade = |index: usize| {
        let x = (index % width) as u32;
        let y = (index / width) as u32;
        let color = render_pixel(scene, camera, &viewport, &shader, x, y);
        tracker.advance(1);
        color.to_rgb8()
    };

    let mut raster = Raster::new(viewport.width_px, viewport.height_px);
    match strategy {
        Strategy::Sequential => raster
            .pixels_mut()
            .iter_mut()
            .enumerate()
            .for_each(|(i, pixel)| *pixel = shade(i)),
        // Each index is written by exactly one task.
        Strategy::Parallel => raster
            .pixels_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, pixel)| *pixel = shade(i)),
    }

    tracker.finish();
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Light, NoProgress, PointLight, Sphere};
    use prism_core::{Material, BACKGROUND};
    use prism_math::Vec3;

    fn small_scene() -> Scene {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 20.0), 5.0, Color::new(1.0, 0.0, 0.0), Material::default());
        let light = PointLight::new(Vec3::new(10.0, 10.0, 10.0), Color::ONE, 5000.0);
        Scene::new(vec![sphere.into()], vec![Light::from(light)])
    }

    #[test]
    fn test_render_dimensions() {
        let camera = Camera::new().with_screen(4.0, 2.0, 1.5).with_resolution(8).with_quality(1, 2);
        let raster = render(&small_scene(), &camera, Strategy::Sequential, &NoProgress).unwrap();

        assert_eq!(raster.width(), 12);
        assert_eq!(raster.height(), 8);
    }

    #[test]
    fn test_corner_is_background() {
        let camera = Camera::new().with_resolution(21).with_quality(1, 3);
        let raster = render(&small_scene(), &camera, Strategy::Sequential, &NoProgress).unwrap();

        assert_eq!(raster.get(0, 0), BACKGROUND.to_rgb8());
        assert_ne!(raster.get(10, 10), BACKGROUND.to_rgb8());
    }

    #[test]
    fn test_invalid_camera_fails_before_rendering() {
        let reports = std::sync::Mutex::new(0);
        let sink = |_: f64| *reports.lock().unwrap() += 1;
        let camera = Camera::new().with_quality(0, 5);

        assert!(render(&small_scene(), &camera, Strategy::Parallel, &sink).is_err());
        assert_eq!(*reports.lock().unwrap(), 0);
    }

    #[test]
    fn test_zero_depth_renders_blank() {
        let camera = Camera::new().with_resolution(9).with_quality(1, 0);
        let raster = render(&small_scene(), &camera, Strategy::Parallel, &NoProgress).unwrap();

        assert!(raster.pixels().iter().all(|&p| p == [0, 0, 0]));
    }

    #[test]
    fn test_jittered_pixel_is_reproducible() {
        let scene = small_scene();
        let camera = Camera::new().with_resolution(16).with_quality(3, 3).with_seed(9);
        let vp = camera.viewport();

        let a = render_pixel(&scene, &camera, &vp, &PhongShader, 7, 5);
        let b = render_pixel(&scene, &camera, &vp, &PhongShader, 7, 5);
        assert_eq!(a, b);
    }
}
