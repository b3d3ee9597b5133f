//! Local reflectance models.

use prism_core::{Color, ColorExt};
use prism_math::{Ray, Vec3};
use rand::RngCore;

use crate::{Intersection, Scene};

/// Direct illumination at a hit plus the rule for blending in reflections.
pub trait Shader: Sync {
    /// Direct light at `hit`, reached along `ray`. Unclamped.
    fn evaluate(&self, hit: &Intersection<'_>, ray: &Ray, scene: &Scene, rng: &mut dyn RngCore) -> Color;

    /// `direct * (1 - k) + reflected * k`
    fn mix_reflected(&self, direct: Color, reflected: Color, reflectivity: f64) -> Color {
        direct * (1.0 - reflectivity) + reflected * reflectivity
    }
}

/// Phong model: ambient plus per-light diffuse and specular terms, each
/// light scaled by how much of it the hit point can see.
///
/// The viewer is always the pinhole at the origin, also for hits reached
/// through reflections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhongShader;

impl Shader for PhongShader {
    fn evaluate(&self, hit: &Intersection<'_>, _ray: &Ray, scene: &Scene, rng: &mut dyn RngCore) -> Color {
        let material = hit.material();
        let surface = hit.color();
        let point = hit.point;
        let normal = hit.normal();
        let view = (Vec3::ZERO - point).normalize();

        let mut total = surface * material.ambient;

        for light in scene.lights() {
            let visible = light.occlusion(hit, scene, rng);
            if visible <= 0.0 {
                continue;
            }

            let to_light = (light.position() - point).normalize();
            let intensity = light.intensity_at(point);

            let lambert = normal.dot(to_light).max(0.0);
            let diffuse = surface * material.diffuse * (intensity * lambert);

            let mirrored = (2.0 * to_light.dot(normal) * normal - to_light).normalize();
            let highlight = mirrored.dot(view).max(0.0).powf(material.phong_exponent());
            let specular = light.color() * material.specular * (intensity * highlight);

            total += (diffuse + specular) * visible;
        }

        total
    }
}

/// Final pixel value from a sum of `count` sample colors.
pub(crate) fn average_samples(sum: Color, count: u32) -> Color {
    (sum / count as f64).normalised()
}
