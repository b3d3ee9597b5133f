//! Light sources.
//!
//! Both kinds fall off with the inverse square of distance. A point light
//! is either visible or not; a sphere light is sampled with several shadow
//! rays and reports the visible fraction, which softens shadow edges.

use std::f64::consts::PI;

use prism_core::Color;
use prism_math::Vec3;
use rand::RngCore;

use crate::{gen_f64, Intersection, Scene, ShadowRay};

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    /// Intensity at the source
    pub intensity: f64,
}

impl PointLight {
    pub fn new(position: Vec3, color: Color, intensity: f64) -> Self {
        Self {
            position,
            color,
            intensity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphereLight {
    pub center: Vec3,
    pub radius: f64,
    pub color: Color,
    pub intensity: f64,
    /// Shadow rays cast per shading point
    pub samples: u32,
}

impl SphereLight {
    pub fn new(center: Vec3, radius: f64, color: Color, intensity: f64, samples: u32) -> Self {
        debug_assert!(samples > 0, "sphere light needs at least one sample");
        Self {
            center,
            radius,
            color,
            intensity,
            samples,
        }
    }

    /// Uniform point on the light's surface.
    fn sample_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        let z = 2.0 * gen_f64(rng) - 1.0;
        let phi = 2.0 * PI * gen_f64(rng);
        let r = (1.0 - z * z).max(0.0).sqrt();
        self.center + self.radius * Vec3::new(r * phi.cos(), r * phi.sin(), z)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Point(PointLight),
    Sphere(SphereLight),
}

impl Light {
    /// Position used for the shading direction `L`.
    pub fn position(&self) -> Vec3 {
        match self {
            Light::Point(light) => light.position,
            Light::Sphere(light) => light.center,
        }
    }

    /// Color of the specular highlight.
    pub fn color(&self) -> Color {
        match self {
            Light::Point(light) => light.color,
            Light::Sphere(light) => light.color,
        }
    }

    pub fn intensity(&self) -> f64 {
        match self {
            Light::Point(light) => light.intensity,
            Light::Sphere(light) => light.intensity,
        }
    }

    /// Illumination reaching `point`: `I / (4 pi d^2)`.
    pub fn intensity_at(&self, point: Vec3) -> f64 {
        let d2 = self.position().distance_squared(point);
        self.intensity() / (4.0 * PI * d2)
    }

    /// Fraction of the light visible from `hit`, in [0, 1].
    pub fn occlusion(&self, hit: &Intersection<'_>, scene: &Scene, rng: &mut dyn RngCore) -> f64 {
        let lift = scene.tolerances().lift_epsilon;
        match self {
            Light::Point(light) => {
                let shadow = ShadowRay::new(hit, light.position, lift);
                if shadow.is_occluded(scene) {
                    0.0
                } else {
                    1.0
                }
            }
            Light::Sphere(light) => {
                let visible = (0..light.samples)
                    .filter(|_| !ShadowRay::new(hit, light.sample_point(rng), lift).is_occluded(scene))
                    .count();
                visible as f64 / light.samples as f64
            }
        }
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<SphereLight> for Light {
    fn from(light: SphereLight) -> Self {
        Light::Sphere(light)
    }
}
