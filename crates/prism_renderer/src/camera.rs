//! Pinhole camera and pixel-to-ray mapping.
//!
//! The eye sits at the origin looking down +Z. The screen plane is centered
//! on the optical axis at `depth`; image x runs toward world -X so that the
//! picture is not mirrored in a right-handed world.

use prism_core::CameraSpec;
use prism_math::{Ray, Vec3};
use rand::RngCore;

use crate::{gen_f64, RenderError, RenderResult};

/// Render configuration: screen geometry, resolution and quality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Screen plane height in world units
    pub screen_height: f64,
    /// Distance from the eye to the screen plane
    pub depth: f64,
    /// Screen width / height
    pub ratio: f64,
    /// Vertical resolution; the horizontal one follows from `ratio`
    pub height_px: u32,
    /// Surfaces a path may visit, 1 means no reflections
    pub max_depth: u32,
    /// Antialiasing grid is `samples_per_side` squared per pixel
    pub samples_per_side: u32,
    /// Seed for jitter and area light sampling
    pub seed: u64,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            screen_height: 4.0,
            depth: 2.0,
            ratio: 1.0,
            height_px: 800,
            max_depth: 5,
            samples_per_side: 3,
            seed: 0,
        }
    }

    /// Set screen plane geometry.
    pub fn with_screen(mut self, height: f64, depth: f64, ratio: f64) -> Self {
        self.screen_height = height;
        self.depth = depth;
        self.ratio = ratio;
        self
    }

    pub fn with_resolution(mut self, height_px: u32) -> Self {
        self.height_px = height_px;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_side: u32, max_depth: u32) -> Self {
        self.samples_per_side = samples_per_side;
        self.max_depth = max_depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Override whatever the description sets.
    pub fn apply(mut self, spec: &CameraSpec) -> Self {
        if let Some(v) = spec.screen_height {
            self.screen_height = v;
        }
        if let Some(v) = spec.depth {
            self.depth = v;
        }
        if let Some(v) = spec.ratio {
            self.ratio = v;
        }
        if let Some(v) = spec.height_px {
            self.height_px = v;
        }
        if let Some(v) = spec.reflection_limit {
            self.max_depth = v;
        }
        if let Some(v) = spec.samples_per_side {
            self.samples_per_side = v;
        }
        if let Some(v) = spec.seed {
            self.seed = v;
        }
        self
    }

    pub fn width_px(&self) -> u32 {
        (self.ratio * self.height_px as f64).ceil() as u32
    }

    /// Reject configurations that cannot produce an image.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |field: &'static str, reason: String| Err(RenderError::InvalidCamera { field, reason });

        for (field, value) in [
            ("screen_height", self.screen_height),
            ("depth", self.depth),
            ("ratio", self.ratio),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return invalid(field, format!("must be a positive number, got {value}"));
            }
        }
        if self.height_px == 0 {
            return invalid("height_px", "must be at least 1".into());
        }
        if self.samples_per_side == 0 {
            return invalid("samples_per_side", "must be at least 1".into());
        }
        if (self.width_px() as u64) * (self.height_px as u64) > u32::MAX as u64 {
            return invalid("height_px", format!("{}x{} is too large", self.width_px(), self.height_px));
        }
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        let width_px = self.width_px();
        let screen_width = self.ratio * self.screen_height;
        Viewport {
            width_px,
            height_px: self.height_px,
            screen_width,
            screen_height: self.screen_height,
            pixel_width: screen_width / width_px as f64,
            pixel_height: self.screen_height / self.height_px as f64,
            depth: self.depth,
            samples_per_side: self.samples_per_side,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Derived screen geometry shared by every pixel of one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width_px: u32,
    pub height_px: u32,
    pub screen_width: f64,
    pub screen_height: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub depth: f64,
    pub samples_per_side: u32,
}

impl Viewport {
    pub fn pixel_count(&self) -> usize {
        self.width_px as usize * self.height_px as usize
    }

    /// Ray from the eye through a screen point given as an offset from the
    /// screen's top-left corner.
    pub fn ray_through(&self, sx: f64, sy: f64) -> Ray {
        let target = Vec3::new(
            self.screen_width / 2.0 - sx,
            self.screen_height / 2.0 - sy,
            self.depth,
        );
        Ray::new(Vec3::ZERO, target)
    }

    /// Ray through the center of pixel (x, y).
    pub fn pixel_center_ray(&self, x: u32, y: u32) -> Ray {
        self.ray_through(
            (x as f64 + 0.5) * self.pixel_width,
            (y as f64 + 0.5) * self.pixel_height,
        )
    }

    /// Ray through a random point of sub-pixel cell (i, j) of pixel (x, y).
    /// `i` indexes rows and `j` columns of the grid.
    pub fn jittered_ray(&self, x: u32, y: u32, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let n = self.samples_per_side as f64;
        let sub_w = self.pixel_width / n;
        let sub_h = self.pixel_height / n;
        let sx = x as f64 * self.pixel_width + j as f64 * sub_w + gen_f64(rng) * sub_w;
        let sy = y as f64 * self.pixel_height + i as f64 * sub_h + gen_f64(rng) * sub_h;
        self.ray_through(sx, sy)
    }
}
