//! Immutable scene aggregate.

use prism_core::{Color, Tolerances, BACKGROUND};

use crate::{Light, Shape};

/// Shapes and lights for one render.
///
/// Nothing in a scene changes once it is built, which is what lets every
/// worker thread read it without locks.
#[derive(Debug, Clone)]
pub struct Scene {
    shapes: Vec<Shape>,
    lights: Vec<Light>,
    background: Color,
    tolerances: Tolerances,
}

impl Scene {
    pub fn new(shapes: Vec<Shape>, lights: Vec<Light>) -> Self {
        Self {
            shapes,
            lights,
            background: BACKGROUND,
            tolerances: Tolerances::default(),
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Color of rays that leave the scene.
    pub fn background(&self) -> Color {
        self.background
    }

    pub fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    pub fn triangle_count(&self) -> usize {
        self.shapes.iter().map(Shape::triangle_count).sum()
    }
}
