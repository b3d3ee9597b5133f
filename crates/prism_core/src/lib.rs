//! Prism Core - value types and the scene description for the Prism ray tracer.
//!
//! This crate provides:
//!
//! - **Color**: unbounded RGB energy accumulator, clamped once per pixel
//! - **Material**: the five Phong coefficients plus the named presets
//! - **Tolerances**: surface lift and shadow distance epsilons
//! - **Scene description**: the JSON document a render starts from, with
//!   validation that rejects malformed scenes before any tracing happens
//!
//! # Example
//!
//! ```ignore
//! use prism_core::SceneDescription;
//!
//! let description = SceneDescription::load("scenes/spheres.json")?;
//! println!("{} shapes, {} lights", description.shapes.len(), description.lights.len());
//! ```

pub mod color;
pub mod description;
pub mod material;
pub mod tolerance;

// Re-export commonly used types
pub use color::{Color, ColorExt, BACKGROUND, BLANK};
pub use description::{
    CameraSpec, ColorSpec, DescriptionError, DescriptionResult, LightSpec, MaterialSpec,
    SceneDescription, ShapeSpec, TransformOp,
};
pub use material::Material;
pub use tolerance::Tolerances;
