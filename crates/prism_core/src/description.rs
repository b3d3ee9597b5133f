//! JSON scene description.
//!
//! A description is plain data: shapes, lights, optional camera settings and
//! tolerances. [`SceneDescription::load`] parses and validates in one step so
//! that a malformed scene is rejected with a descriptive error before any
//! render starts. Turning a description into traceable geometry is the
//! renderer's job.

use std::collections::BTreeMap;
use std::path::Path;

use prism_math::{Mat4, Mat4Ext, Vec3};
use serde::Deserialize;
use thiserror::Error;

use crate::color::{Color, ColorExt};
use crate::material::Material;
use crate::tolerance::Tolerances;

/// Errors that can occur while reading a scene description.
#[derive(Error, Debug)]
pub enum DescriptionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error at line {line}, column {column}: {message}")]
    Json {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unknown material preset: {0:?}")]
    UnknownMaterial(String),

    #[error("Shape {index} ({kind}): {reason}")]
    InvalidShape {
        index: usize,
        kind: &'static str,
        reason: String,
    },

    #[error("Light {index}: {reason}")]
    InvalidLight { index: usize, reason: String },

    #[error("Invalid {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

impl From<serde_json::Error> for DescriptionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Result type for description operations.
pub type DescriptionResult<T> = Result<T, DescriptionError>;

/// Root of a scene description document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDescription {
    #[serde(default)]
    pub background: Option<ColorSpec>,

    #[serde(default)]
    pub tolerances: Tolerances,

    #[serde(default)]
    pub camera: CameraSpec,

    pub shapes: Vec<ShapeSpec>,

    #[serde(default)]
    pub lights: Vec<LightSpec>,
}

/// An RGB color, either unit floats `[r, g, b]` or `{"rgb8": [r, g, b]}`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Unit([f64; 3]),
    Rgb8 { rgb8: [u8; 3] },
}

impl Default for ColorSpec {
    fn default() -> Self {
        ColorSpec::Unit([1.0, 1.0, 1.0])
    }
}

impl ColorSpec {
    pub fn to_color(self) -> Color {
        match self {
            ColorSpec::Unit(c) => Vec3::from_array(c),
            ColorSpec::Rgb8 { rgb8 } => Color::from_rgb8(rgb8),
        }
    }

    fn check(self) -> Result<(), String> {
        if let ColorSpec::Unit(c) = self {
            if c.iter().any(|v| !(0.0..=1.0).contains(v)) {
                return Err(format!(
                    "color {c:?} is outside [0, 1]; use {{\"rgb8\": [..]}} for 8-bit values"
                ));
            }
        }
        Ok(())
    }
}

/// A per-channel coefficient, given as one number or three.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Coefficient {
    Uniform(f64),
    Rgb([f64; 3]),
}

impl Coefficient {
    fn to_color(self) -> Color {
        match self {
            Coefficient::Uniform(v) => Vec3::splat(v),
            Coefficient::Rgb(c) => Vec3::from_array(c),
        }
    }
}

/// A material, either a preset name or explicit coefficients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MaterialSpec {
    Preset(String),
    Custom {
        ambient: Coefficient,
        diffuse: Coefficient,
        specular: Coefficient,
        roughness: f64,
        reflectivity: f64,
    },
}

impl MaterialSpec {
    pub fn resolve(&self) -> DescriptionResult<Material> {
        match self {
            MaterialSpec::Preset(name) => Material::preset(name)
                .ok_or_else(|| DescriptionError::UnknownMaterial(name.clone())),
            MaterialSpec::Custom {
                ambient,
                diffuse,
                specular,
                roughness,
                reflectivity,
            } => Ok(Material::new(
                ambient.to_color(),
                diffuse.to_color(),
                specular.to_color(),
                *roughness,
                *reflectivity,
            )),
        }
    }
}

/// Color and material shared by every shape kind.
///
/// Shapes flatten this struct, which rules out `deny_unknown_fields`, so
/// leftover keys are collected here and rejected during validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SurfaceSpec {
    #[serde(default)]
    pub color: ColorSpec,

    #[serde(default)]
    pub material: Option<MaterialSpec>,

    #[serde(flatten)]
    unknown: BTreeMap<String, serde_json::Value>,
}

impl SurfaceSpec {
    pub fn color(&self) -> Color {
        self.color.to_color()
    }

    /// The resolved material, falling back to the non-reflective default.
    pub fn material(&self) -> DescriptionResult<Material> {
        match &self.material {
            Some(spec) => spec.resolve(),
            None => Ok(Material::DEFAULT_NON_REFLECTIVE),
        }
    }
}

/// One step of a model transform. Steps apply in the order they are listed.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOp {
    Scale([f64; 3]),
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),
    Translate([f64; 3]),
}

impl TransformOp {
    pub fn to_matrix(self) -> Mat4 {
        match self {
            TransformOp::Scale(s) => Mat4::from_scale(Vec3::from_array(s)),
            TransformOp::RotateX(deg) => Mat4::from_rotation_x_degrees(deg),
            TransformOp::RotateY(deg) => Mat4::from_rotation_y_degrees(deg),
            TransformOp::RotateZ(deg) => Mat4::from_rotation_z_degrees(deg),
            TransformOp::Translate(t) => Mat4::from_translation(Vec3::from_array(t)),
        }
    }

    /// Compose a list of steps into one matrix, first step innermost.
    pub fn compose(ops: &[TransformOp]) -> Mat4 {
        ops.iter()
            .fold(Mat4::IDENTITY, |acc, op| op.to_matrix() * acc)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeSpec {
    Sphere {
        center: [f64; 3],
        radius: f64,
        #[serde(flatten)]
        surface: SurfaceSpec,
    },
    Plane {
        normal: [f64; 3],
        point: [f64; 3],
        #[serde(flatten)]
        surface: SurfaceSpec,
    },
    Triangle {
        a: [f64; 3],
        b: [f64; 3],
        c: [f64; 3],
        /// Per-vertex normals; omitted means flat shading.
        #[serde(default)]
        normals: Option<[[f64; 3]; 3]>,
        #[serde(flatten)]
        surface: SurfaceSpec,
    },
    Mesh {
        positions: Vec<[f64; 3]>,
        #[serde(default)]
        normals: Vec<[f64; 3]>,
        faces: Vec<[usize; 3]>,
        /// Indices into `normals` per face corner. Defaults to `faces` when
        /// normals are given; ignored when they are not.
        #[serde(default)]
        face_normals: Option<Vec<[usize; 3]>>,
        #[serde(default)]
        transform: Vec<TransformOp>,
        #[serde(flatten)]
        surface: SurfaceSpec,
    },
    Box {
        min: [f64; 3],
        max: [f64; 3],
        #[serde(default)]
        transform: Vec<TransformOp>,
        #[serde(flatten)]
        surface: SurfaceSpec,
    },
}

impl ShapeSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ShapeSpec::Sphere { .. } => "sphere",
            ShapeSpec::Plane { .. } => "plane",
            ShapeSpec::Triangle { .. } => "triangle",
            ShapeSpec::Mesh { .. } => "mesh",
            ShapeSpec::Box { .. } => "box",
        }
    }

    pub fn surface(&self) -> &SurfaceSpec {
        match self {
            ShapeSpec::Sphere { surface, .. }
            | ShapeSpec::Plane { surface, .. }
            | ShapeSpec::Triangle { surface, .. }
            | ShapeSpec::Mesh { surface, .. }
            | ShapeSpec::Box { surface, .. } => surface,
        }
    }

    fn check(&self) -> Result<(), String> {
        let surface = self.surface();
        if !surface.unknown.is_empty() {
            let keys: Vec<&str> = surface.unknown.keys().map(String::as_str).collect();
            return Err(format!("unknown field(s) {}", keys.join(", ")));
        }
        surface.color.check()?;
        match self {
            ShapeSpec::Sphere { radius, .. } => {
                if !(*radius > 0.0) {
                    return Err(format!("radius must be positive, got {radius}"));
                }
            }
            ShapeSpec::Plane { normal, .. } => check_direction("normal", *normal)?,
            ShapeSpec::Triangle { a, b, c, normals, .. } => {
                check_triangle(Vec3::from_array(*a), Vec3::from_array(*b), Vec3::from_array(*c))?;
                for n in normals.iter().flatten() {
                    check_direction("vertex normal", *n)?;
                }
            }
            ShapeSpec::Mesh {
                positions,
                normals,
                faces,
                face_normals,
                transform,
                ..
            } => {
                if faces.is_empty() {
                    return Err("mesh has no faces".into());
                }
                for (i, face) in faces.iter().enumerate() {
                    if let Some(&bad) = face.iter().find(|&&v| v >= positions.len()) {
                        return Err(format!(
                            "face {i} references vertex {bad}, but only {} exist",
                            positions.len()
                        ));
                    }
                    let [a, b, c] = face.map(|v| Vec3::from_array(positions[v]));
                    check_triangle(a, b, c).map_err(|e| format!("face {i}: {e}"))?;
                }
                for n in normals {
                    check_direction("normal", *n)?;
                }
                if !normals.is_empty() {
                    let corners = face_normals.as_ref().unwrap_or(faces);
                    if corners.len() != faces.len() {
                        return Err(format!(
                            "{} face_normals entries for {} faces",
                            corners.len(),
                            faces.len()
                        ));
                    }
                    if let Some(bad) = corners.iter().flatten().find(|&&n| n >= normals.len()) {
                        return Err(format!(
                            "normal index {bad} out of range ({} normals)",
                            normals.len()
                        ));
                    }
                }
                check_transform(transform)?;
            }
            ShapeSpec::Box {
                min, max, transform, ..
            } => {
                if min.iter().zip(max).any(|(lo, hi)| lo >= hi) {
                    return Err(format!("min {min:?} must be below max {max:?} on every axis"));
                }
                check_transform(transform)?;
            }
        }
        self.surface().material().map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum LightSpec {
    Point {
        position: [f64; 3],
        #[serde(default)]
        color: ColorSpec,
        intensity: f64,
    },
    /// Spherical area light sampled with `samples` shadow rays.
    Sphere {
        center: [f64; 3],
        radius: f64,
        #[serde(default)]
        color: ColorSpec,
        intensity: f64,
        #[serde(default = "default_light_samples")]
        samples: u32,
    },
}

fn default_light_samples() -> u32 {
    16
}

impl LightSpec {
    fn check(&self) -> Result<(), String> {
        let (color, intensity) = match self {
            LightSpec::Point {
                color, intensity, ..
            } => (color, intensity),
            LightSpec::Sphere {
                color,
                intensity,
                radius,
                samples,
                ..
            } => {
                if !(*radius > 0.0) {
                    return Err(format!("radius must be positive, got {radius}"));
                }
                if *samples == 0 {
                    return Err("a sphere light needs at least one sample".into());
                }
                (color, intensity)
            }
        };
        color.check()?;
        if !(*intensity > 0.0) {
            return Err(format!("intensity must be positive, got {intensity}"));
        }
        Ok(())
    }
}

/// Optional camera overrides carried by the description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSpec {
    pub screen_height: Option<f64>,
    pub depth: Option<f64>,
    pub ratio: Option<f64>,
    pub height_px: Option<u32>,
    pub reflection_limit: Option<u32>,
    pub samples_per_side: Option<u32>,
    pub seed: Option<u64>,
}

fn check_material(m: &Material) -> Result<(), String> {
    if !(0.0..=1.0).contains(&m.reflectivity) {
        return Err(format!("reflectivity {} is outside [0, 1]", m.reflectivity));
    }
    if !(m.roughness >= 0.0) {
        return Err(format!("roughness {} must be non-negative", m.roughness));
    }
    Ok(())
}

fn check_direction(what: &str, v: [f64; 3]) -> Result<(), String> {
    if Vec3::from_array(v).length() <= Tolerances::INTERSECTION_EPSILON {
        return Err(format!("{what} {v:?} has zero length"));
    }
    Ok(())
}

fn check_triangle(a: Vec3, b: Vec3, c: Vec3) -> Result<(), String> {
    if (b - a).cross(c - a).length() <= Tolerances::INTERSECTION_EPSILON {
        return Err(format!("vertices {a}, {b}, {c} are collinear"));
    }
    Ok(())
}

fn check_transform(ops: &[TransformOp]) -> Result<(), String> {
    let det = TransformOp::compose(ops).determinant();
    if det.abs() <= Tolerances::INTERSECTION_EPSILON {
        return Err("transform is not invertible".into());
    }
    Ok(())
}

impl SceneDescription {
    /// Read, parse and validate a description file.
    pub fn load<P: AsRef<Path>>(path: P) -> DescriptionResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let description = Self::from_json_str(&text)?;
        log::info!(
            "Loaded scene description {}: {} shapes, {} lights",
            path.display(),
            description.shapes.len(),
            description.lights.len()
        );
        Ok(description)
    }

    /// Parse and validate a description from a JSON string.
    pub fn from_json_str(text: &str) -> DescriptionResult<Self> {
        let description: SceneDescription = serde_json::from_str(text)?;
        description.validate()?;
        Ok(description)
    }

    pub fn background(&self) -> Color {
        self.background
            .map(ColorSpec::to_color)
            .unwrap_or(crate::color::BACKGROUND)
    }

    /// Reject anything the tracer would treat as undefined behavior.
    pub fn validate(&self) -> DescriptionResult<()> {
        if let Some(bg) = self.background {
            bg.check().map_err(|reason| DescriptionError::InvalidSetting {
                field: "background",
                reason,
            })?;
        }

        let t = self.tolerances;
        if !(t.lift_epsilon > 0.0) || !(t.shadow_tolerance >= 0.0) {
            return Err(DescriptionError::InvalidSetting {
                field: "tolerances",
                reason: format!("{t:?} must be non-negative with a positive lift"),
            });
        }

        for (index, shape) in self.shapes.iter().enumerate() {
            // Surface the precise error for unknown presets.
            let material = shape.surface().material()?;
            shape
                .check()
                .and_then(|()| check_material(&material))
                .map_err(|reason| DescriptionError::InvalidShape {
                    index,
                    kind: shape.kind(),
                    reason,
                })?;
        }

        for (index, light) in self.lights.iter().enumerate() {
            light
                .check()
                .map_err(|reason| DescriptionError::InvalidLight { index, reason })?;
        }

        if self.lights.is_empty() {
            log::warn!("Scene has no lights; only ambient shading will be visible");
        }
        Ok(())
    }
}
