//! Phong material coefficients and the named preset library.

use prism_math::Vec3;

use crate::color::Color;

/// Surface response to light, constant over a primitive.
///
/// `ambient`, `diffuse` and `specular` scale the matching Phong terms per
/// channel. `roughness` lives in [0, 1] and becomes the specular exponent
/// after multiplying by 128. `reflectivity` is the mirror mix factor `k`
/// in [0, 1]; zero stops reflection recursion at this surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub roughness: f64,
    pub reflectivity: f64,
}

const fn rgb(r: f64, g: f64, b: f64) -> Color {
    Vec3::new(r, g, b)
}

impl Material {
    pub const fn new(
        ambient: Color,
        diffuse: Color,
        specular: Color,
        roughness: f64,
        reflectivity: f64,
    ) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            roughness,
            reflectivity,
        }
    }

    /// Material with the same coefficient on every channel.
    pub const fn uniform(
        ambient: f64,
        diffuse: f64,
        specular: f64,
        roughness: f64,
        reflectivity: f64,
    ) -> Self {
        Self::new(
            Vec3::splat(ambient),
            Vec3::splat(diffuse),
            Vec3::splat(specular),
            roughness,
            reflectivity,
        )
    }

    /// Exponent applied to `max(0, R.V)` in the specular term.
    pub fn phong_exponent(&self) -> f64 {
        self.roughness * 128.0
    }

    pub fn is_reflective(&self) -> bool {
        self.reflectivity > 0.0
    }

    /// Look up a preset by its kebab-case name.
    pub fn preset(name: &str) -> Option<Material> {
        PRESETS
            .iter()
            .find(|(preset, _)| *preset == name)
            .map(|(_, material)| *material)
    }

    /// Names accepted by [`Material::preset`].
    pub fn preset_names() -> impl Iterator<Item = &'static str> {
        PRESETS.iter().map(|(name, _)| *name)
    }

    pub const DEFAULT_REFLECTIVE: Material = Material::uniform(0.4, 0.9, 0.6, 0.3125, 0.4);

    /// Used for every shape whose description names no material.
    pub const DEFAULT_NON_REFLECTIVE: Material = Material::uniform(0.4, 0.9, 0.6, 0.3125, 0.0);
}

impl Default for Material {
    fn default() -> Self {
        Self::DEFAULT_NON_REFLECTIVE
    }
}

// Metal colors from the classic OpenGL material tables; the simple ones are
// hand tuned.
const PRESETS: &[(&str, Material)] = &[
    ("default-reflective", Material::DEFAULT_REFLECTIVE),
    ("default-nonreflective", Material::DEFAULT_NON_REFLECTIVE),
    ("metal", Material::uniform(0.35, 0.3, 0.8, 0.05, 0.1)),
    ("glass", Material::uniform(0.0, 0.0, 0.7, 0.01, 0.2)),
    ("mirror", Material::uniform(0.0, 0.0, 0.0, 0.01, 0.9)),
    ("plastic", Material::uniform(0.1, 0.25, 0.25, 0.1, 0.05)),
    (
        "obsidian",
        Material::new(
            rgb(0.05375, 0.05, 0.06625),
            rgb(0.18275, 0.17, 0.22525),
            rgb(0.332741, 0.328634, 0.346435),
            0.3,
            0.01,
        ),
    ),
    (
        "ruby",
        Material::new(
            rgb(0.1745, 0.01175, 0.01175),
            rgb(0.61424, 0.04136, 0.04136),
            rgb(0.727811, 0.626959, 0.626959),
            0.6,
            0.01,
        ),
    ),
    (
        "brass",
        Material::new(
            rgb(0.329412, 0.223529, 0.027451),
            rgb(0.780392, 0.568627, 0.113725),
            rgb(0.992157, 0.941176, 0.807843),
            0.21794872,
            0.05,
        ),
    ),
    (
        "gold",
        Material::new(
            rgb(0.24725, 0.1995, 0.0745),
            rgb(0.75164, 0.60648, 0.22648),
            rgb(0.628281, 0.555802, 0.366065),
            0.4,
            0.05,
        ),
    ),
    (
        "silver",
        Material::uniform(0.19225, 0.50754, 0.508273, 0.4, 0.05),
    ),
    (
        "copper",
        Material::new(
            rgb(0.19125, 0.0735, 0.0225),
            rgb(0.7038, 0.27048, 0.0828),
            rgb(0.256777, 0.137622, 0.086014),
            0.1,
            0.05,
        ),
    ),
    (
        "black-plastic",
        Material::new(
            rgb(0.0, 0.0, 0.0),
            rgb(0.01, 0.01, 0.01),
            rgb(0.5, 0.5, 0.5),
            0.25,
            0.05,
        ),
    ),
    (
        "red-plastic",
        Material::new(
            rgb(0.0, 0.0, 0.0),
            rgb(0.5, 0.0, 0.0),
            rgb(0.7, 0.6, 0.6),
            0.25,
            0.05,
        ),
    ),
    (
        "cyan-plastic",
        Material::new(
            rgb(0.0, 0.1, 0.06),
            rgb(0.0, 0.50980392, 0.50980392),
            rgb(0.50196078, 0.50196078, 0.50196078),
            0.25,
            0.05,
        ),
    ),
    (
        "green-rubber",
        Material::new(
            rgb(0.0, 0.05, 0.0),
            rgb(0.4, 0.5, 0.4),
            rgb(0.04, 0.7, 0.04),
            0.078125,
            0.01,
        ),
    ),
    (
        "red-rubber",
        Material::new(
            rgb(0.05, 0.0, 0.0),
            rgb(0.5, 0.4, 0.4),
            rgb(0.7, 0.04, 0.04),
            0.078125,
            0.01,
        ),
    ),
    (
        "yellow-rubber",
        Material::new(
            rgb(0.05, 0.05, 0.0),
            rgb(0.5, 0.5, 0.4),
            rgb(0.7, 0.7, 0.04),
            0.078125,
            0.01,
        ),
    ),
    ("concrete", Material::uniform(0.07, 0.95, 0.01, 0.0000001, 0.001)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_non_reflective() {
        let m = Material::default();
        assert_eq!(m, Material::DEFAULT_NON_REFLECTIVE);
        assert!(!m.is_reflective());
    }

    #[test]
    fn test_phong_exponent() {
        assert!((Material::DEFAULT_REFLECTIVE.phong_exponent() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_preset_lookup() {
        let mirror = Material::preset("mirror").unwrap();
        assert_eq!(mirror.reflectivity, 0.9);
        assert_eq!(mirror.diffuse, Color::ZERO);

        assert!(Material::preset("unobtainium").is_none());
    }

    #[test]
    fn test_every_preset_is_in_range() {
        for name in Material::preset_names() {
            let m = Material::preset(name).unwrap();
            assert!((0.0..=1.0).contains(&m.reflectivity), "{name}");
            assert!((0.0..=1.0).contains(&m.roughness), "{name}");
        }
        assert_eq!(Material::preset_names().count(), 19);
    }
}
