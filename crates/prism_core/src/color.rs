//! RGB color as an unbounded energy triple.
//!
//! Channels are plain `f64` and may exceed 1 while light is being
//! accumulated. [`ColorExt::normalised`] clamps once, at the pixel.

use prism_math::{Interval, Vec3};

/// Colors share glam's vector algebra: `+` accumulates, `*` by a scalar
/// scales, `*` by another color scales per channel.
pub type Color = Vec3;

/// Zero energy, returned when the reflection budget runs out.
pub const BLANK: Color = Vec3::ZERO;

/// Sky color returned by rays that escape the scene, RGB(168, 204, 224).
pub const BACKGROUND: Color = Vec3::new(168.0 / 255.0, 204.0 / 255.0, 224.0 / 255.0);

pub trait ColorExt {
    /// Build a color from 8-bit channels.
    fn from_rgb8(rgb: [u8; 3]) -> Color;

    /// Clamp every channel to [0, 1].
    fn normalised(self) -> Color;

    /// Quantize to 8 bits per channel, `floor(c * 255)` after clamping.
    fn to_rgb8(self) -> [u8; 3];
}

impl ColorExt for Color {
    fn from_rgb8(rgb: [u8; 3]) -> Color {
        Vec3::new(rgb[0] as f64, rgb[1] as f64, rgb[2] as f64) / 255.0
    }

    fn normalised(self) -> Color {
        Vec3::new(
            Interval::UNIT.clamp(self.x),
            Interval::UNIT.clamp(self.y),
            Interval::UNIT.clamp(self.z),
        )
    }

    fn to_rgb8(self) -> [u8; 3] {
        let c = self.normalised() * 255.0;
        [c.x.floor() as u8, c.y.floor() as u8, c.z.floor() as u8]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalised_clamps_each_channel() {
        let c = Color::new(1.7, -0.2, 0.5).normalised();
        assert_eq!(c, Color::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn test_to_rgb8_floors() {
        assert_eq!(Color::new(1.0, 0.0, 0.5).to_rgb8(), [255, 0, 127]);
        assert_eq!(Color::new(3.0, -1.0, 0.999).to_rgb8(), [255, 0, 254]);
    }

    #[test]
    fn test_background_roundtrips_through_rgb8() {
        // 168/255 * 255 can land a hair under 168, so allow one step.
        let rgb = BACKGROUND.to_rgb8();
        for (got, want) in rgb.iter().zip([168u8, 204, 224]) {
            assert!((want as i32 - *got as i32).abs() <= 1);
        }
        assert_eq!(Color::from_rgb8([168, 204, 224]), BACKGROUND);
    }

    #[test]
    fn test_channel_algebra() {
        let light = Color::new(1.0, 0.5, 0.25);
        let surface = Color::new(0.5, 0.5, 1.0);

        assert_eq!(light * surface, Color::new(0.5, 0.25, 0.25));
        assert_eq!(light + surface, Color::new(1.5, 1.0, 1.25));
        assert_eq!(light * 2.0, Color::new(2.0, 1.0, 0.5));
    }
}
