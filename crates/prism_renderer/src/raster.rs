//! Output pixel buffer and PNG encoding.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};

use crate::{RenderError, RenderResult};

/// Packed 8-bit RGB pixels, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl Raster {
    /// Create a new raster filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 3]; width as usize * height as usize],
        }
    }

    /// Wrap pixels produced elsewhere, e.g. read back from the GPU.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[u8; 3]>) -> RenderResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(RenderError::PixelCount {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [[u8; 3]] {
        &mut self.pixels
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = self.index(x, y);
        self.pixels[i] = rgb;
    }

    /// One row of pixels, `row(y)[x]`.
    pub fn row(&self, y: u32) -> &[[u8; 3]] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| Rgb(self.get(x, y)))
    }

    /// Encode as PNG at `path`.
    ///
    /// The image is written to a hidden sibling file first and renamed into
    /// place, so a failure never leaves a truncated file at `path`.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        let path = path.as_ref();
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyRaster {
                width: self.width,
                height: self.height,
            });
        }

        let staging = staging_path(path);
        let result = self
            .to_rgb_image()
            .save_with_format(&staging, ImageFormat::Png)
            .map_err(RenderError::from)
            .and_then(|()| fs::rename(&staging, path).map_err(RenderError::from));

        if result.is_err() {
            // Best effort; the staging file may never have been created.
            let _ = fs::remove_file(&staging);
        } else {
            log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        }
        result
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render.png".to_string());
    path.with_file_name(format!(".{name}.{}.partial", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("prism_raster_{}_{name}", std::process::id()))
    }

    fn checker() -> Raster {
        let mut raster = Raster::new(3, 2);
        raster.set(0, 0, [255, 0, 0]);
        raster.set(2, 1, [0, 0, 255]);
        raster
    }

    #[test]
    fn test_row_major_layout() {
        let raster = checker();

        assert_eq!(raster.pixels()[0], [255, 0, 0]);
        assert_eq!(raster.pixels()[5], [0, 0, 255]);
        assert_eq!(raster.row(1)[2], [0, 0, 255]);
        assert_eq!(raster.row(0).len(), 3);
    }

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(Raster::from_pixels(2, 2, vec![[0; 3]; 4]).is_ok());
        assert!(matches!(
            Raster::from_pixels(2, 2, vec![[0; 3]; 3]),
            Err(RenderError::PixelCount { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_save_png_roundtrip() {
        let path = scratch("roundtrip.png");
        let raster = checker();
        raster.save_png(&path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(decoded.get_pixel(2, 1).0, [0, 0, 255]);
        assert!(!staging_path(&path).exists());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unwritable_destination_fails_loudly() {
        let path = scratch("missing_dir").join("out.png");

        assert!(checker().save_png(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_raster_rejected() {
        let path = scratch("empty.png");
        assert!(matches!(
            Raster::new(0, 4).save_png(&path),
            Err(RenderError::EmptyRaster { .. })
        ));
        assert!(!path.exists());
    }
}
