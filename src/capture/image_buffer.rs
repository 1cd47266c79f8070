//! Image buffer wrapper for captured screenshots
//!
//! Wraps `image::DynamicImage` with the handful of operations the resize
//! step needs: loading from disk, scaling, and writing back as PNG with an
//! optional `pHYs` density.
//!
//! # Examples
//!
//! ```
//! use snapup::capture::ImageBuffer;
//!
//! let img = ImageBuffer::from_test_pattern(1920, 1080);
//! let scaled = img.scale(0.5);
//! assert_eq!(scaled.dimensions(), (960, 540));
//! ```

use std::path::Path;

use image::GenericImageView;

use crate::{
    error::{SnapError, SnapResult},
    util::resize::pixel_dims_for,
};

/// Wrapper around `image::DynamicImage`
///
/// Transformations return new buffers and leave the original unchanged.
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    inner: image::DynamicImage,
}

impl ImageBuffer {
    /// Creates a new ImageBuffer from a DynamicImage
    pub fn new(image: image::DynamicImage) -> Self {
        Self { inner: image }
    }

    /// Decodes the image stored at `path`
    pub fn open(path: &Path) -> SnapResult<Self> {
        let inner = image::open(path).map_err(|e| SnapError::ImageError {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(inner))
    }

    /// Scales the image by the given factor using Lanczos3 filtering
    ///
    /// The factor is clamped to 0.1..=2.0. Dimensions never drop below 1x1.
    pub fn scale(&self, factor: f32) -> Self {
        let factor = factor.clamp(0.1, 2.0);

        let (width, height) = self.dimensions();
        let new_width = ((width as f32) * factor).round() as u32;
        let new_height = ((height as f32) * factor).round() as u32;

        if new_width == width && new_height == height {
            return self.clone();
        }

        let new_width = new_width.max(1);
        let new_height = new_height.max(1);

        let scaled =
            self.inner
                .resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3);

        Self::new(scaled)
    }

    /// Encodes the image as 8-bit RGBA PNG, declaring `dpi` when given
    pub fn encode_png(&self, dpi: Option<f64>) -> Result<Vec<u8>, png::EncodingError> {
        let rgba = self.inner.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut output = Vec::new();
        let mut encoder = png::Encoder::new(&mut output, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(dpi.map(pixel_dims_for));

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba.as_raw())?;
        writer.finish()?;
        Ok(output)
    }

    /// Overwrites `path` with the PNG encoding of this image
    pub fn save_png(&self, path: &Path, dpi: Option<f64>) -> SnapResult<()> {
        let bytes = self.encode_png(dpi).map_err(|e| SnapError::ImageError {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Returns the dimensions of the image as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Creates a gradient test pattern image
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        let img = image::RgbaImage::from_fn(width, height, |x, y| {
            let r = ((x as f32 / width.max(1) as f32) * 255.0) as u8;
            let g = ((y as f32 / height.max(1) as f32) * 255.0) as u8;
            image::Rgba([r, g, 128, 255])
        });
        Self::new(image::DynamicImage::ImageRgba8(img))
    }
}
