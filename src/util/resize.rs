//! Retina detection and downscaling for captured PNGs
//!
//! macOS records the capture density in the PNG `pHYs` chunk: 72 dpi for a
//! standard display, 144 dpi for a 2x retina display. A capture at or above
//! the retina threshold is scaled by `72 / dpi` so the uploaded image has the
//! apparent on-screen size.

use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    capture::ImageBuffer,
    error::{SnapError, SnapResult},
};

/// Density of a non-retina capture
pub const STANDARD_DPI: f64 = 72.0;

const METERS_PER_INCH: f64 = 0.0254;

/// `pHYs` value declaring `dpi` on both axes
pub fn pixel_dims_for(dpi: f64) -> png::PixelDimensions {
    let ppm = (dpi / METERS_PER_INCH).round() as u32;
    png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }
}

/// Reads the horizontal density (dpi) from a PNG's `pHYs` chunk
///
/// The value is rounded to whole dots per inch, since pixels per meter do not
/// map exactly (144 dpi is stored as 5669).
///
/// Returns `None` for data that does not decode as PNG, a missing `pHYs`
/// chunk, or an aspect-ratio-only unit.
///
/// # Examples
///
/// ```
/// use snapup::{capture::ImageBuffer, util::resize::png_density};
///
/// let image = ImageBuffer::from_test_pattern(4, 4);
/// assert_eq!(png_density(&image.encode_png(None).unwrap()), None);
/// assert_eq!(png_density(&image.encode_png(Some(144.0)).unwrap()), Some(144.0));
/// ```
pub fn png_density(bytes: &[u8]) -> Option<f64> {
    let reader = png::Decoder::new(Cursor::new(bytes)).read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    match dims.unit {
        png::Unit::Meter => Some((dims.xppu as f64 * METERS_PER_INCH).round()),
        png::Unit::Unspecified => None,
    }
}

/// Returns the scale factor for a density, or `None` if no resize is needed
pub fn retina_scale_factor(dpi: Option<f64>, threshold_dpi: f64) -> Option<f32> {
    match dpi {
        Some(dpi) if dpi >= threshold_dpi && dpi > STANDARD_DPI => {
            Some((STANDARD_DPI / dpi) as f32)
        }
        _ => None,
    }
}

/// Downscales the image at `path` in place if it is a retina capture
///
/// Returns whether the file was rewritten. Work happens on the blocking
/// thread pool.
pub async fn resize_if_retina(path: &Path, threshold_dpi: f64) -> SnapResult<bool> {
    let owned: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || resize_if_retina_blocking(&owned, threshold_dpi))
        .await
        .map_err(|e| SnapError::ImageError {
            path:   path.to_path_buf(),
            reason: format!("resize task failed: {}", e),
        })?
}

/// Synchronous body of [`resize_if_retina`]
pub fn resize_if_retina_blocking(path: &Path, threshold_dpi: f64) -> SnapResult<bool> {
    let bytes = std::fs::read(path)?;
    let dpi = png_density(&bytes);

    let Some(factor) = retina_scale_factor(dpi, threshold_dpi) else {
        debug!("No retina resize for {:?} (density {:?})", path, dpi);
        return Ok(false);
    };

    let image = ImageBuffer::open(path)?;
    let (width, height) = image.dimensions();
    let scaled = image.scale(factor);
    scaled.save_png(path, Some(STANDARD_DPI))?;

    let (new_width, new_height) = scaled.dimensions();
    info!(
        "Resized retina capture {:?} from {}x{} to {}x{}",
        path, width, height, new_width, new_height
    );
    Ok(true)
}
