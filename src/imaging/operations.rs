//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take settings, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{SourceRect, calculate_fit_dimensions, face_centered_square};
use super::params::{CropParams, EncodeParams, OutputFormat, Quality, ResizeParams};
use image::DynamicImage;
use log::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Side of the square profile photo.
pub const PROFILE_PHOTO_SIZE: u32 = 512;

/// Output settings for a crop rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSettings {
    /// Side of the square output in pixels.
    pub size: u32,
    pub format: OutputFormat,
    pub quality: Quality,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            size: PROFILE_PHOTO_SIZE,
            format: OutputFormat::Jpeg,
            quality: Quality::new(85),
        }
    }
}

/// An encoded image blob with its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    /// Quality the blob was encoded at (irrelevant for PNG).
    pub quality: Quality,
}

impl EncodedImage {
    /// Size rounded to whole kilobytes.
    pub fn size_kb(&self) -> u64 {
        (self.bytes.len() as f64 / 1024.0).round() as u64
    }
}

/// Cut `rect` out of `image`, resample it to the output square and encode.
pub fn rasterize_crop(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    rect: SourceRect,
    output: &OutputSettings,
) -> Result<EncodedImage> {
    let cropped = backend.crop(
        image,
        &CropParams {
            rect,
            output_size: output.size,
        },
    )?;
    let bytes = backend.encode(
        &cropped,
        &EncodeParams {
            format: output.format,
            quality: output.quality,
        },
    )?;
    Ok(EncodedImage {
        bytes,
        format: output.format,
        width: output.size,
        height: output.size,
        quality: output.quality,
    })
}

/// Byte-size target for lossy re-compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub target_kb: u32,
    pub min_quality: Quality,
    pub max_quality: Quality,
    /// Maximum number of trial encodes.
    pub search_steps: u32,
}

impl Default for TargetSize {
    fn default() -> Self {
        Self {
            target_kb: 200,
            min_quality: Quality::new(60),
            max_quality: Quality::new(92),
            search_steps: 6,
        }
    }
}

/// Encode as JPEG, binary-searching the quality toward the target size.
///
/// Each step encodes at the midpoint of the current quality window. Too big
/// lowers the ceiling, under 70% of the target raises the floor, anything in
/// between is accepted. The last trial encode is returned when the steps run
/// out.
pub fn compress_to_target_size(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    target: &TargetSize,
) -> Result<EncodedImage> {
    let target_bytes = target.target_kb as f64 * 1024.0;
    let mut low = target.min_quality.value() as f64;
    let mut high = target.max_quality.value() as f64;
    let mut best = None;

    for step in 0..target.search_steps.max(1) {
        let quality = Quality::new(((low + high) / 2.0).round() as u32);
        let bytes = backend.encode(
            image,
            &EncodeParams {
                format: OutputFormat::Jpeg,
                quality,
            },
        )?;
        let size = bytes.len() as f64;
        debug!(
            "target-size step {}: quality {} → {} bytes",
            step,
            quality.value(),
            bytes.len()
        );
        best = Some(EncodedImage {
            bytes,
            format: OutputFormat::Jpeg,
            width: image.width(),
            height: image.height(),
            quality,
        });

        if size > target_bytes {
            high = quality.value() as f64;
        } else if size < target_bytes * 0.7 {
            low = quality.value() as f64;
        } else {
            break;
        }
    }

    best.ok_or_else(|| BackendError::Encode("no trial encode was produced".into()))
}

/// Settings shared by the optimize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeSettings {
    pub target: TargetSize,
    /// Bounding box for logos (width, height).
    pub logo_max: (u32, u32),
    pub photo_size: u32,
}

impl Default for OptimizeSettings {
    fn default() -> Self {
        Self {
            target: TargetSize::default(),
            logo_max: (600, 300),
            photo_size: PROFILE_PHOTO_SIZE,
        }
    }
}

/// Square profile photo without going through the editor.
///
/// Takes the largest square of the source, centered on `face` (percent of
/// width/height) when known, resamples it and compresses to the target size.
pub fn optimize_profile_photo(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    face: Option<(f64, f64)>,
    settings: &OptimizeSettings,
) -> Result<EncodedImage> {
    let rect = face_centered_square(Dimensions::of(image).as_tuple(), face);
    let square = backend.crop(
        image,
        &CropParams {
            rect,
            output_size: settings.photo_size,
        },
    )?;
    compress_to_target_size(backend, &square, &settings.target)
}

/// Re-compress an already cropped image to the target size.
pub fn optimize_cropped_image(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    settings: &OptimizeSettings,
) -> Result<EncodedImage> {
    compress_to_target_size(backend, image, &settings.target)
}

/// Fit a logo inside the logo box.
///
/// `keep_lossless` keeps PNG output for sources that may carry transparency;
/// everything else is compressed to the target size.
pub fn optimize_logo(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    keep_lossless: bool,
    settings: &OptimizeSettings,
) -> Result<EncodedImage> {
    let source = Dimensions::of(image).as_tuple();
    let (width, height) = calculate_fit_dimensions(source, settings.logo_max);
    let fitted;
    let fitted_ref = if (width, height) == source {
        image
    } else {
        fitted = backend.resize(image, &ResizeParams { width, height })?;
        &fitted
    };

    if keep_lossless {
        let quality = Quality::default();
        let bytes = backend.encode(
            fitted_ref,
            &EncodeParams {
                format: OutputFormat::Png,
                quality,
            },
        )?;
        return Ok(EncodedImage {
            bytes,
            format: OutputFormat::Png,
            width,
            height,
            quality,
        });
    }
    compress_to_target_size(backend, fitted_ref, &settings.target)
}
