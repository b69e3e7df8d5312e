//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Crop | `DynamicImage::crop_imm` on the pixel-rounded source square |
//! | Resample | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (RGB, quality) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (lossless) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{CropParams, EncodeParams, OutputFormat, ResizeParams};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
///
/// AVIF is absent on purpose: the `image` crate's `"avif"` feature only
/// enables the encoder.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has one of the [supported extensions](supported_input_extensions).
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode into an in-memory buffer.
fn encode_image(image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let quality = params.quality.value() as u8;
    let result = match params.format {
        // The JPEG encoder rejects alpha channels.
        OutputFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality),
        ),
        OutputFormat::Avif => image.write_with_encoder(
            image::codecs::avif::AvifEncoder::new_with_speed_quality(&mut buf, 6, quality),
        ),
        OutputFormat::Png => {
            image.write_with_encoder(image::codecs::png::PngEncoder::new(&mut buf))
        }
    };
    result.map_err(|e| {
        BackendError::Encode(format!("{} encode failed: {}", params.format.extension(), e))
    })?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    fn crop(
        &self,
        image: &DynamicImage,
        params: &CropParams,
    ) -> Result<DynamicImage, BackendError> {
        if params.output_size == 0 {
            return Err(BackendError::ProcessingFailed(
                "Crop output size must be non-zero".into(),
            ));
        }
        let (x, y, size) = params.rect.to_pixels(Dimensions::of(image).as_tuple());
        let square = image.crop_imm(x, y, size, size);
        Ok(square.resize_exact(params.output_size, params.output_size, FilterType::Lanczos3))
    }

    fn resize(
        &self,
        image: &DynamicImage,
        params: &ResizeParams,
    ) -> Result<DynamicImage, BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Invalid resize target {}x{}",
                params.width, params.height
            )));
        }
        Ok(image.resize_exact(params.width, params.height, FilterType::Lanczos3))
    }

    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        encode_image(image, params)
    }
}
