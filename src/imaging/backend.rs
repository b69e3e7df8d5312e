//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the five operations every backend must
//! support: identify, decode, crop, resize and encode. Everything above it
//! (the crop editor's rasterizer, the photo optimizer) is written against the
//! trait, so tests can swap in a recording mock.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, built on the
//! `image` crate.

use super::params::{CropParams, EncodeParams, ResizeParams};
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Natural pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(image: &DynamicImage) -> Self {
        Self::new(image.width(), image.height())
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// Pixel operations take decoded images and return new ones; only
/// [`encode`](ImageBackend::encode) produces bytes.
pub trait ImageBackend: Sync {
    /// Get image dimensions without a full decode where possible.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode an image file.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Cut a square out of `image` and resample it to `output_size` square.
    fn crop(&self, image: &DynamicImage, params: &CropParams)
    -> Result<DynamicImage, BackendError>;

    /// Resample to exact dimensions.
    fn resize(
        &self,
        image: &DynamicImage,
        params: &ResizeParams,
    ) -> Result<DynamicImage, BackendError>;

    /// Encode to an in-memory blob.
    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::{OutputFormat, Quality, SourceRect};
    use std::sync::Mutex;

    /// Mock backend that records operations and fakes pixel work.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    ///
    /// `encode` returns a zero-filled blob whose length is computed by
    /// `encoded_size` from the quality, so size-targeting logic can be tested
    /// without a real encoder.
    pub struct MockBackend {
        pub identify_results: Mutex<Vec<Dimensions>>,
        pub operations: Mutex<Vec<RecordedOp>>,
        pub encoded_size: fn(u32) -> usize,
    }

    impl Default for MockBackend {
        fn default() -> Self {
            Self {
                identify_results: Mutex::new(Vec::new()),
                operations: Mutex::new(Vec::new()),
                encoded_size: |quality| quality as usize * 1024,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Decode(String),
        Crop {
            rect: SourceRect,
            output_size: u32,
        },
        Resize {
            width: u32,
            height: u32,
        },
        Encode {
            format: OutputFormat,
            quality: u32,
            width: u32,
            height: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(dims: Vec<Dimensions>) -> Self {
            Self {
                identify_results: Mutex::new(dims),
                ..Self::default()
            }
        }

        /// Encoded blob length as a function of quality.
        pub fn with_encoded_size(encoded_size: fn(u32) -> usize) -> Self {
            Self {
                encoded_size,
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn encode_qualities(&self) -> Vec<u32> {
            self.get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Encode { quality, .. } => Some(quality),
                    _ => None,
                })
                .collect()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            self.identify_results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| BackendError::ProcessingFailed("No mock dimensions".to_string()))
        }

        fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(path.to_string_lossy().to_string()));
            let dims = self.identify_results.lock().unwrap().pop().unwrap_or(Dimensions {
                width: 64,
                height: 64,
            });
            Ok(DynamicImage::new_rgb8(dims.width, dims.height))
        }

        fn crop(
            &self,
            _image: &DynamicImage,
            params: &CropParams,
        ) -> Result<DynamicImage, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Crop {
                rect: params.rect,
                output_size: params.output_size,
            });
            Ok(DynamicImage::new_rgb8(params.output_size, params.output_size))
        }

        fn resize(
            &self,
            _image: &DynamicImage,
            params: &ResizeParams,
        ) -> Result<DynamicImage, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Resize {
                width: params.width,
                height: params.height,
            });
            Ok(DynamicImage::new_rgb8(params.width, params.height))
        }

        fn encode(
            &self,
            image: &DynamicImage,
            params: &EncodeParams,
        ) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                format: params.format,
                quality: params.quality.value(),
                width: image.width(),
                height: image.height(),
            });
            Ok(vec![0; (self.encoded_size)(params.quality.value())])
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 800,
            height: 600,
        }]);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result, Dimensions::new(800, 600));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_crop_produces_output_square() {
        let backend = MockBackend::new();
        let source = DynamicImage::new_rgb8(100, 50);
        let rect = SourceRect {
            x: 25.0,
            y: 0.0,
            size: 50.0,
        };

        let out = backend
            .crop(
                &source,
                &CropParams {
                    rect,
                    output_size: 32,
                },
            )
            .unwrap();

        assert_eq!(Dimensions::of(&out), Dimensions::new(32, 32));
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Crop {
                rect,
                output_size: 32
            }]
        );
    }

    #[test]
    fn mock_encode_size_follows_quality() {
        let backend = MockBackend::with_encoded_size(|q| q as usize * 10);
        let bytes = backend
            .encode(
                &DynamicImage::new_rgb8(4, 4),
                &EncodeParams {
                    format: OutputFormat::Jpeg,
                    quality: Quality::new(70),
                },
            )
            .unwrap();
        assert_eq!(bytes.len(), 700);
        assert_eq!(backend.encode_qualities(), vec![70]);
    }

    #[test]
    fn dimensions_of_image() {
        let image = DynamicImage::new_rgb8(12, 34);
        assert_eq!(Dimensions::of(&image).as_tuple(), (12, 34));
    }
}
