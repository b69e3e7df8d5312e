//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Crop → square** | `crop_imm` + `resize_exact` (Lanczos3) |
//! | **Encode** | JPEG / AVIF (rav1e) / PNG encoders from `image` |
//! | **Target size** | quality binary search over the JPEG encoder |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    Offset, SourceRect, calculate_fit_dimensions, clamp_offset, clamp_scale, compute_min_scale,
    face_centered_square, face_offset, pan_limits, visible_source_rect,
};
pub use operations::{
    EncodedImage, OptimizeSettings, OutputSettings, TargetSize, compress_to_target_size,
    optimize_cropped_image, optimize_logo, optimize_profile_photo, rasterize_crop,
};
pub use params::{CropParams, EncodeParams, OutputFormat, Quality, ResizeParams};
pub use rust_backend::{RustBackend, is_supported_input, supported_input_extensions};
