//! Shared test utilities: synthetic images and fixture files.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("me.jpg");
//! create_test_jpeg(&path, 640, 480);
//!
//! let image = quadrant_image(200);
//! assert_eq!(pixel(&image, 10, 10), RED);
//! ```

use image::{DynamicImage, ImageEncoder, RgbImage};
use std::path::Path;

pub const RED: [u8; 3] = [255, 0, 0];
pub const GREEN: [u8; 3] = [0, 255, 0];
pub const BLUE: [u8; 3] = [0, 0, 255];
pub const WHITE: [u8; 3] = [255, 255, 255];

// =========================================================================
// Synthetic images
// =========================================================================

/// Square image split into four colored quadrants:
/// red top-left, green top-right, blue bottom-left, white bottom-right.
pub fn quadrant_image(size: u32) -> DynamicImage {
    let half = size / 2;
    let img = RgbImage::from_fn(size, size, |x, y| {
        image::Rgb(match (x < half, y < half) {
            (true, true) => RED,
            (false, true) => GREEN,
            (true, false) => BLUE,
            (false, false) => WHITE,
        })
    });
    DynamicImage::ImageRgb8(img)
}

/// Deterministic pseudo-random noise. Compresses poorly, so encoded size
/// tracks the encoder quality.
pub fn noise_image(width: u32, height: u32) -> DynamicImage {
    let mut state: u32 = 0x9E37_79B9;
    let img = RgbImage::from_fn(width, height, |_, _| {
        let mut channel = || {
            // xorshift32
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        };
        image::Rgb([channel(), channel(), channel()])
    });
    DynamicImage::ImageRgb8(img)
}

/// RGB value at a pixel.
pub fn pixel(image: &DynamicImage, x: u32, y: u32) -> [u8; 3] {
    image.to_rgb8().get_pixel(x, y).0
}

// =========================================================================
// Files on disk
// =========================================================================

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a PNG of the given image.
pub fn create_test_png(path: &Path, image: &DynamicImage) {
    image.save_with_format(path, image::ImageFormat::Png).unwrap();
}
