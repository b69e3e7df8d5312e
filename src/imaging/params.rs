//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what to crop, resample and encode) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 85). Clamped on construction.
//! - [`OutputFormat`] — Encoded output container: JPEG, AVIF or PNG.
//! - [`CropParams`] — Source rectangle to cut out and the square size to resample it to.
//! - [`ResizeParams`] — Exact output dimensions for a plain resample.
//! - [`EncodeParams`] — Format + quality for the final encode.

use serde::{Deserialize, Serialize};

use super::calculations::SourceRect;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Encoded output format.
///
/// JPEG is the default: link-preview crawlers (messengers, social networks)
/// do not reliably render AVIF or WebP avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Avif,
    /// Lossless; quality is ignored.
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Avif => "avif",
            OutputFormat::Png => "png",
        }
    }

    pub fn is_lossy(self) -> bool {
        !matches!(self, OutputFormat::Png)
    }

    /// Format implied by a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "avif" => Some(OutputFormat::Avif),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

/// Cut `rect` out of the source and resample it to `output_size` × `output_size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropParams {
    pub rect: SourceRect,
    pub output_size: u32,
}

/// Resample to exactly `width` × `height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
}

/// Parameters for the final encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: OutputFormat,
    pub quality: Quality,
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: Quality::default(),
        }
    }
}
