//! Face locator contract.
//!
//! Face detection itself lives outside this crate. A locator reports the
//! center of the most prominent face as percentages of the image size, or
//! `None` when nothing was found. Errors are treated the same as "not found"
//! by the editor.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FaceLocatorError {
    #[error("Face detection failed: {0}")]
    Failed(String),
}

/// Face center in percent (0–100) of image width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacePosition {
    pub x: f64,
    pub y: f64,
}

impl FacePosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn as_tuple(self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Both axes pulled into 0–100.
    pub fn clamped(self) -> Self {
        Self::new(self.x.clamp(0.0, 100.0), self.y.clamp(0.0, 100.0))
    }

    /// Parse `"X,Y"` percentages, e.g. `"48,35"`.
    pub fn parse(value: &str) -> Result<Self, String> {
        let (x, y) = value
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y percentages, got '{value}'"))?;
        let parse_axis = |axis: &str| -> Result<f64, String> {
            let v: f64 = axis
                .trim()
                .parse()
                .map_err(|_| format!("'{}' is not a number", axis.trim()))?;
            if (0.0..=100.0).contains(&v) {
                Ok(v)
            } else {
                Err(format!("{v} is outside 0-100"))
            }
        };
        Ok(Self::new(parse_axis(x)?, parse_axis(y)?))
    }
}

/// Best-effort face detector.
pub trait FaceLocator: Send + Sync {
    fn locate(&self, image: &DynamicImage) -> Result<Option<FacePosition>, FaceLocatorError>;
}

/// Always reports the same position. Used when the position is already known
/// (e.g. stored from an earlier detection or passed on the command line).
#[derive(Debug, Clone, Copy)]
pub struct FixedFaceLocator(pub FacePosition);

impl FaceLocator for FixedFaceLocator {
    fn locate(&self, _image: &DynamicImage) -> Result<Option<FacePosition>, FaceLocatorError> {
        Ok(Some(self.0))
    }
}

/// Never finds a face.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaceLocator;

impl FaceLocator for NoFaceLocator {
    fn locate(&self, _image: &DynamicImage) -> Result<Option<FacePosition>, FaceLocatorError> {
        Ok(None)
    }
}
