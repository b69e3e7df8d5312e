//! Crop transform state.
//!
//! [`CropTransform`] is the single source of truth for scale and pan while a
//! photo is being edited. Every mutating method leaves it normalized:
//!
//! 1. `min_scale <= scale <= max_zoom` (coverage wins if they conflict),
//! 2. the offset lies inside the pan limits for the current scale, so the
//!    scaled image covers the whole viewport,
//! 3. `min_scale` is recomputed from the current viewport and source before
//!    it is used as a bound.

use crate::imaging::{
    BackendError, Dimensions, ImageBackend, Offset, SourceRect, clamp_offset, clamp_scale,
    compute_min_scale, face_offset, pan_limits, visible_source_rect,
};
use std::path::Path;

/// Default scale ceiling (absolute, not relative to cover scale).
pub const MAX_ZOOM: f64 = 3.0;

/// Scale and pan of one editing session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropTransform {
    scale: f64,
    min_scale: f64,
    offset: Offset,
    source: Dimensions,
    viewport: f64,
    max_zoom: f64,
}

impl CropTransform {
    /// Fresh transform at cover scale with no pan.
    ///
    /// Returns `None` while the viewport has no usable size.
    pub fn new(source: Dimensions, viewport: f64, max_zoom: f64) -> Option<Self> {
        if !viewport_ready(viewport) {
            return None;
        }
        let min_scale = compute_min_scale(viewport, source.as_tuple());
        Some(Self {
            scale: min_scale,
            min_scale,
            offset: Offset::ZERO,
            source,
            viewport,
            max_zoom,
        })
    }

    /// Fresh transform for an image on disk, reading only its header.
    pub fn from_file(
        backend: &impl ImageBackend,
        path: &Path,
        viewport: f64,
        max_zoom: f64,
    ) -> Result<Option<Self>, BackendError> {
        let source = backend.identify(path)?;
        Ok(Self::new(source, viewport, max_zoom))
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn source(&self) -> Dimensions {
        self.source
    }

    pub fn viewport(&self) -> f64 {
        self.viewport
    }

    /// Current symmetric pan limits.
    pub fn pan_limits(&self) -> Offset {
        pan_limits(self.viewport, self.source.as_tuple(), self.scale)
    }

    /// Back to cover scale, centered.
    pub fn reset(&mut self) {
        self.min_scale = compute_min_scale(self.viewport, self.source.as_tuple());
        self.scale = self.min_scale;
        self.offset = Offset::ZERO;
    }

    /// Move the image by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset.x += dx;
        self.offset.y += dy;
        self.clamp_offset();
    }

    /// Multiply the scale by `factor`, clamped to the zoom bounds.
    ///
    /// The offset is not re-anchored; it is only clamped to the new limits.
    pub fn zoom_by(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.scale = clamp_scale(self.scale * factor, self.min_scale, self.max_zoom);
        self.clamp_offset();
    }

    /// Follow a viewport resize. Ignored while the new size is unusable.
    pub fn set_viewport(&mut self, viewport: f64) {
        if !viewport_ready(viewport) {
            return;
        }
        self.viewport = viewport;
        self.min_scale = compute_min_scale(viewport, self.source.as_tuple());
        self.scale = clamp_scale(self.scale, self.min_scale, self.max_zoom);
        self.clamp_offset();
    }

    /// Zoom to `min_scale * bias` and put the point at `percent` (0–100 of
    /// width/height) in the middle of the viewport, as far as the pan limits
    /// allow.
    pub fn center_on(&mut self, percent: (f64, f64), bias: f64) {
        self.min_scale = compute_min_scale(self.viewport, self.source.as_tuple());
        self.scale = clamp_scale(self.min_scale * bias, self.min_scale, self.max_zoom);
        self.offset = face_offset(percent, self.source.as_tuple(), self.scale);
        self.clamp_offset();
    }

    /// Pull the offset back inside the pan limits for the current scale.
    pub fn clamp_offset(&mut self) {
        self.offset = clamp_offset(self.offset, self.pan_limits());
    }

    /// Region of the source currently visible, in source pixels.
    pub fn source_rect(&self) -> SourceRect {
        visible_source_rect(
            self.source.as_tuple(),
            self.viewport,
            self.scale,
            self.offset,
        )
    }

    /// Clamp, then describe the transform to apply to the preview surface.
    pub fn preview(&mut self) -> PreviewTransform {
        self.clamp_offset();
        PreviewTransform {
            translate_x: self.offset.x,
            translate_y: self.offset.y,
            scale: self.scale,
        }
    }
}

fn viewport_ready(viewport: f64) -> bool {
    viewport.is_finite() && viewport > 0.0
}

/// Transform for the preview element: centered on the viewport midpoint,
/// translated by the offset, then scaled around its own center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl PreviewTransform {
    /// CSS `transform` value for an element with `transform-origin: center`.
    pub fn to_css(&self) -> String {
        format!(
            "translate(-50%, -50%) translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}
