//! Pure geometry for the crop editor and the photo optimizer.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Coordinate conventions:
//! - Source dimensions are `(width, height)` in natural source pixels.
//! - The viewport is a square of side `viewport` screen pixels.
//! - An [`Offset`] is the translation of the scaled image's center away from
//!   the viewport center, in *scaled* pixels.

/// Translation in scaled-pixel units. Also used for symmetric pan limits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A square region of the source image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl SourceRect {
    /// Round to whole pixels, keeping the square inside `source`.
    ///
    /// Returns `(x, y, size)` with `size >= 1`.
    pub fn to_pixels(self, source: (u32, u32)) -> (u32, u32, u32) {
        let (w, h) = (source.0.max(1), source.1.max(1));
        let size = (self.size.round().max(1.0) as u32).min(w).min(h);
        let x = (self.x.round().max(0.0) as u32).min(w - size);
        let y = (self.y.round().max(0.0) as u32).min(h - size);
        (x, y, size)
    }
}

/// Natural size of one axis; a zero-sized axis counts as one pixel.
fn side(value: u32) -> f64 {
    value.max(1) as f64
}

/// Smallest scale at which the source still covers the square viewport.
///
/// The axis that is smaller relative to the viewport fills it exactly; the
/// other one overflows.
///
/// # Examples
/// ```
/// # use cardcrop::imaging::compute_min_scale;
/// // 1000x500 in a 300px viewport: the 500px height has to reach 300px
/// assert_eq!(compute_min_scale(300.0, (1000, 500)), 0.6);
/// ```
pub fn compute_min_scale(viewport: f64, source: (u32, u32)) -> f64 {
    (viewport / side(source.0)).max(viewport / side(source.1))
}

/// Clamp a scale into `[min_scale, max_zoom]`.
///
/// When `min_scale` exceeds `max_zoom` (a tiny source in a large viewport)
/// coverage wins and the result is `min_scale`.
pub fn clamp_scale(scale: f64, min_scale: f64, max_zoom: f64) -> f64 {
    scale.min(max_zoom).max(min_scale)
}

/// How far the image may be panned on each axis at `scale`.
///
/// Half of the amount by which the scaled image exceeds the viewport,
/// floored at zero.
pub fn pan_limits(viewport: f64, source: (u32, u32), scale: f64) -> Offset {
    let excess_x = (side(source.0) * scale - viewport).max(0.0);
    let excess_y = (side(source.1) * scale - viewport).max(0.0);
    Offset::new(excess_x / 2.0, excess_y / 2.0)
}

/// Clamp `offset` into `[-limits, +limits]` per axis.
pub fn clamp_offset(offset: Offset, limits: Offset) -> Offset {
    Offset::new(
        offset.x.clamp(-limits.x, limits.x),
        offset.y.clamp(-limits.y, limits.y),
    )
}

/// Offset that puts a point given in percent of the source (0–100) at the
/// viewport center. The result is not clamped.
pub fn face_offset(face_percent: (f64, f64), source: (u32, u32), scale: f64) -> Offset {
    let scaled_w = side(source.0) * scale;
    let scaled_h = side(source.1) * scale;
    Offset::new(
        scaled_w / 2.0 - face_percent.0 / 100.0 * scaled_w,
        scaled_h / 2.0 - face_percent.1 / 100.0 * scaled_h,
    )
}

/// The region of the source visible through the viewport.
///
/// Computed in scaled space, then divided back by `scale`. A clamped
/// transform always yields a rectangle inside the source; the final clamp
/// only absorbs floating-point overshoot.
pub fn visible_source_rect(
    source: (u32, u32),
    viewport: f64,
    scale: f64,
    offset: Offset,
) -> SourceRect {
    let (w, h) = (side(source.0), side(source.1));
    let visible_left = (w * scale - viewport) / 2.0 - offset.x;
    let visible_top = (h * scale - viewport) / 2.0 - offset.y;

    let size = (viewport / scale).min(w).min(h);
    SourceRect {
        x: (visible_left / scale).clamp(0.0, w - size),
        y: (visible_top / scale).clamp(0.0, h - size),
        size,
    }
}

/// Largest square of the source, centered on `face` (percent) when given,
/// otherwise on the image center. Always inside the source.
pub fn face_centered_square(source: (u32, u32), face: Option<(f64, f64)>) -> SourceRect {
    let (w, h) = (side(source.0), side(source.1));
    let size = w.min(h);

    let (x, y) = match face {
        Some((fx, fy)) => (
            (fx / 100.0 * w - size / 2.0).clamp(0.0, w - size),
            (fy / 100.0 * h - size / 2.0).clamp(0.0, h - size),
        ),
        None => ((w - size) / 2.0, (h - size) / 2.0),
    };
    SourceRect { x, y, size }
}

/// Dimensions that fit `source` inside `max` preserving aspect ratio.
///
/// Sources already inside the box are returned unchanged (never upscales).
pub fn calculate_fit_dimensions(source: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (w, h) = source;
    if w <= max.0 && h <= max.1 {
        return (w, h);
    }
    let ratio = (max.0 as f64 / side(w)).min(max.1 as f64 / side(h));
    (
        ((w as f64 * ratio).round() as u32).max(1),
        ((h as f64 * ratio).round() as u32).max(1),
    )
}
