//! CLI output formatting for all commands.
//!
//! Output leads with what was produced (dimensions, size, quality), with file
//! paths and crop geometry as indented context lines.
//!
//! # Output Format
//!
//! ## Inspect
//!
//! ```text
//! portrait.jpg (4000x3000)
//!     Viewport: 320px
//!     Cover scale: 0.1067 (max zoom 3)
//!     Pan range: ±53.3px x ±0.0px
//!     Initial crop: x=500.0 y=0.0 size=3000.0
//! ```
//!
//! ## Crop
//!
//! ```text
//! 512x512 jpg, 143 KB (q85) → portrait-crop.jpg
//!     Source: portrait.jpg
//!     Crop: x=812.4 y=240.0 size=2210.5
//!     Session: 4 steps, 37 events, 5 renders
//! ```
//!
//! ## Photo (batch)
//!
//! ```text
//! 512x512, 143 KB (q76) → out/jane.jpg
//!     Source: team/jane.png
//! FAILED team/broken.jpg
//!     Failed to decode team/broken.jpg: ...
//!
//! Optimized 1 photo, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::editor::CropTransform;
use crate::imaging::{EncodedImage, SourceRect};
use crate::session::ReplayReport;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn rect_line(rect: SourceRect) -> String {
    format!("x={:.1} y={:.1} size={:.1}", rect.x, rect.y, rect.size)
}

/// `512x512 jpg, 143 KB (q85)`. PNG carries no quality.
fn encoded_summary(encoded: &EncodedImage) -> String {
    let quality = if encoded.format.is_lossy() {
        format!(" (q{})", encoded.quality.value())
    } else {
        String::new()
    };
    format!(
        "{}x{} {}, {} KB{}",
        encoded.width,
        encoded.height,
        encoded.format.extension(),
        encoded.size_kb(),
        quality
    )
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// inspect
// ============================================================================

/// Geometry of a fresh editor on this source.
pub fn format_inspect(source: &Path, transform: &CropTransform) -> Vec<String> {
    let dims = transform.source();
    let limits = transform.pan_limits();
    vec![
        format!("{} ({}x{})", source.display(), dims.width, dims.height),
        format!("{}Viewport: {}px", indent(1), transform.viewport()),
        format!(
            "{}Cover scale: {:.4} (max zoom {})",
            indent(1),
            transform.min_scale(),
            transform.max_zoom()
        ),
        format!(
            "{}Pan range: \u{b1}{:.1}px x \u{b1}{:.1}px",
            indent(1),
            limits.x,
            limits.y
        ),
        format!("{}Initial crop: {}", indent(1), rect_line(transform.source_rect())),
    ]
}

pub fn print_inspect(source: &Path, transform: &CropTransform) {
    for line in format_inspect(source, transform) {
        println!("{}", line);
    }
}

// ============================================================================
// crop / logo
// ============================================================================

/// Result of a saved crop, optionally with the replayed session.
pub fn format_crop_result(
    source: &Path,
    output: &Path,
    encoded: &EncodedImage,
    rect: SourceRect,
    report: Option<&ReplayReport>,
) -> Vec<String> {
    let mut lines = vec![
        format!("{} \u{2192} {}", encoded_summary(encoded), output.display()),
        format!("{}Source: {}", indent(1), source.display()),
        format!("{}Crop: {}", indent(1), rect_line(rect)),
    ];
    if let Some(report) = report {
        lines.push(format!(
            "{}Session: {}, {}, {}",
            indent(1),
            plural(report.steps, "step"),
            plural(report.events, "event"),
            plural(report.frames_rendered, "render")
        ));
    }
    lines
}

pub fn print_crop_result(
    source: &Path,
    output: &Path,
    encoded: &EncodedImage,
    rect: SourceRect,
    report: Option<&ReplayReport>,
) {
    for line in format_crop_result(source, output, encoded, rect, report) {
        println!("{}", line);
    }
}

pub fn format_logo_result(source: &Path, output: &Path, encoded: &EncodedImage) -> Vec<String> {
    vec![
        format!("{} \u{2192} {}", encoded_summary(encoded), output.display()),
        format!("{}Source: {}", indent(1), source.display()),
    ]
}

pub fn print_logo_result(source: &Path, output: &Path, encoded: &EncodedImage) {
    for line in format_logo_result(source, output, encoded) {
        println!("{}", line);
    }
}

// ============================================================================
// photo (batch)
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Optimized {
            source,
            output,
            width,
            height,
            size_kb,
            quality,
        } => vec![
            format!(
                "{}x{}, {} KB (q{}) \u{2192} {}",
                width,
                height,
                size_kb,
                quality,
                output.display()
            ),
            format!("{}Source: {}", indent(1), source.display()),
        ],
        BatchEvent::Failed { source, error } => vec![
            format!("FAILED {}", source.display()),
            format!("{}{}", indent(1), error),
        ],
    }
}

pub fn format_batch_summary(summary: &BatchSummary) -> String {
    let optimized = format!("Optimized {}", plural(summary.optimized, "photo"));
    if summary.failed == 0 {
        optimized
    } else {
        format!("{}, {} failed", optimized, summary.failed)
    }
}

// ============================================================================
// Tests
// ============================================================================
