//! Configuration module.
//!
//! Handles loading, validating, and merging `cardcrop.toml`. A config file is
//! sparse: its values are layered on top of the stock defaults, so it only
//! needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [editor]
//! max_zoom = 3.0            # Upper zoom bound (lower bound is the cover scale)
//! wheel_zoom_in = 1.1       # Scale factor per wheel tick away from the user
//! wheel_zoom_out = 0.9      # Scale factor per wheel tick toward the user
//! face_zoom_bias = 1.2      # Zoom applied on top of the cover scale when centering a face
//! layout_retry_limit = 120  # Frames to wait for a non-zero viewport
//!
//! [output]
//! size = 512                # Side of the square editor output
//! format = "jpeg"           # jpeg | avif | png
//! quality = 85              # Lossy quality (1-100)
//!
//! [optimize]
//! target_kb = 200           # Size target for re-compression
//! min_quality = 60
//! max_quality = 92
//! search_steps = 6          # Trial encodes per image
//! logo_max = [600, 300]     # Logo bounding box
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::editor::EditorSettings;
use crate::imaging::{OptimizeSettings, OutputFormat, OutputSettings, Quality, TargetSize};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full configuration loaded from `cardcrop.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    /// Interactive editor behavior (zoom bounds, wheel steps, face bias).
    pub editor: EditorConfig,
    /// Editor output (size, format, quality).
    pub output: OutputConfig,
    /// Re-compression and logo fitting.
    pub optimize: OptimizeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl CropConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let editor = &self.editor;
        if !(editor.max_zoom >= 1.0) {
            return Err(ConfigError::Validation("editor.max_zoom must be >= 1".into()));
        }
        if !(editor.wheel_zoom_in > 1.0) {
            return Err(ConfigError::Validation(
                "editor.wheel_zoom_in must be > 1".into(),
            ));
        }
        if !(editor.wheel_zoom_out > 0.0 && editor.wheel_zoom_out < 1.0) {
            return Err(ConfigError::Validation(
                "editor.wheel_zoom_out must be between 0 and 1".into(),
            ));
        }
        if !(editor.face_zoom_bias >= 1.0) {
            return Err(ConfigError::Validation(
                "editor.face_zoom_bias must be >= 1".into(),
            ));
        }
        if self.output.size == 0 {
            return Err(ConfigError::Validation("output.size must be non-zero".into()));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        let optimize = &self.optimize;
        if !(1..=100).contains(&optimize.min_quality) || !(1..=100).contains(&optimize.max_quality)
        {
            return Err(ConfigError::Validation(
                "optimize.min_quality and optimize.max_quality must be 1-100".into(),
            ));
        }
        if optimize.min_quality > optimize.max_quality {
            return Err(ConfigError::Validation(
                "optimize.min_quality must not exceed optimize.max_quality".into(),
            ));
        }
        if optimize.search_steps == 0 || optimize.target_kb == 0 {
            return Err(ConfigError::Validation(
                "optimize.search_steps and optimize.target_kb must be non-zero".into(),
            ));
        }
        if optimize.logo_max[0] == 0 || optimize.logo_max[1] == 0 {
            return Err(ConfigError::Validation(
                "optimize.logo_max values must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            max_zoom: self.editor.max_zoom,
            wheel_zoom_in: self.editor.wheel_zoom_in,
            wheel_zoom_out: self.editor.wheel_zoom_out,
            face_zoom_bias: self.editor.face_zoom_bias,
            layout_retry_limit: self.editor.layout_retry_limit,
        }
    }

    pub fn output_settings(&self) -> OutputSettings {
        OutputSettings {
            size: self.output.size,
            format: self.output.format,
            quality: Quality::new(self.output.quality),
        }
    }

    pub fn optimize_settings(&self) -> OptimizeSettings {
        OptimizeSettings {
            target: TargetSize {
                target_kb: self.optimize.target_kb,
                min_quality: Quality::new(self.optimize.min_quality),
                max_quality: Quality::new(self.optimize.max_quality),
                search_steps: self.optimize.search_steps,
            },
            logo_max: (self.optimize.logo_max[0], self.optimize.logo_max[1]),
            photo_size: self.output.size,
        }
    }
}

/// Crop editor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub max_zoom: f64,
    pub wheel_zoom_in: f64,
    pub wheel_zoom_out: f64,
    pub face_zoom_bias: f64,
    pub layout_retry_limit: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let defaults = EditorSettings::default();
        Self {
            max_zoom: defaults.max_zoom,
            wheel_zoom_in: defaults.wheel_zoom_in,
            wheel_zoom_out: defaults.wheel_zoom_out,
            face_zoom_bias: defaults.face_zoom_bias,
            layout_retry_limit: defaults.layout_retry_limit,
        }
    }
}

/// Editor output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub size: u32,
    pub format: OutputFormat,
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let defaults = OutputSettings::default();
        Self {
            size: defaults.size,
            format: defaults.format,
            quality: defaults.quality.value(),
        }
    }
}

/// Re-compression settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeConfig {
    pub target_kb: u32,
    pub min_quality: u32,
    pub max_quality: u32,
    pub search_steps: u32,
    /// Logo bounding box as `[width, height]`.
    pub logo_max: [u32; 2],
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        let defaults = OptimizeSettings::default();
        Self {
            target_kb: defaults.target.target_kb,
            min_quality: defaults.target.min_quality.value(),
            max_quality: defaults.target.max_quality.value(),
            search_steps: defaults.target.search_steps,
            logo_max: [defaults.logo_max.0, defaults.logo_max.1],
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CropConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CropConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CropConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`.
///
/// A missing file yields the stock defaults. User values are merged on top
/// of stock defaults, unknown keys are rejected, and the result is validated.
pub fn load_config(path: &Path) -> Result<CropConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `cardcrop.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# cardcrop configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Crop editor
# ---------------------------------------------------------------------------
[editor]
# Upper zoom bound. The lower bound is always the scale at which the photo
# covers the whole square viewport.
max_zoom = 3.0

# Scale factor applied per mouse-wheel tick.
wheel_zoom_in = 1.1
wheel_zoom_out = 0.9

# Extra zoom on top of the cover scale when centering on a detected face,
# so the result reads as a portrait rather than a wide shot.
face_zoom_bias = 1.2

# How many frames the editor waits for the viewport to get a non-zero size
# before giving up.
layout_retry_limit = 120

# ---------------------------------------------------------------------------
# Editor output
# ---------------------------------------------------------------------------
[output]
# Side of the square image produced on save, in pixels.
size = 512

# Output format: "jpeg", "avif" or "png" (lossless, ignores quality).
format = "jpeg"

# Lossy quality, 1-100.
quality = 85

# ---------------------------------------------------------------------------
# Re-compression (photo and logo commands)
# ---------------------------------------------------------------------------
[optimize]
# Target size in kilobytes. Results between 70% and 100% of the target are
# accepted.
target_kb = 200

# Quality window searched by the binary search.
min_quality = 60
max_quality = 92

# Maximum trial encodes per image.
search_steps = 6

# Logos are fitted inside this box (never upscaled).
logo_max = [600, 300]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for batch commands. Omit for auto (CPU cores).
# max_processes = 4
"##
}
