//! Configuration structures for the overlay detection pipeline.
//!
//! This module defines all tunable parameters for calibration, per-frame
//! detection, and timeline sampling, organized into logical groups.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use overlay_scan::ScanConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = ScanConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = ScanConfig::default();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`CalibrationConfig`]: body-color strategy, tolerances, color roles
//! - [`DetectionConfig`]: spatial-filter policy and content-verification floor
//! - [`SamplingConfig`]: timeline step and processing resolution

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::color::HsvTolerance;
use crate::constants::{calibration, detection, sampling};

/// Complete configuration for one scan session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Profile-building configuration
    pub calibration: CalibrationConfig,

    /// Per-frame detection configuration
    pub detection: DetectionConfig,

    /// Timeline sampling configuration
    pub sampling: SamplingConfig,
}

/// RGB color representation for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<RgbColor> for Rgb<u8> {
    fn from(color: RgbColor) -> Self {
        Rgb([color.r, color.g, color.b])
    }
}

/// How the body (background) color range is obtained during calibration.
///
/// The two strategies are alternatives, never mixed within one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalibrationStrategy {
    /// Sample the dominant chromatic color from a central region of
    /// interest of the reference image (the product default)
    DominantColor,

    /// Use a fixed, pre-known target color
    FixedTarget { color: RgbColor },
}

/// Where a secondary (content-verification) color role gets its range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoleSource {
    /// Fixed target color expanded by the calibration tolerance
    Fixed { color: RgbColor },

    /// Low-saturation / high-value range, any hue
    White,
}

/// A named secondary color role checked inside candidate regions
/// (the "triad" content check).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRole {
    pub name: String,
    pub source: RoleSource,
}

/// Profile-building parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Body-color strategy
    pub strategy: CalibrationStrategy,

    /// Central ROI side fraction for dominant-color sampling (0.0-1.0)
    pub roi_fraction: f64,

    /// Symmetric tolerance applied around sampled/target colors
    pub tolerance: HsvTolerance,

    /// Minimum connected-component area (px²) for a valid body region
    pub min_region_area: u64,

    /// Secondary color roles verified inside candidate regions
    pub roles: Vec<ColorRole>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            strategy: CalibrationStrategy::DominantColor,
            roi_fraction: calibration::ROI_FRACTION,
            tolerance: HsvTolerance::default(),
            min_region_area: calibration::MIN_REGION_AREA,
            roles: vec![ColorRole {
                name: "text".to_string(),
                source: RoleSource::White,
            }],
        }
    }
}

/// Spatial filter policy applied to candidate regions.
///
/// Both boundaries are inclusive: a candidate exactly at `min_iou` or
/// exactly at `max_delta` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SpatialFilter {
    /// Require Intersection-over-Union with the projected template
    Overlap { min_iou: f32 },

    /// Require each of x, y, width, height of the normalized candidate to
    /// stay within `max_delta` of the template's value
    Deviation { max_delta: f32 },
}

impl Default for SpatialFilter {
    fn default() -> Self {
        SpatialFilter::Overlap {
            min_iou: detection::MIN_IOU,
        }
    }
}

/// Per-frame detection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Spatial filter policy (overlap is the product default; deviation is
    /// the alternative)
    pub spatial: SpatialFilter,

    /// Content verification: every role's pixel fraction inside a candidate
    /// must be strictly greater than this floor
    pub density_floor: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            spatial: SpatialFilter::default(),
            density_floor: detection::DENSITY_FLOOR,
        }
    }
}

/// Timeline sampling parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Fixed time step between sampled frames, in seconds
    pub step_secs: f64,

    /// Frames wider than this are downscaled (aspect preserved) before
    /// evaluation
    pub processing_width: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            step_secs: sampling::STEP_SECS,
            processing_width: sampling::PROCESSING_WIDTH,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            calibration: CalibrationConfig::default(),
            detection: DetectionConfig::default(),
            sampling: SamplingConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy_is_dominant_color() {
        let config = ScanConfig::default();
        assert_eq!(
            config.calibration.strategy,
            CalibrationStrategy::DominantColor
        );
        assert_eq!(config.calibration.roles.len(), 1);
        assert_eq!(config.calibration.roles[0].name, "text");
    }

    #[test]
    fn test_default_spatial_policy_is_overlap() {
        match DetectionConfig::default().spatial {
            SpatialFilter::Overlap { min_iou } => assert!((min_iou - 0.3).abs() < f32::EPSILON),
            SpatialFilter::Deviation { .. } => panic!("default policy should be overlap"),
        }
    }

    #[test]
    fn test_json_round_trip_preserves_tagged_enums() {
        let mut config = ScanConfig::default();
        config.calibration.strategy = CalibrationStrategy::FixedTarget {
            color: RgbColor { r: 30, g: 60, b: 120 },
        };
        config.detection.spatial = SpatialFilter::Deviation { max_delta: 0.15 };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("fixed_target"));
        assert!(json.contains("deviation"));

        let parsed: ScanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.calibration.strategy, config.calibration.strategy);
        assert_eq!(parsed.detection.spatial, config.detection.spatial);
    }

    #[test]
    fn test_rgb_color_converts_to_image_pixel() {
        let pixel: Rgb<u8> = RgbColor { r: 1, g: 2, b: 3 }.into();
        assert_eq!(pixel, Rgb([1, 2, 3]));
    }
}
