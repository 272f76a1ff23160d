//! Tuning constants and reference values for overlay detection
//!
//! This module contains compile-time defaults for the calibration and
//! detection pipeline. Runtime overrides live in [`crate::config`].

/// Working color space bounds (OpenCV-style 8-bit HSV convention)
pub mod hsv_space {
    /// Maximum hue value: hue is stored as degrees / 2, so 0..=180
    pub const HUE_MAX: u8 = 180;

    /// Maximum saturation value
    pub const SAT_MAX: u8 = 255;

    /// Maximum value (brightness) value
    pub const VAL_MAX: u8 = 255;
}

/// Calibration defaults used when building a detection profile
pub mod calibration {
    /// Minimum connected-component area (px²) for a valid body region.
    /// Components below this floor are treated as noise.
    pub const MIN_REGION_AREA: u64 = 100;

    /// Side fraction of the central region of interest sampled by the
    /// dominant-color strategy (0.6 = central 60% of each dimension)
    pub const ROI_FRACTION: f64 = 0.6;

    /// Minimum saturation for a pixel to count as chromatic during
    /// dominant-color sampling
    pub const CHROMA_SAT_FLOOR: u8 = 50;

    /// Minimum value (brightness) for a pixel to count during
    /// dominant-color sampling
    pub const CHROMA_VAL_FLOOR: u8 = 40;

    /// Hue histogram bin width for dominant-color sampling
    pub const HUE_BIN_WIDTH: u8 = 5;

    /// Default symmetric hue tolerance around a sampled color
    pub const TOLERANCE_H: u8 = 10;

    /// Default symmetric saturation tolerance around a sampled color
    pub const TOLERANCE_S: u8 = 60;

    /// Default symmetric value tolerance around a sampled color
    pub const TOLERANCE_V: u8 = 60;

    /// "White" role range: maximum saturation
    pub const WHITE_SAT_MAX: u8 = 60;

    /// "White" role range: minimum value
    pub const WHITE_VAL_MIN: u8 = 200;
}

/// Detection thresholds applied per sampled frame
pub mod detection {
    /// Overlap policy: minimum Intersection-over-Union between a candidate
    /// and the projected spatial template (inclusive boundary)
    pub const MIN_IOU: f32 = 0.3;

    /// Deviation policy: maximum per-axis deviation between the normalized
    /// candidate box and the template (inclusive boundary)
    pub const MAX_AXIS_DEVIATION: f32 = 0.15;

    /// Content verification: every secondary color role must cover strictly
    /// more than this fraction of the candidate region
    pub const DENSITY_FLOOR: f32 = 0.01;
}

/// Timeline sampling defaults for the scan orchestrator
pub mod sampling {
    /// Fixed time step between sampled frames, in seconds
    pub const STEP_SECS: f64 = 0.5;

    /// Frames wider than this are downscaled (aspect preserved) before
    /// evaluation to bound per-frame cost
    pub const PROCESSING_WIDTH: u32 = 640;
}
