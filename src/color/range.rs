//! Tolerant color ranges for segmentation
//!
//! A [`ColorRange`] is a pair of lower/upper bounds in the HSV working
//! space, each channel independently bounded. Ranges are derived once
//! from a reference sample plus a tolerance and are immutable thereafter.

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::color::hsv::{rgb_to_hsv, Hsv8};
use crate::constants::{calibration, hsv_space};

/// Symmetric per-channel expansion applied around a sampled color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvTolerance {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Default for HsvTolerance {
    fn default() -> Self {
        Self {
            h: calibration::TOLERANCE_H,
            s: calibration::TOLERANCE_S,
            v: calibration::TOLERANCE_V,
        }
    }
}

/// An immutable HSV bound pair.
///
/// Invariant: `lower <= upper` per channel after tolerance expansion and
/// clamping to the space's legal interval (hue 0..=180, sat/val 0..=255).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRange {
    pub lower: Hsv8,
    pub upper: Hsv8,
}

impl ColorRange {
    /// Derive a range by expanding `tolerance` symmetrically around an HSV
    /// sample, clamping each bound to the space's legal interval.
    pub fn around(sample: Hsv8, tolerance: HsvTolerance) -> Self {
        Self {
            lower: Hsv8 {
                h: sample.h.saturating_sub(tolerance.h),
                s: sample.s.saturating_sub(tolerance.s),
                v: sample.v.saturating_sub(tolerance.v),
            },
            upper: Hsv8 {
                h: sample.h.saturating_add(tolerance.h).min(hsv_space::HUE_MAX),
                s: sample.s.saturating_add(tolerance.s),
                v: sample.v.saturating_add(tolerance.v),
            },
        }
    }

    /// Derive a range from an RGB reference sample.
    ///
    /// Near-gray samples (r = g = b) convert to hue 0 / saturation 0, which
    /// makes hue discrimination meaningless; use [`ColorRange::white`] for
    /// such roles instead.
    pub fn from_rgb(sample: Rgb<u8>, tolerance: HsvTolerance) -> Self {
        Self::around(rgb_to_hsv(sample), tolerance)
    }

    /// The "white" role range: any hue, low saturation, high value.
    pub fn white() -> Self {
        Self {
            lower: Hsv8 {
                h: 0,
                s: 0,
                v: calibration::WHITE_VAL_MIN,
            },
            upper: Hsv8 {
                h: hsv_space::HUE_MAX,
                s: calibration::WHITE_SAT_MAX,
                v: hsv_space::VAL_MAX,
            },
        }
    }

    /// Check whether a pixel falls within the range, all channels inclusive.
    pub fn contains(&self, pixel: Hsv8) -> bool {
        pixel.h >= self.lower.h
            && pixel.h <= self.upper.h
            && pixel.s >= self.lower.s
            && pixel.s <= self.upper.s
            && pixel.v >= self.lower.v
            && pixel.v <= self.upper.v
    }
}
