//! Detection profile data model
//!
//! A [`DetectionProfile`] is the immutable output of calibration: the body
//! color range, the named secondary ranges used by content verification,
//! and the spatial template with derived geometry. One profile is owned by
//! one scan session and shared read-only across all frame evaluations.

use serde::{Deserialize, Serialize};

use crate::color::ColorRange;
use crate::error::{Result, ScanError};
use crate::vision::Region;

/// Tolerance for accumulated floating-point error when validating that a
/// normalized box stays within the unit square
const UNIT_EPS: f64 = 1e-9;

/// Normalized bounding box of the overlay in the reference image.
///
/// All components are in [0,1] relative to image dimensions; width and
/// height are strictly positive and the box stays inside the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialTemplate {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SpatialTemplate {
    /// Construct a validated template.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
            return Err(ScanError::invalid_parameter(
                "template origin",
                format!("({x}, {y})"),
            ));
        }
        if width <= 0.0 || height <= 0.0 || width > 1.0 || height > 1.0 {
            return Err(ScanError::invalid_parameter(
                "template size",
                format!("({width}, {height})"),
            ));
        }
        if x + width > 1.0 + UNIT_EPS || y + height > 1.0 + UNIT_EPS {
            return Err(ScanError::invalid_parameter(
                "template extent",
                format!("({}, {})", x + width, y + height),
            ));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Normalize a detected pixel region by the reference image dimensions.
    pub fn from_region(region: &Region, image_width: u32, image_height: u32) -> Result<Self> {
        if image_width == 0 || image_height == 0 {
            return Err(ScanError::invalid_parameter(
                "image dimensions",
                format!("{image_width}x{image_height}"),
            ));
        }
        let w = f64::from(image_width);
        let h = f64::from(image_height);
        Self::new(
            f64::from(region.x) / w,
            f64::from(region.y) / h,
            f64::from(region.width) / w,
            f64::from(region.height) / h,
        )
    }

    /// Width-over-height aspect ratio; always positive for a valid template.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// Immutable calibration output: color ranges plus spatial geometry.
#[derive(Debug, Clone)]
pub struct DetectionProfile {
    /// Primary segmentation range (the overlay body/background color)
    pub body: ColorRange,

    /// Named secondary ranges verified inside candidate regions
    pub secondary: Vec<(String, ColorRange)>,

    /// Normalized bounding box of the overlay in the reference image
    pub template: SpatialTemplate,

    /// Detected-region area divided by reference image area
    pub coverage: f64,

    /// Width-over-height aspect ratio of the detected region
    pub aspect_ratio: f64,
}
