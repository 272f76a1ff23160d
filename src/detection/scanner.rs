//! Per-frame overlay detection
//!
//! Evaluates one video frame against a calibrated [`DetectionProfile`]:
//! - segments the frame with the profile's body color range
//! - extracts candidate regions and applies the spatial filter
//!   (IoU overlap by default, per-axis deviation as the alternative)
//! - verifies candidate content against every secondary color role
//!   (the "triad" check)
//!
//! Candidates are evaluated in extraction order; the first one passing
//! both filters wins and scanning stops. Spatial boundaries are inclusive;
//! content densities must be strictly above the configured floor.

use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, warn};

use crate::calibration::DetectionProfile;
use crate::config::{DetectionConfig, SpatialFilter};
use crate::vision::{HsvImage, ImageBackend, Region};

/// Per-frame match verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub matched: bool,
    /// Minimum of the content-verification densities, clamped to [0,1];
    /// 1.0 when the profile carries no secondary roles, 0.0 on no match.
    pub confidence: f32,
}

impl Verdict {
    fn no_match() -> Self {
        Self {
            matched: false,
            confidence: 0.0,
        }
    }
}

/// Evaluates frames against one immutable profile.
///
/// The scanner is deterministic: identical frame and profile inputs always
/// yield the identical verdict.
pub struct FrameScanner {
    profile: Arc<DetectionProfile>,
    backend: Arc<dyn ImageBackend>,
    config: DetectionConfig,
}

impl FrameScanner {
    /// Create a scanner with default detection parameters
    pub fn new(profile: Arc<DetectionProfile>, backend: Arc<dyn ImageBackend>) -> Self {
        Self::with_config(profile, backend, DetectionConfig::default())
    }

    /// Create a scanner with custom detection parameters
    pub fn with_config(
        profile: Arc<DetectionProfile>,
        backend: Arc<dyn ImageBackend>,
        config: DetectionConfig,
    ) -> Self {
        Self {
            profile,
            backend,
            config,
        }
    }

    /// Evaluate a single frame.
    ///
    /// Never fails on a malformed frame: degenerate input is logged and
    /// reported as a clean no-match. All intermediate buffers are owned by
    /// this call and dropped with it.
    pub fn scan(&self, frame: &RgbImage) -> Verdict {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            warn!(width, height, "skipping degenerate frame");
            return Verdict::no_match();
        }

        let hsv = self.backend.to_hsv(frame);
        let mask = self.backend.threshold(&hsv, &self.profile.body);
        let candidates = self.backend.extract_regions(&mask);

        for candidate in &candidates {
            if !self.spatial_accept(candidate, width, height) {
                continue;
            }
            if let Some(confidence) = self.verify_content(&hsv, candidate) {
                debug!(
                    x = candidate.x,
                    y = candidate.y,
                    confidence,
                    "candidate accepted"
                );
                return Verdict {
                    matched: true,
                    confidence,
                };
            }
        }

        Verdict::no_match()
    }

    /// Spatial lock: reject candidates whose geometry deviates too far from
    /// the profile's template. Both policy boundaries are inclusive.
    fn spatial_accept(&self, candidate: &Region, frame_width: u32, frame_height: u32) -> bool {
        let template = &self.profile.template;
        match self.config.spatial {
            SpatialFilter::Overlap { min_iou } => {
                // Project the normalized template onto frame pixel space
                let fw = f64::from(frame_width);
                let fh = f64::from(frame_height);
                let projected = (
                    template.x * fw,
                    template.y * fh,
                    template.width * fw,
                    template.height * fh,
                );
                let region = (
                    f64::from(candidate.x),
                    f64::from(candidate.y),
                    f64::from(candidate.width),
                    f64::from(candidate.height),
                );
                iou(projected, region) >= f64::from(min_iou)
            }
            SpatialFilter::Deviation { max_delta } => {
                let fw = f64::from(frame_width);
                let fh = f64::from(frame_height);
                let max = f64::from(max_delta);
                (f64::from(candidate.x) / fw - template.x).abs() <= max
                    && (f64::from(candidate.y) / fh - template.y).abs() <= max
                    && (f64::from(candidate.width) / fw - template.width).abs() <= max
                    && (f64::from(candidate.height) / fh - template.height).abs() <= max
            }
        }
    }

    /// Triad check: every secondary role's pixel density within the
    /// candidate must be strictly above the floor. Returns the minimum
    /// density as the confidence, or `None` when any role fails.
    fn verify_content(&self, hsv: &HsvImage, candidate: &Region) -> Option<f32> {
        if self.profile.secondary.is_empty() {
            return Some(1.0);
        }

        let bbox_area = candidate.bbox_area();
        if bbox_area == 0 {
            debug!("rejecting zero-area candidate");
            return None;
        }

        let mut min_density = f64::INFINITY;
        for (name, range) in &self.profile.secondary {
            let count = self.backend.count_in_range(hsv, candidate, range);
            let density = count as f64 / bbox_area as f64;
            if density <= f64::from(self.config.density_floor) {
                debug!(role = name.as_str(), density, "content check failed");
                return None;
            }
            min_density = min_density.min(density);
        }

        Some(min_density.clamp(0.0, 1.0) as f32)
    }
}

/// Intersection-over-Union of two (x, y, width, height) boxes.
fn iou(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> f64 {
    let ix = (a.0 + a.2).min(b.0 + b.2) - a.0.max(b.0);
    let iy = (a.1 + a.3).min(b.1 + b.3) - a.1.max(b.1);
    let inter = ix.max(0.0) * iy.max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let union = a.2 * a.3 + b.2 * b.3 - inter;
    inter / union
}
