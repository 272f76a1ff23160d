//! Profile builder: calibration against a reference screenshot
//!
//! Builds a [`DetectionProfile`] by:
//! - deriving the body color range (dominant-ROI sampling or a fixed target)
//! - segmenting the reference image with that range
//! - selecting the largest connected component above a minimum-area floor
//! - recording its normalized bounding box, coverage, and aspect ratio
//! - constructing the named secondary ranges for content verification

use std::sync::Arc;

use image::RgbImage;
use tracing::debug;

use crate::calibration::profile::{DetectionProfile, SpatialTemplate};
use crate::color::{ColorRange, Hsv8};
use crate::config::{CalibrationConfig, CalibrationStrategy, RoleSource};
use crate::constants::calibration::{CHROMA_SAT_FLOOR, CHROMA_VAL_FLOOR, HUE_BIN_WIDTH};
use crate::error::{Result, ScanError};
use crate::vision::{HsvImage, ImageBackend};

/// Builds immutable detection profiles from reference images.
pub struct ProfileBuilder {
    backend: Arc<dyn ImageBackend>,
    config: CalibrationConfig,
}

impl ProfileBuilder {
    /// Create a builder with default calibration parameters
    pub fn new(backend: Arc<dyn ImageBackend>) -> Self {
        Self::with_config(backend, CalibrationConfig::default())
    }

    /// Create a builder with custom calibration parameters
    pub fn with_config(backend: Arc<dyn ImageBackend>, config: CalibrationConfig) -> Self {
        Self { backend, config }
    }

    /// Build a detection profile from a reference image.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Calibration` when no connected component of at
    /// least `min_region_area` px² matches the body color range, and
    /// `ScanError::InvalidParameter` for out-of-range configuration.
    pub fn calibrate(&self, reference: &RgbImage) -> Result<DetectionProfile> {
        let (width, height) = reference.dimensions();
        if width == 0 || height == 0 {
            return Err(ScanError::calibration("reference image is empty"));
        }

        let hsv = self.backend.to_hsv(reference);

        let body = match &self.config.strategy {
            CalibrationStrategy::FixedTarget { color } => {
                ColorRange::from_rgb((*color).into(), self.config.tolerance)
            }
            CalibrationStrategy::DominantColor => self.dominant_range(&hsv)?,
        };

        let mask = self.backend.threshold(&hsv, &body);
        let regions = self.backend.extract_regions(&mask);

        let best = regions
            .iter()
            .filter(|r| r.area >= self.config.min_region_area)
            .max_by_key(|r| r.area)
            .copied()
            .ok_or_else(|| {
                ScanError::calibration(format!(
                    "no region of at least {} px\u{b2} matched the body color",
                    self.config.min_region_area
                ))
            })?;

        let template = SpatialTemplate::from_region(&best, width, height)?;
        let coverage = best.area as f64 / (f64::from(width) * f64::from(height));

        let secondary = self
            .config
            .roles
            .iter()
            .map(|role| {
                let range = match &role.source {
                    RoleSource::Fixed { color } => {
                        ColorRange::from_rgb((*color).into(), self.config.tolerance)
                    }
                    RoleSource::White => ColorRange::white(),
                };
                (role.name.clone(), range)
            })
            .collect();

        debug!(
            x = template.x,
            y = template.y,
            width = template.width,
            height = template.height,
            coverage,
            "calibrated detection profile"
        );

        Ok(DetectionProfile {
            body,
            secondary,
            template,
            coverage,
            aspect_ratio: template.aspect_ratio(),
        })
    }

    /// Derive the body range from the dominant chromatic color inside the
    /// central region of interest: take the modal hue bin over suitably
    /// saturated pixels, then the per-channel median of that bin.
    fn dominant_range(&self, hsv: &HsvImage) -> Result<ColorRange> {
        let fraction = self.config.roi_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ScanError::invalid_parameter("roi_fraction", fraction));
        }

        let (width, height) = (hsv.width(), hsv.height());
        let x0 = ((f64::from(width) * (1.0 - fraction)) / 2.0).floor() as u32;
        let y0 = ((f64::from(height) * (1.0 - fraction)) / 2.0).floor() as u32;
        let x1 = (width - x0).max(x0 + 1).min(width);
        let y1 = (height - y0).max(y0 + 1).min(height);

        let mut bins = [0u32; (180 / HUE_BIN_WIDTH as usize) + 1];
        let mut chromatic: Vec<Hsv8> = Vec::new();
        for y in y0..y1 {
            for x in x0..x1 {
                let p = hsv.pixel(x, y);
                if p.s >= CHROMA_SAT_FLOOR && p.v >= CHROMA_VAL_FLOOR {
                    bins[(p.h / HUE_BIN_WIDTH) as usize] += 1;
                    chromatic.push(p);
                }
            }
        }

        if chromatic.is_empty() {
            return Err(ScanError::calibration(
                "reference contains no chromatic pixels in the sampling region",
            ));
        }

        // First maximal bin wins so ties resolve deterministically
        let mut modal_bin = 0usize;
        for (i, &count) in bins.iter().enumerate() {
            if count > bins[modal_bin] {
                modal_bin = i;
            }
        }

        let mut hs: Vec<u8> = Vec::new();
        let mut ss: Vec<u8> = Vec::new();
        let mut vs: Vec<u8> = Vec::new();
        for p in &chromatic {
            if (p.h / HUE_BIN_WIDTH) as usize == modal_bin {
                hs.push(p.h);
                ss.push(p.s);
                vs.push(p.v);
            }
        }

        let sample = Hsv8::new(median(&mut hs), median(&mut ss), median(&mut vs));
        debug!(h = sample.h, s = sample.s, v = sample.v, "dominant color sample");

        Ok(ColorRange::around(sample, self.config.tolerance))
    }
}

fn median(values: &mut [u8]) -> u8 {
    debug_assert!(!values.is_empty());
    values.sort_unstable();
    values[values.len() / 2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorRole, RgbColor};
    use crate::vision::RasterBackend;
    use image::Rgb;

    const BODY: Rgb<u8> = Rgb([30, 60, 120]);
    const BACKDROP: Rgb<u8> = Rgb([200, 200, 200]);

    fn reference_with_overlay() -> RgbImage {
        let mut img = RgbImage::from_pixel(640, 360, BACKDROP);
        for y in 36..108 {
            for x in 64..256 {
                img.put_pixel(x, y, BODY);
            }
        }
        img
    }

    fn fixed_config() -> CalibrationConfig {
        CalibrationConfig {
            strategy: CalibrationStrategy::FixedTarget {
                color: RgbColor { r: 30, g: 60, b: 120 },
            },
            ..CalibrationConfig::default()
        }
    }

    fn builder(config: CalibrationConfig) -> ProfileBuilder {
        ProfileBuilder::with_config(Arc::new(RasterBackend::new()), config)
    }

    #[test]
    fn test_calibrate_fixed_target_recovers_template() {
        let profile = builder(fixed_config())
            .calibrate(&reference_with_overlay())
            .unwrap();

        assert!((profile.template.x - 0.1).abs() < 1e-9);
        assert!((profile.template.y - 0.1).abs() < 1e-9);
        assert!((profile.template.width - 0.3).abs() < 1e-9);
        assert!((profile.template.height - 0.2).abs() < 1e-9);
        assert!(profile.aspect_ratio > 0.0);
        assert!((profile.coverage - 0.06).abs() < 1e-3);
    }

    #[test]
    fn test_calibrate_dominant_color_matches_fixed_target_geometry() {
        let reference = reference_with_overlay();
        let dominant = builder(CalibrationConfig::default())
            .calibrate(&reference)
            .unwrap();
        let fixed = builder(fixed_config()).calibrate(&reference).unwrap();

        assert_eq!(dominant.template, fixed.template);
        // The gray backdrop is achromatic, so the sampled range must still
        // contain the body color
        assert!(dominant.body.contains(crate::color::rgb_to_hsv(BODY)));
    }

    #[test]
    fn test_calibrate_fails_without_matching_region() {
        let blank = RgbImage::from_pixel(320, 180, BACKDROP);
        let err = builder(CalibrationConfig::default())
            .calibrate(&blank)
            .unwrap_err();
        assert!(matches!(err, ScanError::Calibration { .. }));
    }

    #[test]
    fn test_calibrate_rejects_regions_below_area_floor() {
        // A 5x5 target is under the default 100 px² floor
        let mut img = RgbImage::from_pixel(320, 180, BACKDROP);
        for y in 80..85 {
            for x in 100..105 {
                img.put_pixel(x, y, BODY);
            }
        }
        let err = builder(fixed_config()).calibrate(&img).unwrap_err();
        assert!(matches!(err, ScanError::Calibration { .. }));
    }

    #[test]
    fn test_calibrate_builds_configured_secondary_roles() {
        let mut config = fixed_config();
        config.roles = vec![
            ColorRole {
                name: "accent".into(),
                source: RoleSource::Fixed {
                    color: RgbColor { r: 230, g: 120, b: 20 },
                },
            },
            ColorRole {
                name: "text".into(),
                source: RoleSource::White,
            },
        ];
        let profile = builder(config).calibrate(&reference_with_overlay()).unwrap();

        assert_eq!(profile.secondary.len(), 2);
        assert_eq!(profile.secondary[0].0, "accent");
        assert_eq!(profile.secondary[1].1, ColorRange::white());
    }

    #[test]
    fn test_calibrate_rejects_invalid_roi_fraction() {
        let mut config = CalibrationConfig::default();
        config.roi_fraction = 0.0;
        let err = builder(config)
            .calibrate(&reference_with_overlay())
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidParameter { .. }));
    }

    #[test]
    fn test_median_of_odd_and_even_slices() {
        assert_eq!(median(&mut [3, 1, 2]), 2);
        assert_eq!(median(&mut [4, 1, 3, 2]), 3);
    }
}
