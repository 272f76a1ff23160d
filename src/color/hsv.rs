//! RGB to HSV conversion in the 8-bit OpenCV convention
//!
//! Hue is stored as degrees / 2 so the full circle fits in a byte
//! (0..=180); saturation and value span 0..=255. This is the working
//! color space for segmentation throughout the crate.

use image::Rgb;

/// A pixel in the 8-bit HSV working space.
///
/// Invariant: `h <= 180`. Zero-chroma pixels (r = g = b) carry `h = 0`
/// and `s = 0`; hue is meaningless for them and callers must not rely
/// on hue discrimination for near-gray colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv8 {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv8 {
    pub fn new(h: u8, s: u8, v: u8) -> Self {
        debug_assert!(h <= crate::constants::hsv_space::HUE_MAX);
        Self { h, s, v }
    }
}

/// Convert an 8-bit RGB sample to the HSV working space.
///
/// Uses the standard min/max/delta formula: hue branches on which channel
/// is the maximum, is normalized to a positive degree value, then rescaled
/// to 0..=180.
pub fn rgb_to_hsv(rgb: Rgb<u8>) -> Hsv8 {
    let r = rgb.0[0] as f32;
    let g = rgb.0[1] as f32;
    let b = rgb.0[2] as f32;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let mut degrees = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    if degrees < 0.0 {
        degrees += 360.0;
    }

    let s = if max == 0.0 {
        0
    } else {
        ((delta / max) * 255.0).round() as u8
    };

    Hsv8 {
        h: (degrees / 2.0).round() as u8,
        s,
        v: max.round() as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::{FromColor, Hsv, Srgb};

    #[test]
    fn test_primary_colors() {
        assert_eq!(rgb_to_hsv(Rgb([255, 0, 0])), Hsv8::new(0, 255, 255));
        assert_eq!(rgb_to_hsv(Rgb([0, 255, 0])), Hsv8::new(60, 255, 255));
        assert_eq!(rgb_to_hsv(Rgb([0, 0, 255])), Hsv8::new(120, 255, 255));
    }

    #[test]
    fn test_zero_chroma_yields_zero_hue_and_saturation() {
        for value in [0u8, 127, 255] {
            let hsv = rgb_to_hsv(Rgb([value, value, value]));
            assert_eq!(hsv.h, 0);
            assert_eq!(hsv.s, 0);
            assert_eq!(hsv.v, value);
        }
    }

    #[test]
    fn test_negative_hue_branch_wraps_positive() {
        // Magenta-ish: max = r, g < b, raw hue is negative before wrap
        let hsv = rgb_to_hsv(Rgb([255, 0, 255]));
        assert_eq!(hsv.h, 150); // 300 degrees / 2
        assert_eq!(hsv.s, 255);
    }

    #[test]
    fn test_hue_never_exceeds_space_bound() {
        // Hue just below 360 degrees must stay within 0..=180 after rescale
        let hsv = rgb_to_hsv(Rgb([255, 0, 4]));
        assert!(hsv.h <= crate::constants::hsv_space::HUE_MAX);
    }

    #[test]
    fn test_agrees_with_palette_for_chromatic_samples() {
        let samples = [
            Rgb([30u8, 60, 120]),
            Rgb([230, 120, 20]),
            Rgb([12, 200, 90]),
            Rgb([180, 40, 170]),
        ];
        for rgb in samples {
            let ours = rgb_to_hsv(rgb);
            let reference = Hsv::from_color(Srgb::new(
                rgb.0[0] as f32 / 255.0,
                rgb.0[1] as f32 / 255.0,
                rgb.0[2] as f32 / 255.0,
            ));
            let ref_h = reference.hue.into_positive_degrees() / 2.0;
            let ref_s = reference.saturation * 255.0;
            let ref_v = reference.value * 255.0;

            assert!((ours.h as f32 - ref_h).abs() <= 1.0, "hue mismatch for {rgb:?}");
            assert!((ours.s as f32 - ref_s).abs() <= 1.0, "sat mismatch for {rgb:?}");
            assert!((ours.v as f32 - ref_v).abs() <= 1.0, "val mismatch for {rgb:?}");
        }
    }
}
