//! Default pure-Rust image backend
//!
//! Implements the collaborator capability set on top of the `image` and
//! `imageproc` crates: per-pixel HSV conversion, range thresholding, and
//! connected-component labelling aggregated into bounding boxes.

use std::collections::BTreeMap;

use image::{GrayImage, Luma, RgbImage};
use imageproc::region_labelling::{connected_components, Connectivity};

use crate::color::hsv::rgb_to_hsv;
use crate::color::ColorRange;
use crate::vision::backend::{HsvImage, ImageBackend, Region};

/// Mask value for in-range pixels
const MASK_SET: u8 = 255;

/// CPU raster backend. Stateless and cheap to share behind an `Arc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterBackend;

impl RasterBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for RasterBackend {
    fn to_hsv(&self, frame: &RgbImage) -> HsvImage {
        let (width, height) = frame.dimensions();
        let data = frame.pixels().map(|p| rgb_to_hsv(*p)).collect();
        HsvImage::new(width, height, data)
    }

    fn threshold(&self, hsv: &HsvImage, range: &ColorRange) -> GrayImage {
        GrayImage::from_fn(hsv.width(), hsv.height(), |x, y| {
            if range.contains(hsv.pixel(x, y)) {
                Luma([MASK_SET])
            } else {
                Luma([0u8])
            }
        })
    }

    fn extract_regions(&self, mask: &GrayImage) -> Vec<Region> {
        if mask.width() == 0 || mask.height() == 0 {
            return Vec::new();
        }

        let labels = connected_components(mask, Connectivity::Four, Luma([0u8]));

        // Aggregate bbox and pixel count per label. BTreeMap keeps regions
        // ordered by label id, which follows row-major discovery order.
        let mut stats: BTreeMap<u32, (u32, u32, u32, u32, u64)> = BTreeMap::new();
        for (x, y, label) in labels.enumerate_pixels() {
            let id = label.0[0];
            if id == 0 {
                continue;
            }
            let entry = stats.entry(id).or_insert((x, y, x, y, 0));
            entry.0 = entry.0.min(x);
            entry.1 = entry.1.min(y);
            entry.2 = entry.2.max(x);
            entry.3 = entry.3.max(y);
            entry.4 += 1;
        }

        stats
            .into_values()
            .map(|(min_x, min_y, max_x, max_y, area)| Region {
                x: min_x,
                y: min_y,
                width: max_x - min_x + 1,
                height: max_y - min_y + 1,
                area,
            })
            .collect()
    }

    fn count_in_range(&self, hsv: &HsvImage, region: &Region, range: &ColorRange) -> u64 {
        let x_end = (region.x + region.width).min(hsv.width());
        let y_end = (region.y + region.height).min(hsv.height());

        let mut count = 0u64;
        for y in region.y..y_end {
            for x in region.x..x_end {
                if range.contains(hsv.pixel(x, y)) {
                    count += 1;
                }
            }
        }
        count
    }
}
