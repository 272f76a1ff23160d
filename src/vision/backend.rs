//! Image-processing collaborator boundary
//!
//! The calibration and detection code never touches pixels directly; it
//! talks to an [`ImageBackend`] that supplies the minimal capability set:
//! color-space conversion, range thresholding, connected-component
//! extraction with bounding boxes and areas, and in-range pixel counting
//! within a region. The default implementation is
//! [`crate::vision::RasterBackend`]; hosts may plug in their own.

use image::{GrayImage, RgbImage};

use crate::color::{ColorRange, Hsv8};

/// A frame converted to the HSV working space, row-major, one [`Hsv8`]
/// per pixel.
#[derive(Debug, Clone)]
pub struct HsvImage {
    width: u32,
    height: u32,
    data: Vec<Hsv8>,
}

impl HsvImage {
    /// Wrap a row-major HSV pixel buffer.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height` (backend contract violation).
    pub fn new(width: u32, height: u32, data: Vec<Hsv8>) -> Self {
        assert_eq!(data.len(), (width as usize) * (height as usize));
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at (x, y). Callers must stay within bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Hsv8 {
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }
}

/// A connected pixel region extracted from a binary mask: bounding box in
/// pixel coordinates plus the number of set pixels it contains.
///
/// Regions are transient: they live for one frame's evaluation and are
/// discarded with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub area: u64,
}

impl Region {
    /// Bounding-box area in px² (may exceed `area` when the component has
    /// holes).
    pub fn bbox_area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Capability set required from the image-processing collaborator.
///
/// Implementations must be deterministic: identical inputs yield identical
/// masks and regions, in identical order.
pub trait ImageBackend: Send + Sync {
    /// Probe backend availability. The orchestrator calls this once per
    /// session and fails fast with `CollaboratorUnavailable` when false.
    fn is_available(&self) -> bool {
        true
    }

    /// Convert an RGB frame to the HSV working space.
    fn to_hsv(&self, frame: &RgbImage) -> HsvImage;

    /// Produce a binary mask (255 = in range, 0 = out) from range-based
    /// thresholding.
    fn threshold(&self, hsv: &HsvImage, range: &ColorRange) -> GrayImage;

    /// Extract external connected components from a binary mask, in a
    /// stable (discovery) order.
    fn extract_regions(&self, mask: &GrayImage) -> Vec<Region>;

    /// Count pixels inside `region` whose HSV value falls within `range`.
    /// Out-of-bounds region parts are ignored.
    fn count_in_range(&self, hsv: &HsvImage, region: &Region, range: &ColorRange) -> u64;
}
