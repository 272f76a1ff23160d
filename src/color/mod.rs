//! Color space math: HSV conversion and tolerant color ranges

pub mod hsv;
pub mod range;

pub use hsv::{rgb_to_hsv, Hsv8};
pub use range::{ColorRange, HsvTolerance};
