//! Calibration: building a detection profile from a reference screenshot

pub mod builder;
pub mod profile;

pub use builder::ProfileBuilder;
pub use profile::{DetectionProfile, SpatialTemplate};
