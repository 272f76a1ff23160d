//! # Overlay Scan
//!
//! A Rust crate for detecting diagnostic overlays in video frames by
//! tolerance-based color matching.
//!
//! This library provides overlay detection by:
//! - Calibrating a color and placement profile from a reference screenshot
//! - Segmenting each sampled frame against the calibrated HSV ranges
//! - Filtering candidate regions by where the overlay is expected to sit
//! - Verifying candidates against the profile's full color set
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use overlay_scan::{FrameSequence, RasterBackend, ScanOrchestrator};
//!
//! # async fn run(frames: Vec<image::RgbImage>, reference: image::RgbImage) {
//! let video = FrameSequence::new(frames, 0.5).unwrap();
//! let mut orchestrator = ScanOrchestrator::new(Arc::new(RasterBackend::new()));
//! let handle = orchestrator.start_scan(video, reference);
//! let final_state = handle.wait().await;
//! for event in &final_state.detections {
//!     println!("overlay at {:.1}s ({:.2})", event.timestamp_secs, event.confidence);
//! }
//! # }
//! ```

use std::sync::Arc;

use image::RgbImage;

pub mod calibration;
pub mod color;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod session;
pub mod video;
pub mod vision;

pub use calibration::{DetectionProfile, ProfileBuilder, SpatialTemplate};
pub use color::{ColorRange, Hsv8, HsvTolerance};
pub use config::{CalibrationStrategy, ScanConfig, SpatialFilter};
pub use detection::{FrameScanner, Verdict};
pub use error::{Result, ScanError};
pub use session::{DetectionEvent, ScanHandle, ScanOrchestrator, ScanState, ScanStatus};
pub use video::{FrameSequence, VideoSource};
pub use vision::{ImageBackend, RasterBackend};

/// Scan a video for the overlay shown in `reference`, to completion
///
/// This is the one-call entry point: it calibrates a profile from the
/// reference screenshot, walks the whole timeline with the default
/// configuration, and returns the final session state.
///
/// # Arguments
///
/// * `video` - Frame source to scan
/// * `reference` - Screenshot with the overlay visible
///
/// # Errors
///
/// Returns `ScanError` if the session ends in an error state; partial
/// detections collected before the failure are discarded here, use
/// [`ScanOrchestrator`] directly to keep them.
pub async fn scan_video<V>(video: V, reference: RgbImage) -> Result<ScanState>
where
    V: VideoSource + 'static,
{
    let mut orchestrator = ScanOrchestrator::new(Arc::new(RasterBackend::new()));
    let state = orchestrator.start_scan(video, reference).wait().await;
    match state.status {
        ScanStatus::Error => Err(ScanError::video_message(
            state
                .error
                .unwrap_or_else(|| "scan session failed".to_string()),
        )),
        _ => Ok(state),
    }
}
