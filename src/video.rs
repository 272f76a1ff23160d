//! Video source collaborator boundary
//!
//! The orchestrator consumes frames through the [`VideoSource`] trait:
//! seek-and-read at arbitrary timestamps, plus duration and native
//! dimensions. Seeking is the dominant suspension point, so `frame_at`
//! is async: callers must await it to completion before touching pixels
//! or they risk stale-frame reads.
//!
//! [`FrameSequence`] is the shipped in-memory implementation for hosts
//! that decode upstream, and for tests.

use async_trait::async_trait;
use image::RgbImage;

use crate::error::{Result, ScanError};

/// Supplies decodable frames at arbitrary timestamps.
#[async_trait]
pub trait VideoSource: Send {
    /// Total duration in seconds
    fn duration_secs(&self) -> f64;

    /// Native (width, height) in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Seek to `timestamp_secs` and decode the frame there. Resolves only
    /// once the decoder has confirmed the new position.
    async fn frame_at(&mut self, timestamp_secs: f64) -> Result<RgbImage>;
}

/// An in-memory video: a fixed-rate sequence of pre-decoded frames.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<RgbImage>,
    frame_secs: f64,
}

impl FrameSequence {
    /// Build a sequence where frame `i` covers the half-open interval
    /// `[i * frame_secs, (i + 1) * frame_secs)`.
    pub fn new(frames: Vec<RgbImage>, frame_secs: f64) -> Result<Self> {
        if frames.is_empty() {
            return Err(ScanError::invalid_parameter("frames", "empty sequence"));
        }
        if !(frame_secs > 0.0 && frame_secs.is_finite()) {
            return Err(ScanError::invalid_parameter("frame_secs", frame_secs));
        }
        let dims = frames[0].dimensions();
        if frames.iter().any(|f| f.dimensions() != dims) {
            return Err(ScanError::invalid_parameter(
                "frames",
                "inconsistent frame dimensions",
            ));
        }
        Ok(Self { frames, frame_secs })
    }
}

#[async_trait]
impl VideoSource for FrameSequence {
    fn duration_secs(&self) -> f64 {
        self.frames.len() as f64 * self.frame_secs
    }

    fn dimensions(&self) -> (u32, u32) {
        self.frames[0].dimensions()
    }

    async fn frame_at(&mut self, timestamp_secs: f64) -> Result<RgbImage> {
        if !(timestamp_secs >= 0.0 && timestamp_secs.is_finite()) {
            return Err(ScanError::video_message(format!(
                "cannot seek to timestamp {timestamp_secs}"
            )));
        }
        // The end of the timeline maps to the last frame
        let index = ((timestamp_secs / self.frame_secs).floor() as usize).min(self.frames.len() - 1);
        Ok(self.frames[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(value: u8) -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb([value, value, value]))
    }

    #[test]
    fn test_rejects_empty_and_invalid_sequences() {
        assert!(FrameSequence::new(vec![], 0.5).is_err());
        assert!(FrameSequence::new(vec![solid(1)], 0.0).is_err());
        assert!(FrameSequence::new(vec![solid(1)], f64::NAN).is_err());

        let mismatched = vec![solid(1), RgbImage::new(2, 2)];
        assert!(FrameSequence::new(mismatched, 0.5).is_err());
    }

    #[test]
    fn test_duration_and_dimensions() {
        let video = FrameSequence::new(vec![solid(1), solid(2), solid(3)], 0.5).unwrap();
        assert_eq!(video.duration_secs(), 1.5);
        assert_eq!(video.dimensions(), (4, 4));
    }

    #[tokio::test]
    async fn test_seek_selects_covering_frame() {
        let mut video = FrameSequence::new(vec![solid(10), solid(20), solid(30)], 0.5).unwrap();

        assert_eq!(video.frame_at(0.0).await.unwrap().get_pixel(0, 0).0[0], 10);
        assert_eq!(video.frame_at(0.49).await.unwrap().get_pixel(0, 0).0[0], 10);
        assert_eq!(video.frame_at(0.5).await.unwrap().get_pixel(0, 0).0[0], 20);
        assert_eq!(video.frame_at(1.0).await.unwrap().get_pixel(0, 0).0[0], 30);
        // End of timeline clamps to the last frame
        assert_eq!(video.frame_at(1.5).await.unwrap().get_pixel(0, 0).0[0], 30);
    }

    #[tokio::test]
    async fn test_seek_rejects_negative_timestamp() {
        let mut video = FrameSequence::new(vec![solid(10)], 0.5).unwrap();
        assert!(video.frame_at(-0.1).await.is_err());
    }
}
