//! Error types for the overlay-scan library

use thiserror::Error;

/// Result type alias for overlay-scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Error taxonomy for calibration, detection, and scan orchestration.
///
/// Only [`ScanError::FrameEvaluation`] is recoverable: the orchestrator skips
/// the offending frame and keeps scanning. Every other variant is terminal for
/// the session. Cancellation is not an error and has no variant here.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Image-processing backend is missing or refused its availability probe
    #[error("image-processing backend unavailable: {reason}")]
    CollaboratorUnavailable { reason: String },

    /// No region matching the body color was found in the reference image
    #[error("calibration failed: {reason}")]
    Calibration { reason: String },

    /// Isolated per-frame or per-candidate failure; the frame is skipped
    #[error("frame evaluation failed at {timestamp_secs:.2}s: {reason}")]
    FrameEvaluation { timestamp_secs: f64, reason: String },

    /// Video source could not seek or decode
    #[error("video source error: {message}")]
    VideoSource {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid input parameters
    #[error("invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },
}

impl ScanError {
    /// Create a calibration error
    pub fn calibration(reason: impl Into<String>) -> Self {
        Self::Calibration {
            reason: reason.into(),
        }
    }

    /// Create a per-frame evaluation error
    pub fn frame(timestamp_secs: f64, reason: impl Into<String>) -> Self {
        Self::FrameEvaluation {
            timestamp_secs,
            reason: reason.into(),
        }
    }

    /// Create a video source error with context
    pub fn video<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::VideoSource {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a video source error without an underlying cause
    pub fn video_message(message: impl Into<String>) -> Self {
        Self::VideoSource {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Check if this error indicates a recoverable condition.
    ///
    /// Recoverable errors are confined to a single sampled frame; the scan
    /// loop logs them and proceeds to the next timestamp.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScanError::FrameEvaluation { .. })
    }
}
