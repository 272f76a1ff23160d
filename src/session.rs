//! Scan orchestration: session state, progress, and cancellation
//!
//! The orchestrator drives one full scan: validate the image-processing
//! backend, calibrate a profile from the reference image, then walk the
//! video timeline at a fixed step, feeding frames to the scanner and
//! collecting detection events. State updates stream over a watch channel;
//! cancellation is cooperative through a shared token and is checked
//! before each seek and after each frame.
//!
//! Exactly one session is active per orchestrator: starting a new scan
//! cancels the previous session's token before proceeding.

use std::sync::Arc;

use image::imageops::FilterType;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::calibration::ProfileBuilder;
use crate::config::ScanConfig;
use crate::detection::FrameScanner;
use crate::error::ScanError;
use crate::video::VideoSource;
use crate::vision::ImageBackend;

/// Session lifecycle states.
///
/// Transitions are monotonic within a session:
/// `Initializing -> Calibrating -> Processing -> {Completed | Error}`.
/// A cancelled session keeps its last non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Idle,
    Initializing,
    Calibrating,
    Processing,
    Completed,
    Error,
}

/// A timestamped positive match recorded during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// Sampled timestamp in seconds, >= 0
    pub timestamp_secs: f64,
    /// Match confidence in [0,1]
    pub confidence: f32,
}

/// Snapshot of one scan session, published after every processed frame.
///
/// `detections` is append-only and strictly non-decreasing in timestamp;
/// events already collected survive an `Error` transition for inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanState {
    pub status: ScanStatus,
    /// Timeline progress, 0..=100
    pub progress: u8,
    pub detections: Vec<DetectionEvent>,
    /// Message of the terminal error, when `status == Error`
    pub error: Option<String>,
}

impl ScanState {
    /// State of a torn-down or not-yet-started session
    pub fn idle() -> Self {
        Self {
            status: ScanStatus::Idle,
            progress: 0,
            detections: Vec::new(),
            error: None,
        }
    }

    fn initializing() -> Self {
        Self {
            status: ScanStatus::Initializing,
            progress: 0,
            detections: Vec::new(),
            error: None,
        }
    }
}

/// Handle to an in-flight scan session.
pub struct ScanHandle {
    state: watch::Receiver<ScanState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ScanHandle {
    /// Latest published session state
    pub fn state(&self) -> ScanState {
        self.state.borrow().clone()
    }

    /// Subscribe to session-state updates
    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.clone()
    }

    /// Request cooperative cancellation. Takes effect at the next
    /// checkpoint; the session stops quietly without a terminal status.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the session task to stop and return the final state
    pub async fn wait(mut self) -> ScanState {
        let _ = (&mut self.task).await;
        self.state.borrow().clone()
    }
}

/// Drives scan sessions against a shared image-processing backend.
pub struct ScanOrchestrator {
    backend: Arc<dyn ImageBackend>,
    config: ScanConfig,
    active: CancellationToken,
}

impl ScanOrchestrator {
    /// Create an orchestrator with default configuration
    pub fn new(backend: Arc<dyn ImageBackend>) -> Self {
        Self::with_config(backend, ScanConfig::default())
    }

    /// Create an orchestrator with custom configuration
    pub fn with_config(backend: Arc<dyn ImageBackend>, config: ScanConfig) -> Self {
        Self {
            backend,
            config,
            active: CancellationToken::new(),
        }
    }

    /// Start a scan of `video` calibrated against `reference`.
    ///
    /// Any session still in flight is cancelled first; its handle keeps the
    /// state collected up to that point. The new session runs on a spawned
    /// task and yields to the scheduler after every frame.
    pub fn start_scan<V>(&mut self, video: V, reference: RgbImage) -> ScanHandle
    where
        V: VideoSource + 'static,
    {
        // Supersede: exactly one session active at a time
        self.active.cancel();
        let cancel = CancellationToken::new();
        self.active = cancel.clone();

        let (tx, rx) = watch::channel(ScanState::initializing());
        let backend = Arc::clone(&self.backend);
        let config = self.config.clone();
        let task = tokio::spawn(run_session(
            video,
            reference,
            backend,
            config,
            tx,
            cancel.clone(),
        ));

        ScanHandle {
            state: rx,
            cancel,
            task,
        }
    }

    /// Request cancellation of the in-flight session, if any
    pub fn cancel_active(&self) {
        self.active.cancel();
    }
}

impl Drop for ScanOrchestrator {
    fn drop(&mut self) {
        self.active.cancel();
    }
}

async fn run_session<V>(
    mut video: V,
    reference: RgbImage,
    backend: Arc<dyn ImageBackend>,
    config: ScanConfig,
    tx: watch::Sender<ScanState>,
    cancel: CancellationToken,
) where
    V: VideoSource,
{
    let mut state = ScanState::initializing();

    // Initializing: fail fast when the collaborator is missing
    if !backend.is_available() {
        fail(
            &tx,
            &mut state,
            ScanError::CollaboratorUnavailable {
                reason: "backend availability probe failed".into(),
            },
        );
        return;
    }

    // Calibrating
    state.status = ScanStatus::Calibrating;
    publish(&tx, &state);
    let builder = ProfileBuilder::with_config(Arc::clone(&backend), config.calibration.clone());
    let profile = match builder.calibrate(&reference) {
        Ok(profile) => Arc::new(profile),
        Err(err) => {
            fail(&tx, &mut state, err);
            return;
        }
    };

    // Processing
    state.status = ScanStatus::Processing;
    publish(&tx, &state);
    let scanner = FrameScanner::with_config(profile, backend, config.detection.clone());

    let duration = video.duration_secs();
    if !(duration > 0.0 && duration.is_finite()) {
        // Nothing to scan: an empty timeline completes immediately
        state.status = ScanStatus::Completed;
        state.progress = 100;
        publish(&tx, &state);
        return;
    }

    let step = config.sampling.step_secs;
    if !(step > 0.0 && step.is_finite()) {
        fail(
            &tx,
            &mut state,
            ScanError::invalid_parameter("step_secs", step),
        );
        return;
    }

    let steps = (duration / step).floor() as u64;
    for i in 0..=steps {
        let timestamp = i as f64 * step;

        // Checkpoint before the seek: a cancelled session stops quietly
        if cancel.is_cancelled() {
            debug!(timestamp, "scan cancelled before seek");
            return;
        }

        let frame = match video.frame_at(timestamp).await {
            Ok(frame) => frame,
            Err(err) if err.is_recoverable() => {
                warn!(timestamp, error = %err, "skipping frame");
                continue;
            }
            Err(err) => {
                fail(&tx, &mut state, err);
                return;
            }
        };

        let frame = downscale(frame, config.sampling.processing_width);
        let verdict = scanner.scan(&frame);

        // Checkpoint after the frame: no further state updates once cancelled
        if cancel.is_cancelled() {
            debug!(timestamp, "scan cancelled after frame");
            return;
        }

        if verdict.matched {
            debug!(timestamp, confidence = verdict.confidence, "overlay detected");
            state.detections.push(DetectionEvent {
                timestamp_secs: timestamp,
                confidence: verdict.confidence,
            });
        }
        state.progress = (100.0 * timestamp / duration).round() as u8;
        publish(&tx, &state);

        // Cooperative yield: never monopolize the scheduler for the whole
        // video length
        tokio::task::yield_now().await;
    }

    state.status = ScanStatus::Completed;
    state.progress = 100;
    publish(&tx, &state);
    info!(
        detections = state.detections.len(),
        "scan completed"
    );
}

/// Downscale a frame to the bounded processing width, preserving aspect.
fn downscale(frame: RgbImage, max_width: u32) -> RgbImage {
    let (width, height) = frame.dimensions();
    if width <= max_width || width == 0 {
        return frame;
    }
    let scaled_height =
        ((u64::from(height) * u64::from(max_width)) / u64::from(width)).max(1) as u32;
    image::imageops::resize(&frame, max_width, scaled_height, FilterType::Triangle)
}

fn publish(tx: &watch::Sender<ScanState>, state: &ScanState) {
    // Receivers may all be gone; the session still runs to completion
    let _ = tx.send(state.clone());
}

fn fail(tx: &watch::Sender<ScanState>, state: &mut ScanState, err: ScanError) {
    warn!(error = %err, "scan session failed");
    state.status = ScanStatus::Error;
    state.error = Some(err.to_string());
    publish(tx, state);
}
