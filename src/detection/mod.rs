//! Detection: evaluating a single frame against a calibrated profile

pub mod scanner;

pub use scanner::{FrameScanner, Verdict};
