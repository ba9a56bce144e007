use std::io;
use thiserror::Error;

use crate::{framing::FrameError, hw::HardwareError};

/// One event-stream word.
pub type Word = u64;

/// 24-bit L1A id carried by the first DDU header word.
pub type SequenceId = u32;

/// Unified error covering I/O, framing, hardware and input validation.
/// - `From<T>` impls enable `?` across layers.
/// - Structural findings in the data (truncated events, short sub-blocks,
///   comparator mismatches) are NOT errors; they are reported as values.
#[derive(Debug, Error)]
pub enum DaqError {
    /// Unrecoverable I/O on the byte source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Frame-level error (decode or validation).
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Register access failure. Fatal, never retried locally.
    #[error("hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// Malformed line in a spy text capture.
    #[error("spy text error at line {line}: {msg}")]
    SpyText { line: usize, msg: String },

    /// Config file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Generic validation with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
