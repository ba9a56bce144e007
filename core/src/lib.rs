//! cscfed-core
//!
//! Event codec, GbE frame protocol and capture comparator for the CSC FED /
//! DDU 64-bit word stream. Single-threaded and synchronous.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod telemetry;

// Event stream and sub-blocks
pub mod stream;
pub mod unpack;

// Framing and comparison
pub mod framing;
pub mod compare;
pub mod analyze;

// Register seam
pub mod hw;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::analyze::{analyze_event, Analyzer, EventIssue};
    pub use crate::compare::{
        RawCompareConfig, RawComparator, ResyncComparator, ResyncConfig, ResyncReport,
    };
    pub use crate::framing::{FrameAssembler, FrameOptions};
    pub use crate::stream::{Event, EventScanner, SpyTextReader, SpyTextWriter};
    pub use crate::types::{DaqError, SequenceId, Word};
    pub use crate::unpack::{split, OriginId, SubBlock};
}
