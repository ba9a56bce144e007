//! Stream comparison.
//!
//! Responsibilities:
//! - Raw mode: word-for-word comparison of event pairs, halting at the first
//!   divergence
//! - Resync mode: align two streams by sequence id and compare per-board
//!   sub-blocks, reporting every mismatch
//! - Side-by-side diagnostic dumps
//!
//! Non-responsibilities:
//! - Reading the streams (see `stream`)
//! - Rendering colors (front ends read `DumpLine::mismatch`)

pub mod types;
pub mod dump;
pub mod raw;
pub mod resync;

pub use dump::{dump_words, DumpLine};
pub use raw::{RawCompareConfig, RawComparator};
pub use resync::{ResyncComparator, ResyncConfig};
pub use types::{
    HalfWordDiff, RawDivergence, RawOutcome, RawReport, ResyncFinding, ResyncReport,
    SubBlockMismatch,
};
