//! Sub-block (DMB) unpacking.
//!
//! Responsibilities:
//! - Locate DMB header markers inside an event
//! - Partition the event payload into per-board sub-blocks
//! - Label DMB-internal structure for diagnostic dumps
//!
//! Non-responsibilities:
//! - Event boundaries (see `stream`)
//! - Decoding CFEB/ALCT/TMB contents

pub mod types;
pub mod split;
pub mod annotate;

pub use annotate::{annotate_words, Annotation};
pub use split::{is_sub_header, marker_positions, split, split_checked, split_words};
pub use types::{OriginId, SplitIssue, SplitResult, SubBlock};
