//! telemetry/mod.rs
//! Counters and stage timers for scans, comparisons and transmissions.
//!
//! Counters are plain values merged at the end of a run; nothing here locks
//! or allocates per event.

pub mod counters;
pub mod timers;

pub use counters::*;
pub use timers::*;
