//! Event stream layer.
//!
//! Responsibilities:
//! - Read/write 64-bit words over byte sources and sinks
//! - Locate DDU events by their header/trailer sentinels
//! - Read/write the text spy capture format
//!
//! Non-responsibilities:
//! - Sub-block structure (see `unpack`)
//! - Framing (see `framing`)

pub mod io;
pub mod event;
pub mod scanner;
pub mod spy_text;

pub use event::{sequence_id_of, Event};
pub use io::{open_input, open_output, InputSource, OutputSink, WordReader, WordWriter};
pub use scanner::{is_event_start, EventScanner, Events};
pub use spy_text::{SpyTextReader, SpyTextWriter};
