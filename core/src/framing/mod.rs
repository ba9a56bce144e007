//! GbE test-frame framing for DDU events.
//!
//! Responsibilities:
//! - Fragment events and encode fragments into symbol sequences
//! - Decode and CRC-check frames
//! - Compare expected frames against a transmit-path readback
//!
//! Non-responsibilities:
//! - Register I/O (see `hw::transmit`)
//! - Waiting for the transmit path to drain

pub mod types;
pub mod encode;
pub mod decode;
pub mod readback;

pub use decode::{decode_frame, decode_frames, DecodedFrame};
pub use encode::{encode_ethernet_frame, encode_fragment, partition, FrameAssembler};
pub use readback::verify_readback;
pub use types::{
    is_control, mac_halfwords, AddressHeader, Fragment, Frame, FrameError, FrameOptions,
    ReadbackOutcome, Symbol,
};
