//! Hardware seam.
//!
//! Responsibilities:
//! - Named register access behind a trait, with capability records
//! - Polling with an explicit policy and cancellation
//! - Sending frames into the GbE test path (with optional readback)
//! - Local DAQ readout sessions
//!
//! Non-responsibilities:
//! - Register-map file parsing or a real bus driver
//! - Interactive prompts

pub mod registers;
pub mod poll;
pub mod transmit;
pub mod daq;

pub use daq::{default_run_filename, DaqConfig, DaqSession, DaqSummary};
pub use poll::{poll_until, CancelToken, PollOutcome, PollPolicy};
pub use registers::{
    CheckedRegisters, HardwareError, Permission, RegisterAccess, RegisterInfo, RegisterMap,
};
pub use transmit::{
    dummy_eth_frame, empty_ddu_frame, GbeTransmitter, TransmitOutcome, EMPTY_DDU_COUNTER,
    EMPTY_DDU_EVENT,
};
