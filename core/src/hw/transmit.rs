//! hw/transmit.rs
//! Pushes encoded frames into the GbE test transmit path.

use std::fmt;

use tracing::{debug, info, warn};

use crate::constants::DEFAULT_DESTINATION_MAC;
use crate::framing::{
    encode_ethernet_frame, encode_fragment, AddressHeader, Fragment, Frame, FrameAssembler,
    FrameOptions, ReadbackOutcome, Symbol,
};
use crate::hw::poll::{poll_until, CancelToken, PollOutcome, PollPolicy};
use crate::hw::registers::{
    RegisterAccess, GBE_BUSY, GBE_ENABLE, GBE_IDLE, GBE_MANUAL_READ, GBE_MANUAL_READ_ENABLE,
    GBE_PUSH_DATA, GBE_START_TRANSMIT,
};
use crate::telemetry::TransmitCounters;
use crate::types::{DaqError, Word};

/// Empty DDU event used to probe the transmit path (L1A 0x04ce).
pub const EMPTY_DDU_EVENT: [Word; 6] = [
    0x5000_04ce_7313_4770,
    0x8000_0001_8000_0000,
    0x7fff_3031_0000_0080,
    0x8000_ffff_8000_8000,
    0x2010_0000_0000_0000,
    0xa000_0006_3a6d_0080,
];
pub const EMPTY_DDU_COUNTER: u16 = 0x04cf;
/// Carrier-extend symbol sent after the probe frame's EOF.
const CARRIER_EXTEND: Symbol = 0x1_c5bc;
const DUMMY_ETH_PAYLOAD_HALFWORDS: usize = 23;

/// The canned empty DDU frame.
pub fn empty_ddu_frame() -> Frame {
    let fragment = Fragment {
        index: 0,
        counter: EMPTY_DDU_COUNTER,
        last: true,
        words: &EMPTY_DDU_EVENT,
    };
    encode_fragment(&fragment, &FrameOptions::default())
}

/// Minimal Ethernet frame: 23 zero half-words, loopback addressing.
pub fn dummy_eth_frame() -> Vec<Symbol> {
    let header = AddressHeader {
        source: DEFAULT_DESTINATION_MAC,
        destination: DEFAULT_DESTINATION_MAC,
        ..AddressHeader::default()
    };
    encode_ethernet_frame(&header, &[0u16; DUMMY_ETH_PAYLOAD_HALFWORDS])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransmitOutcome {
    Sent { frames: usize },
    /// Transmit path never went idle within the poll policy.
    NotIdle,
    Cancelled,
    ReadbackMismatch { fragment_index: usize, outcome: ReadbackOutcome },
}

impl TransmitOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, TransmitOutcome::Sent { .. })
    }
}

impl fmt::Display for TransmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransmitOutcome::Sent { frames } => write!(f, "sent in {frames} frame(s)"),
            TransmitOutcome::NotIdle => f.write_str("transmit path did not go idle"),
            TransmitOutcome::Cancelled => f.write_str("cancelled"),
            TransmitOutcome::ReadbackMismatch { fragment_index, outcome } => {
                write!(f, "fragment {fragment_index}: {outcome}")
            }
        }
    }
}

/// Owns the register handle while a batch of events goes out.
///
/// With readback enabled, frames are read back through the manual-read port
/// and compared instead of transmitted.
pub struct GbeTransmitter<R: RegisterAccess> {
    regs: R,
    assembler: FrameAssembler,
    poll: PollPolicy,
    cancel: Option<CancelToken>,
    readback: bool,
    counters: TransmitCounters,
}

impl<R: RegisterAccess> GbeTransmitter<R> {
    pub fn new(regs: R, options: FrameOptions) -> Result<Self, DaqError> {
        Ok(Self {
            regs,
            assembler: FrameAssembler::new(options)?,
            poll: PollPolicy::default(),
            cancel: None,
            readback: false,
            counters: TransmitCounters::default(),
        })
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_readback(mut self, readback: bool) -> Self {
        self.readback = readback;
        self
    }

    /// Turn the GbE test path on.
    pub fn enable(&mut self) -> Result<(), DaqError> {
        self.regs.write(GBE_ENABLE, 1)?;
        Ok(())
    }

    /// Wait for an empty FIFO and no transmission in progress.
    pub fn wait_idle(&mut self) -> Result<PollOutcome, DaqError> {
        let regs = &mut self.regs;
        let outcome = poll_until(&self.poll, self.cancel.as_ref(), || {
            Ok(regs.read(GBE_BUSY)? == GBE_IDLE)
        })?;
        Ok(outcome)
    }

    /// Encode and send one event. Idleness is only awaited before the first
    /// fragment; later fragments follow back to back. The fragment counter
    /// only advances once the path is idle, so an event that is not sent
    /// leaves no gap in the counter sequence.
    pub fn send_event(&mut self, words: &[Word]) -> Result<TransmitOutcome, DaqError> {
        match self.wait_idle()? {
            PollOutcome::Ready => {}
            PollOutcome::Exhausted => {
                warn!("transmit path busy, event not sent");
                return Ok(TransmitOutcome::NotIdle);
            }
            PollOutcome::Cancelled => return Ok(TransmitOutcome::Cancelled),
        }

        let frames = self.assembler.assemble(words);
        if frames.len() > 1 {
            info!(words = words.len(), frames = frames.len(), "split event");
        }

        let mut symbols = 0;
        for frame in &frames {
            symbols += frame.len();
            if let Some(outcome) = self.send_frame(frame)? {
                warn!(counter = frame.counter, %outcome, "readback mismatch");
                return Ok(TransmitOutcome::ReadbackMismatch {
                    fragment_index: frame.fragment_index,
                    outcome,
                });
            }
        }

        self.counters.add_event(words.len(), frames.len(), symbols);
        Ok(TransmitOutcome::Sent { frames: frames.len() })
    }

    /// Push a frame and start it, or read it back in readback mode.
    /// Returns the readback outcome only when it is not a match.
    pub fn send_frame(&mut self, frame: &Frame) -> Result<Option<ReadbackOutcome>, DaqError> {
        self.push_symbols(&frame.symbols)?;
        debug!(counter = frame.counter, symbols = frame.len(), "frame pushed");

        if self.readback {
            let read = self.read_back(frame.len())?;
            let outcome = frame.verify_readback(&read);
            return Ok((!outcome.is_match()).then_some(outcome));
        }

        self.regs.write(GBE_START_TRANSMIT, 1)?;
        Ok(None)
    }

    /// Drain the transmit FIFO through the manual-read port. Reads at most
    /// one symbol more than `expected` so a stuck FIFO cannot hang us.
    pub fn read_back(&mut self, expected: usize) -> Result<Vec<Symbol>, DaqError> {
        let mut read = Vec::with_capacity(expected);
        self.regs.write(GBE_MANUAL_READ_ENABLE, 1)?;
        while self.regs.read(GBE_BUSY)? & GBE_IDLE == 0 && read.len() <= expected {
            read.push(self.regs.read(GBE_MANUAL_READ)?);
        }
        self.regs.write(GBE_MANUAL_READ_ENABLE, 0)?;
        Ok(read)
    }

    /// Send the canned empty DDU frame followed by a carrier-extend symbol.
    pub fn send_dummy_ddu_packet(&mut self) -> Result<(), DaqError> {
        self.enable()?;
        let frame = empty_ddu_frame();
        self.push_symbols(&frame.symbols)?;
        self.regs.write(GBE_PUSH_DATA, CARRIER_EXTEND)?;
        self.regs.write(GBE_START_TRANSMIT, 1)?;
        info!(crc = frame.crc, "dummy DDU packet sent");
        Ok(())
    }

    /// Send the minimal Ethernet frame.
    pub fn send_dummy_eth_packet(&mut self) -> Result<(), DaqError> {
        self.enable()?;
        self.push_symbols(&dummy_eth_frame())?;
        self.regs.write(GBE_START_TRANSMIT, 1)?;
        info!("dummy Ethernet packet sent");
        Ok(())
    }

    pub fn counters(&self) -> &TransmitCounters {
        &self.counters
    }

    /// Counter the next fragment will carry.
    pub fn next_counter(&self) -> u16 {
        self.assembler.next_counter()
    }

    pub fn into_inner(self) -> R {
        self.regs
    }

    fn push_symbols(&mut self, symbols: &[Symbol]) -> Result<(), DaqError> {
        for &s in symbols {
            self.regs.write(GBE_PUSH_DATA, s)?;
        }
        Ok(())
    }
}
