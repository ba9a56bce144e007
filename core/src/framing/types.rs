use std::fmt;

use thiserror::Error;

use crate::constants::{
    ADDRESS_HEADER_HALFWORDS, CONTROL_FLAG, DEFAULT_DESTINATION_MAC, DEFAULT_ETHER_TYPE,
    DEFAULT_FRAGMENT_CAPACITY, DEFAULT_SOURCE_MAC,
};
use crate::types::Word;

/// One transmit-path symbol: low 16 bits of data, bit 16 flags a control
/// character (preamble, EOF, idle).
pub type Symbol = u32;

#[inline]
pub const fn is_control(symbol: Symbol) -> bool {
    symbol & CONTROL_FLAG != 0
}

/// Three half-words of a 48-bit MAC, in wire byte order.
#[inline]
pub const fn mac_halfwords(addr: u64) -> [u16; 3] {
    [
        (((addr >> 24) & 0xff00) | (addr >> 40)) as u16,
        (((addr >> 8) & 0xff00) | ((addr >> 24) & 0xff)) as u16,
        (((addr & 0xff) << 8) | ((addr >> 8) & 0xff)) as u16,
    ]
}

/// Optional Ethernet addressing header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressHeader {
    pub source: u64,
    pub destination: u64,
    pub ether_type: u16,
}

impl Default for AddressHeader {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE_MAC,
            destination: DEFAULT_DESTINATION_MAC,
            ether_type: DEFAULT_ETHER_TYPE,
        }
    }
}

impl AddressHeader {
    /// Source MAC (3) + destination MAC (3) + byte-swapped type (1).
    pub fn halfwords(&self) -> [u16; ADDRESS_HEADER_HALFWORDS] {
        let s = mac_halfwords(self.source);
        let d = mac_halfwords(self.destination);
        [s[0], s[1], s[2], d[0], d[1], d[2], self.ether_type.swap_bytes()]
    }
}

/// Frame assembly options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOptions {
    /// Largest fragment payload in 64-bit words.
    pub fragment_capacity: usize,
    /// Emit an Ethernet addressing header before the payload.
    pub address_header: Option<AddressHeader>,
    /// Append idle symbols after the EOF.
    pub idle_fill: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            fragment_capacity: DEFAULT_FRAGMENT_CAPACITY,
            address_header: None,
            idle_fill: false,
        }
    }
}

impl FrameOptions {
    /// What the DDU puts on the wire: no addressing header, idles between frames.
    pub fn ddu() -> Self {
        Self {
            idle_fill: true,
            ..Self::default()
        }
    }

    /// Same payload discipline with the default Ethernet addressing header.
    pub fn with_address_header(mut self, header: AddressHeader) -> Self {
        self.address_header = Some(header);
        self
    }
}

/// Bounded slice of an event destined for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    /// Position within the event (0-based).
    pub index: usize,
    pub counter: u16,
    pub last: bool,
    pub words: &'a [Word],
}

/// One encoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub counter: u16,
    pub fragment_index: usize,
    pub last: bool,
    /// Payload words carried (padding excluded).
    pub payload_words: usize,
    pub crc: u32,
    pub symbols: Vec<Symbol>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Frame {{ counter: {:#06x}, fragment: {}, last: {}, payload_words: {}, crc: {:#010x}, symbols: {} }}",
            self.counter,
            self.fragment_index,
            self.last,
            self.payload_words,
            self.crc,
            self.symbols.len(),
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("fragment capacity must be at least one word")]
    ZeroCapacity,

    #[error("truncated frame: {len} symbols")]
    Truncated { len: usize },

    #[error("bad preamble symbol {found:#07x} at index {index}")]
    BadPreamble { index: usize, found: Symbol },

    #[error("missing end-of-frame symbol, found {found:#07x}")]
    MissingEof { found: Symbol },

    #[error("unexpected control symbol {found:#07x} at index {index}")]
    UnexpectedControl { index: usize, found: Symbol },

    #[error("payload of {halfwords} half-words is not a whole number of words")]
    BadPayloadLength { halfwords: usize },

    #[error("checksum mismatch: frame carries {carried:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { carried: u32, computed: u32 },
}

/// Result of comparing an expected symbol sequence with a readback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadbackOutcome {
    Match,
    LengthMismatch { expected: usize, read: usize },
    SymbolMismatch { index: usize, expected: Symbol, read: Symbol },
}

impl ReadbackOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, ReadbackOutcome::Match)
    }
}

impl fmt::Display for ReadbackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadbackOutcome::Match => f.write_str("readback matches"),
            ReadbackOutcome::LengthMismatch { expected, read } => write!(
                f,
                "readback and expected word count don't match: expected {expected}, read {read}"
            ),
            ReadbackOutcome::SymbolMismatch { index, expected, read } => write!(
                f,
                "readback word #{index} did not match: expected {expected:#06x}, read {read:#06x}"
            ),
        }
    }
}
