//! constants.rs
//! Wire constants for the DDU event stream and the GbE test frame path.
//!
//! All event-stream words are 64-bit little-endian. Frame symbols are 17 bits
//! wide: the low 16 bits carry data and bit 16 marks a link control character.

/// Size of one event-stream word in bytes.
pub const WORD_BYTES: usize = 8;

// ================= Event boundaries =================

/// Mask applied to the second DDU header word.
pub const DDU_HEADER2_MASK: u64 = 0xffff_ffff_ffff_0000;
/// Second DDU header word pattern (after masking).
pub const DDU_HEADER2: u64 = 0x8000_0001_8000_0000;
/// Mask applied to the first DDU header word (top nibble).
pub const DDU_HEADER1_MASK: u64 = 0xf000_0000_0000_0000;
/// First DDU header word pattern (after masking).
pub const DDU_HEADER1: u64 = 0x5000_0000_0000_0000;
/// DDU trailer-2 sentinel. Exactly two more trailer words follow it.
pub const DDU_TRAILER2: u64 = 0x8000_ffff_8000_8000;
/// DDU header words ahead of the first sub-block.
pub const DDU_HEADER_LEN: usize = 3;
/// Words read unconditionally after the trailer-2 sentinel.
pub const DDU_TRAILER_TAIL: usize = 2;
/// Words at the end of an event that belong to the trailer (sentinel included).
pub const DDU_TRAILER_LEN: usize = 3;
/// Smallest well-formed event (3 header words + 3 trailer words).
pub const MIN_EVENT_WORDS: usize = 6;

/// L1A id position in the first header word.
pub const SEQUENCE_ID_SHIFT: u32 = 32;
pub const SEQUENCE_ID_MASK: u64 = 0x00ff_ffff;

// ================= Sub-blocks (DMB) =================

/// Per-nibble mask for DMB block markers.
pub const DMB_MARKER_MASK: u64 = 0xf000_f000_f000_f000;
/// DMB header (sub-block start marker).
pub const DMB_HEADER1: u64 = 0x9000_9000_9000_9000;
pub const DMB_HEADER2: u64 = 0xa000_a000_a000_a000;
pub const DMB_TRAILER1: u64 = 0xf000_f000_f000_f000;
pub const DMB_TRAILER2: u64 = 0xe000_e000_e000_e000;

/// Crate id: bits 20..=27 of the sub-block's second word.
pub const CRATE_ID_SHIFT: u32 = 20;
pub const CRATE_ID_MASK: u64 = 0xff;
/// Board (DMB) id: bits 16..=19 of the sub-block's second word.
pub const BOARD_ID_SHIFT: u32 = 16;
pub const BOARD_ID_MASK: u64 = 0xf;

/// Sub-blocks shorter than this are flagged.
pub const MIN_SUB_BLOCK_WORDS: usize = 4;

// --- nested regions (dump annotation only) ---
pub const ALCT_HEADER: u16 = 0xdb0a;
pub const ALCT_TRAILER: u16 = 0xde0d;
pub const TMB_HEADER: u16 = 0xdb0c;
pub const TMB_TRAILER: u16 = 0xde0f;
/// CFEB time sample length in words (24 data words + 1 checkpoint word).
pub const CFEB_SAMPLE_WORDS: usize = 25;

// ================= GbE frames =================

/// Largest fragment payload in 64-bit words.
pub const DEFAULT_FRAGMENT_CAPACITY: usize = 994;
/// Ethernet minimum payload in bytes; shorter payloads are padded.
pub const MIN_PAYLOAD_BYTES: usize = 64;

/// Preamble + start-of-frame delimiter (first symbol carries the K flag).
pub const PREAMBLE: [u32; 4] = [0x1_55fb, 0x5555, 0x5555, 0xd555];
/// End of frame + carrier extend.
pub const EOF_SYMBOL: u32 = 0x3_f7fd;
/// Inter-frame idle.
pub const IDLE_SYMBOL: u32 = 0x1_50bc;
pub const IDLE_COUNT: usize = 7;
/// Bit 16 of a symbol marks a control character.
pub const CONTROL_FLAG: u32 = 0x1_0000;

/// First padding half-word; the low byte carries the payload byte count.
pub const FILLER_FIRST: u16 = 0xff00;
pub const FILLER: u16 = 0xffff;

/// Address header length in half-words (src 3 + dst 3 + type 1).
pub const ADDRESS_HEADER_HALFWORDS: usize = 7;

pub const DEFAULT_SOURCE_MAC: u64 = 0xdbdb_dbdb_dbdb;
pub const DEFAULT_DESTINATION_MAC: u64 = 0x0015_1714_809e;
pub const DEFAULT_ETHER_TYPE: u16 = 0x0800;

// ================= Comparator defaults =================

/// Spy FIFO depth of the firmware that produced the spy captures.
pub const DEFAULT_CAPTURE_CAP: usize = 1023;
/// Leading events within which one stream may skip ahead to align ids.
pub const DEFAULT_SYNC_WINDOW: usize = 1000;
/// Sub-blocks excluded from resync comparison, as (crate, board).
pub const DEFAULT_IGNORED_ORIGINS: &[(u8, u8)] = &[(1, 1), (12, 1)];
