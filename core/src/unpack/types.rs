use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BOARD_ID_MASK, BOARD_ID_SHIFT, CRATE_ID_MASK, CRATE_ID_SHIFT, MIN_SUB_BLOCK_WORDS,
};
use crate::types::Word;

/// Readout board identity: (crate id, DMB id).
///
/// Serialized as a `[crate, board]` pair so ignore lists read naturally in
/// config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(u8, u8)", into = "(u8, u8)")]
pub struct OriginId {
    pub crate_id: u8,
    pub board_id: u8,
}

impl OriginId {
    pub const fn new(crate_id: u8, board_id: u8) -> Self {
        Self { crate_id, board_id }
    }

    /// Extract from the second word of a sub-block.
    #[inline]
    pub const fn from_word(word: Word) -> Self {
        Self {
            crate_id: ((word >> CRATE_ID_SHIFT) & CRATE_ID_MASK) as u8,
            board_id: ((word >> BOARD_ID_SHIFT) & BOARD_ID_MASK) as u8,
        }
    }
}

impl From<(u8, u8)> for OriginId {
    fn from((crate_id, board_id): (u8, u8)) -> Self {
        Self { crate_id, board_id }
    }
}

impl From<OriginId> for (u8, u8) {
    fn from(o: OriginId) -> Self {
        (o.crate_id, o.board_id)
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crate {} DMB {}", self.crate_id, self.board_id)
    }
}

/// One board's portion of an event payload. Borrows from its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubBlock<'a> {
    /// Offset of the marker word within the event.
    pub start: usize,
    pub words: &'a [Word],
    pub origin: OriginId,
}

impl<'a> SubBlock<'a> {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn end(&self) -> usize {
        self.start + self.words.len()
    }

    pub fn is_too_short(&self) -> bool {
        self.words.len() < MIN_SUB_BLOCK_WORDS
    }
}

/// Non-fatal structural finding while splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SplitIssue {
    /// Sub-block shorter than the minimum DMB header + trailer.
    TooShort { origin: OriginId, start: usize, len: usize },
}

impl fmt::Display for SplitIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitIssue::TooShort { origin, start, len } => write!(
                f,
                "DMB block too short ({origin}, at word {start}, {len} words)"
            ),
        }
    }
}

/// Sub-blocks of one event plus anything flagged along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitResult<'a> {
    pub blocks: Vec<SubBlock<'a>>,
    pub issues: Vec<SplitIssue>,
}
