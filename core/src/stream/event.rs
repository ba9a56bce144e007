use crate::constants::{
    DDU_TRAILER2, DDU_TRAILER_LEN, MIN_EVENT_WORDS, SEQUENCE_ID_MASK, SEQUENCE_ID_SHIFT,
};
use crate::types::{SequenceId, Word};

/// L1A id embedded in a first header word.
#[inline]
pub const fn sequence_id_of(header1: Word) -> SequenceId {
    ((header1 >> SEQUENCE_ID_SHIFT) & SEQUENCE_ID_MASK) as SequenceId
}

/// One detector readout unit, header word 1 through the last trailer word.
///
/// `complete` is set by the scanner only when the trailer was read in full;
/// a partial event is what was collected before the source ran dry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    words: Vec<Word>,
    complete: bool,
}

impl Event {
    pub fn new(words: Vec<Word>, complete: bool) -> Self {
        Self { words, complete }
    }

    /// Complete event from words that are known to be whole (tests, spy files).
    pub fn from_words(words: Vec<Word>) -> Self {
        Self { words, complete: true }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn into_words(self) -> Vec<Word> {
        self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// L1A id from the first header word; `None` for an empty event.
    pub fn sequence_id(&self) -> Option<SequenceId> {
        self.words.first().map(|&w| sequence_id_of(w))
    }

    /// At least the minimum header + trailer length.
    pub fn has_min_len(&self) -> bool {
        self.words.len() >= MIN_EVENT_WORDS
    }

    /// Trailer-2 sentinel sits where a complete event puts it.
    pub fn has_trailer(&self) -> bool {
        self.words.len() >= DDU_TRAILER_LEN
            && self.words[self.words.len() - DDU_TRAILER_LEN] == DDU_TRAILER2
    }

    /// Words between the header and the trailer region.
    pub fn payload_end(&self) -> usize {
        self.words.len().saturating_sub(DDU_TRAILER_LEN)
    }
}

impl AsRef<[Word]> for Event {
    fn as_ref(&self) -> &[Word] {
        &self.words
    }
}
