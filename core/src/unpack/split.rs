use tracing::warn;

use crate::constants::{DDU_TRAILER_LEN, DMB_HEADER1, DMB_MARKER_MASK};
use crate::stream::Event;
use crate::types::Word;
use crate::unpack::types::{OriginId, SplitIssue, SplitResult, SubBlock};

/// `true` for a DMB header (sub-block start) word.
#[inline]
pub const fn is_sub_header(word: Word) -> bool {
    (word & DMB_MARKER_MASK) == DMB_HEADER1
}

/// Offsets of every sub-block start marker, in order.
pub fn marker_positions(words: &[Word]) -> Vec<usize> {
    words
        .iter()
        .enumerate()
        .filter(|(_, w)| is_sub_header(**w))
        .map(|(i, _)| i)
        .collect()
}

/// Split an event into its sub-blocks.
pub fn split(event: &Event) -> Vec<SubBlock<'_>> {
    split_words(event.words()).blocks
}

/// Split an event into its sub-blocks, flagging short ones.
pub fn split_checked(event: &Event) -> SplitResult<'_> {
    split_words(event.words())
}

/// Split raw event words.
///
/// Blocks run from one marker to the next; the last one runs to the start of
/// the trailer region (`len - 3`). A marker inside the trailer region yields an
/// empty final block rather than an inverted range.
pub fn split_words(words: &[Word]) -> SplitResult<'_> {
    let markers = marker_positions(words);
    let mut result = SplitResult::default();

    let Some(&last) = markers.last() else {
        return result;
    };

    let payload_end = words.len().saturating_sub(DDU_TRAILER_LEN).max(last);
    let ends = markers.iter().skip(1).copied().chain(std::iter::once(payload_end));

    for (start, end) in markers.iter().copied().zip(ends) {
        let slice = &words[start..end];
        let origin = slice
            .get(1)
            .map_or(OriginId::new(0, 0), |&w| OriginId::from_word(w));
        let block = SubBlock { start, words: slice, origin };

        if block.is_too_short() {
            warn!(%origin, start, len = block.len(), "DMB block too short");
            result.issues.push(SplitIssue::TooShort {
                origin,
                start,
                len: block.len(),
            });
        }
        result.blocks.push(block);
    }

    result
}
