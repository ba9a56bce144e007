use crate::framing::types::{Frame, ReadbackOutcome, Symbol};

/// Compare the symbols a frame should produce with what the transmit path
/// reports back. Stops at the first difference.
pub fn verify_readback(expected: &[Symbol], read: &[Symbol]) -> ReadbackOutcome {
    if expected.len() != read.len() {
        return ReadbackOutcome::LengthMismatch {
            expected: expected.len(),
            read: read.len(),
        };
    }

    expected
        .iter()
        .zip(read)
        .position(|(e, r)| e != r)
        .map_or(ReadbackOutcome::Match, |index| ReadbackOutcome::SymbolMismatch {
            index,
            expected: expected[index],
            read: read[index],
        })
}

impl Frame {
    /// Self-test: compare this frame against symbols read back.
    pub fn verify_readback(&self, read: &[Symbol]) -> ReadbackOutcome {
        verify_readback(&self.symbols, read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sequences_match() {
        assert!(verify_readback(&[1, 2, 3], &[1, 2, 3]).is_match());
    }

    #[test]
    fn reports_first_differing_index() {
        assert_eq!(
            verify_readback(&[1, 2, 3, 4], &[1, 2, 9, 8]),
            ReadbackOutcome::SymbolMismatch { index: 2, expected: 3, read: 9 }
        );
    }

    #[test]
    fn length_is_checked_first() {
        assert_eq!(
            verify_readback(&[1, 2], &[1]),
            ReadbackOutcome::LengthMismatch { expected: 2, read: 1 }
        );
    }
}
