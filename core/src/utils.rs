use crate::types::Word;

/// CRC-32 (IEEE 802.3) over a byte buffer.
pub fn compute_crc32(data: &[u8]) -> u32 {
    use crc32fast::Hasher;
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// CRC-32 over half-words as they go on the wire (low byte first).
pub fn crc32_halfwords(halfwords: &[u16]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for hw in halfwords {
        hasher.update(&hw.to_le_bytes());
    }
    hasher.finalize()
}

/// Split a word into its four 16-bit lanes, lowest first.
#[inline]
pub const fn word_lanes(word: Word) -> [u16; 4] {
    [
        (word & 0xffff) as u16,
        ((word >> 16) & 0xffff) as u16,
        ((word >> 32) & 0xffff) as u16,
        ((word >> 48) & 0xffff) as u16,
    ]
}

/// Rebuild a word from four lanes, lowest first.
#[inline]
pub const fn word_from_lanes(lanes: [u16; 4]) -> Word {
    (lanes[0] as u64)
        | ((lanes[1] as u64) << 16)
        | ((lanes[2] as u64) << 32)
        | ((lanes[3] as u64) << 48)
}

/// `hhhh hhhh hhhh hhhh`, highest lane first.
pub fn fmt_word_lanes(word: Word) -> String {
    let l = word_lanes(word);
    format!("{:04x} {:04x} {:04x} {:04x}", l[3], l[2], l[1], l[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_round_trip() {
        let w = 0x5000_04ce_7313_4770;
        assert_eq!(word_lanes(w), [0x4770, 0x7313, 0x04ce, 0x5000]);
        assert_eq!(word_from_lanes(word_lanes(w)), w);
    }

    #[test]
    fn lanes_print_high_first() {
        assert_eq!(fmt_word_lanes(0x8000_ffff_8000_8000), "8000 ffff 8000 8000");
    }

    #[test]
    fn halfword_crc_matches_byte_crc() {
        let hws = [0x1234u16, 0xabcd];
        assert_eq!(crc32_halfwords(&hws), compute_crc32(&[0x34, 0x12, 0xcd, 0xab]));
    }
}
