//! compare/dump.rs
//! Side-by-side hex dump of two word sequences.
//!
//! ```text
//! 0x0018:   9000 9000 9000 9000  ----  9000 9000 9000 9000  <=== DMB header (crate 1 DMB 3)
//! ```

use std::fmt;

use crate::types::Word;
use crate::unpack::annotate_words;
use crate::utils::fmt_word_lanes;

const BLANK_SIDE: &str = "                   ";

/// One rendered dump line. `mismatch` marks lines where both sides exist and
/// differ; the front end decides how to highlight them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpLine {
    pub offset: usize,
    pub text: String,
    pub mismatch: bool,
}

impl fmt::Display for DumpLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Dump `a` and `b` word by word, annotated with DMB structure.
/// Labels come from `a` where it has one, otherwise from `b`.
pub fn dump_words(a: &[Word], b: &[Word]) -> Vec<DumpLine> {
    let labels_a = annotate_words(a);
    let labels_b = annotate_words(b);
    let len = a.len().max(b.len());

    (0..len)
        .map(|i| {
            let left = a.get(i).map_or_else(|| BLANK_SIDE.to_string(), |&w| fmt_word_lanes(w));
            let right = b.get(i).map_or_else(String::new, |&w| fmt_word_lanes(w));
            let mut text = format!("{:#06x}:   {left}  ----  {right}", i * 8);

            let label = labels_a
                .get(i)
                .copied()
                .flatten()
                .or_else(|| labels_b.get(i).copied().flatten());
            if let Some(label) = label {
                text.push_str(&format!("  <=== {label}"));
            }

            let mismatch = matches!((a.get(i), b.get(i)), (Some(x), Some(y)) if x != y);
            DumpLine { offset: i * 8, text, mismatch }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_both_sides_and_flags_mismatch() {
        let lines = dump_words(&[0x0001_0002_0003_0004, 5], &[0x0001_0002_0003_0004, 6]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "0x0000:   0001 0002 0003 0004  ----  0001 0002 0003 0004");
        assert!(!lines[0].mismatch);
        assert!(lines[1].mismatch);
        assert!(lines[1].text.starts_with("0x0008:"));
    }

    #[test]
    fn missing_side_is_blank_and_not_a_mismatch() {
        let lines = dump_words(&[1], &[1, 2]);
        assert_eq!(lines[1].text, format!("0x0008:   {BLANK_SIDE}  ----  0000 0000 0000 0002"));
        assert!(!lines[1].mismatch);
    }

    #[test]
    fn annotates_dmb_header() {
        let lines = dump_words(&[0x9000_9000_9000_9000, 0xa000_a000_a013_a000], &[]);
        assert!(lines[0].text.ends_with("<=== DMB header (crate 1 DMB 3)"));
        assert!(lines[1].text.ends_with("<=== DMB header 2"));
    }
}
