use bytes::{BufMut, BytesMut};
use tracing::debug;

use crate::constants::{
    EOF_SYMBOL, FILLER, FILLER_FIRST, IDLE_COUNT, IDLE_SYMBOL, MIN_PAYLOAD_BYTES, PREAMBLE,
    WORD_BYTES,
};
use crate::framing::types::{AddressHeader, Fragment, Frame, FrameError, FrameOptions, Symbol};
use crate::types::Word;
use crate::utils::{compute_crc32, word_lanes};

/// Symbols plus the CRC input they contribute to.
struct FrameBuffer {
    symbols: Vec<Symbol>,
    crc_input: BytesMut,
}

impl FrameBuffer {
    fn with_capacity(halfwords: usize) -> Self {
        Self {
            symbols: Vec::with_capacity(halfwords),
            crc_input: BytesMut::with_capacity(halfwords * 2),
        }
    }

    /// Half-word covered by the CRC.
    fn push_covered(&mut self, hw: u16) {
        self.symbols.push(hw as Symbol);
        self.crc_input.put_u16_le(hw);
    }

    /// Symbol outside the CRC (preamble, CRC itself, EOF, idles).
    fn push_raw(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    fn crc(&self) -> u32 {
        compute_crc32(&self.crc_input)
    }
}

/// Split event words into fragments of at most `capacity` words.
///
/// Counters start at `first_counter` and wrap at 0xFFFF. An empty event still
/// yields one (empty, last) fragment.
pub fn partition(
    words: &[Word],
    capacity: usize,
    first_counter: u16,
) -> Result<Vec<Fragment<'_>>, FrameError> {
    if capacity == 0 {
        return Err(FrameError::ZeroCapacity);
    }

    if words.is_empty() {
        return Ok(vec![Fragment {
            index: 0,
            counter: first_counter,
            last: true,
            words,
        }]);
    }

    let count = words.len().div_ceil(capacity);
    Ok(words
        .chunks(capacity)
        .enumerate()
        .map(|(index, chunk)| Fragment {
            index,
            counter: first_counter.wrapping_add(index as u16),
            last: index + 1 == count,
            words: chunk,
        })
        .collect())
}

/// Encode one fragment.
///
/// Layout:
///
/// ```text
/// [ preamble + SFD (4) ]                      not covered
/// [ src MAC (3) | dst MAC (3) | type (1) ]    optional, covered
/// [ payload, 4 half-words per word, low first ] covered
/// [ padding up to 64 payload bytes ]          covered
/// [ fragment counter (1) ]                    covered
/// [ CRC low (1) | CRC high (1) ]
/// [ EOF / carrier extend (1) ]
/// [ idle (7) ]                                optional
/// ```
pub fn encode_fragment(fragment: &Fragment<'_>, options: &FrameOptions) -> Frame {
    let mut buf = FrameBuffer::with_capacity(fragment.words.len() * 4 + 48);

    // --- Preamble ---
    for &p in &PREAMBLE {
        buf.push_raw(p);
    }

    // --- Address header ---
    if let Some(header) = &options.address_header {
        for hw in header.halfwords() {
            buf.push_covered(hw);
        }
    }

    // --- Payload ---
    for &word in fragment.words {
        for lane in word_lanes(word) {
            buf.push_covered(lane);
        }
    }

    // --- Padding ---
    let mut bytes_pushed = fragment.words.len() * WORD_BYTES;
    let mut first_filler = true;
    while bytes_pushed < MIN_PAYLOAD_BYTES {
        if first_filler {
            buf.push_covered(FILLER_FIRST | bytes_pushed as u16);
            first_filler = false;
        } else {
            buf.push_covered(FILLER);
        }
        bytes_pushed += 2;
    }

    // --- Counter ---
    buf.push_covered(fragment.counter);

    // --- CRC ---
    let crc = buf.crc();
    buf.push_raw(crc & 0xffff);
    buf.push_raw(crc >> 16);

    // --- EOF / idles ---
    buf.push_raw(EOF_SYMBOL);
    if options.idle_fill {
        for _ in 0..IDLE_COUNT {
            buf.push_raw(IDLE_SYMBOL);
        }
    }

    Frame {
        counter: fragment.counter,
        fragment_index: fragment.index,
        last: fragment.last,
        payload_words: fragment.words.len(),
        crc,
        symbols: buf.symbols,
    }
}

/// Plain Ethernet frame around caller-supplied half-words: no padding and no
/// fragment counter.
pub fn encode_ethernet_frame(header: &AddressHeader, payload: &[u16]) -> Vec<Symbol> {
    let mut buf = FrameBuffer::with_capacity(payload.len() + 16);
    for &p in &PREAMBLE {
        buf.push_raw(p);
    }
    for hw in header.halfwords() {
        buf.push_covered(hw);
    }
    for &hw in payload {
        buf.push_covered(hw);
    }
    let crc = buf.crc();
    buf.push_raw(crc & 0xffff);
    buf.push_raw(crc >> 16);
    buf.push_raw(EOF_SYMBOL);
    buf.symbols
}

/// Re-encodes event words into frames. Owns the running fragment counter,
/// which carries across events.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    options: FrameOptions,
    next_counter: u16,
}

impl FrameAssembler {
    pub fn new(options: FrameOptions) -> Result<Self, FrameError> {
        Self::with_counter(options, 0)
    }

    /// Start the fragment counter at `counter`.
    pub fn with_counter(options: FrameOptions, counter: u16) -> Result<Self, FrameError> {
        if options.fragment_capacity == 0 {
            return Err(FrameError::ZeroCapacity);
        }
        Ok(Self { options, next_counter: counter })
    }

    pub fn options(&self) -> &FrameOptions {
        &self.options
    }

    /// Counter the next fragment will carry.
    pub fn next_counter(&self) -> u16 {
        self.next_counter
    }

    /// Fragments `words` would be split into, without advancing the counter.
    pub fn fragments<'a>(&self, words: &'a [Word]) -> Vec<Fragment<'a>> {
        // capacity validated in the constructor
        partition(words, self.options.fragment_capacity, self.next_counter).unwrap_or_default()
    }

    /// Encode one event into frames, in fragment order.
    pub fn assemble(&mut self, words: &[Word]) -> Vec<Frame> {
        let fragments = self.fragments(words);
        let frames: Vec<Frame> = fragments
            .iter()
            .map(|f| encode_fragment(f, &self.options))
            .collect();

        self.next_counter = self.next_counter.wrapping_add(frames.len() as u16);
        debug!(
            words = words.len(),
            frames = frames.len(),
            next_counter = self.next_counter,
            "event assembled"
        );
        frames
    }
}
