use crate::constants::{
    ADDRESS_HEADER_HALFWORDS, EOF_SYMBOL, FILLER, FILLER_FIRST, IDLE_SYMBOL, MIN_PAYLOAD_BYTES,
    PREAMBLE,
};
use crate::framing::types::{is_control, Frame, FrameError, Symbol};
use crate::types::Word;
use crate::utils::{crc32_halfwords, word_from_lanes};

/// Borrowed-free view of a decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub counter: u16,
    pub address: Option<[u16; ADDRESS_HEADER_HALFWORDS]>,
    pub payload: Vec<Word>,
    pub crc: u32,
    /// Idle symbols after the EOF.
    pub idles: usize,
}

/// Payload length in half-words once padding is removed.
///
/// Padding only exists when the body is exactly the minimum size; it starts
/// with `0xff00 | n` at byte offset `n` (a whole number of words) and
/// continues with `0xffff`.
///
/// The frame carries no length field, so this is a heuristic: a full
/// 8-word payload whose tail reads like padding (e.g. a last word of
/// `0xffff_ffff_ffff_ff38`) decodes as the shorter padded payload. Events
/// with such a tail do not survive an encode/decode round trip.
fn unpadded_len(body: &[u16]) -> usize {
    if body.len() * 2 != MIN_PAYLOAD_BYTES {
        return body.len();
    }
    (0..body.len())
        .step_by(4)
        .find(|&k| {
            body[k] == FILLER_FIRST | (k * 2) as u16 && body[k + 1..].iter().all(|&h| h == FILLER)
        })
        .unwrap_or(body.len())
}

/// Decode one frame's symbols.
///
/// Caller guarantees:
/// - `symbols` holds exactly one frame (trailing idles allowed)
/// - `has_address_header` matches how the frame was assembled
pub fn decode_frame(symbols: &[Symbol], has_address_header: bool) -> Result<DecodedFrame, FrameError> {
    let header_len = if has_address_header { ADDRESS_HEADER_HALFWORDS } else { 0 };

    // --- idles ---
    let idles = symbols.iter().rev().take_while(|&&s| s == IDLE_SYMBOL).count();
    let end = symbols.len() - idles;

    // preamble + header + counter + crc(2) + eof
    if end < PREAMBLE.len() + header_len + 4 {
        return Err(FrameError::Truncated { len: symbols.len() });
    }

    // --- preamble ---
    for (index, (&found, &want)) in symbols.iter().zip(PREAMBLE.iter()).enumerate() {
        if found != want {
            return Err(FrameError::BadPreamble { index, found });
        }
    }

    // --- eof + crc ---
    if symbols[end - 1] != EOF_SYMBOL {
        return Err(FrameError::MissingEof { found: symbols[end - 1] });
    }
    let carried = (symbols[end - 3] & 0xffff) | ((symbols[end - 2] & 0xffff) << 16);

    // --- covered region ---
    let covered_start = PREAMBLE.len();
    let covered_end = end - 3;
    let mut covered = Vec::with_capacity(covered_end - covered_start);
    for (i, &s) in symbols[covered_start..covered_end].iter().enumerate() {
        if is_control(s) {
            return Err(FrameError::UnexpectedControl {
                index: covered_start + i,
                found: s,
            });
        }
        covered.push(s as u16);
    }

    let computed = crc32_halfwords(&covered);
    if computed != carried {
        return Err(FrameError::ChecksumMismatch { carried, computed });
    }

    let address = has_address_header.then(|| {
        let mut a = [0u16; ADDRESS_HEADER_HALFWORDS];
        a.copy_from_slice(&covered[..ADDRESS_HEADER_HALFWORDS]);
        a
    });

    let (&counter, rest) = covered[header_len..]
        .split_last()
        .ok_or(FrameError::Truncated { len: symbols.len() })?;

    // --- payload ---
    let body = &rest[..unpadded_len(rest)];
    if body.len() % 4 != 0 {
        return Err(FrameError::BadPayloadLength { halfwords: body.len() });
    }
    let payload = body
        .chunks_exact(4)
        .map(|c| word_from_lanes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(DecodedFrame {
        counter,
        address,
        payload,
        crc: carried,
        idles,
    })
}

/// Decode a batch of frames and concatenate their payloads.
pub fn decode_frames(frames: &[Frame], has_address_header: bool) -> Result<Vec<Word>, FrameError> {
    let mut out = Vec::new();
    for frame in frames {
        out.extend(decode_frame(&frame.symbols, has_address_header)?.payload);
    }
    Ok(out)
}
