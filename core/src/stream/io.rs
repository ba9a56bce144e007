//! stream/io.rs
//! Normalized byte sources/sinks and the 64-bit word reader/writer over them.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use tracing::warn;

use crate::constants::WORD_BYTES;
use crate::types::{DaqError, Word};

/// Where capture bytes come from.
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

impl InputSource {
    /// `-` is standard input, anything else a file path.
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            InputSource::Reader(Box::new(std::io::stdin()))
        } else {
            InputSource::File(arg.to_path_buf())
        }
    }
}

/// Where capture bytes or text go.
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
}

impl OutputSink {
    /// `-` is standard output, anything else a file path (truncated).
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            OutputSink::Writer(Box::new(std::io::stdout()))
        } else {
            OutputSink::File(arg.to_path_buf())
        }
    }
}

/// Buffered reader over any source. Both the word scanner and the spy text
/// reader take this.
pub fn open_input(src: InputSource) -> Result<Box<dyn BufRead + Send>, DaqError> {
    let reader: Box<dyn BufRead + Send> = match src {
        InputSource::Reader(r) => Box::new(BufReader::new(r)),
        InputSource::File(p) => Box::new(BufReader::new(File::open(p)?)),
        InputSource::Memory(b) => Box::new(Cursor::new(b)),
    };
    Ok(reader)
}

/// Buffered writer over any sink. Callers flush before drop to see errors.
pub fn open_output(sink: OutputSink) -> Result<Box<dyn Write + Send>, DaqError> {
    let writer: Box<dyn Write + Send> = match sink {
        OutputSink::Writer(w) => Box::new(BufWriter::new(w)),
        OutputSink::File(p) => Box::new(BufWriter::new(File::create(p)?)),
    };
    Ok(writer)
}

/// Read up to `buf.len()` bytes, stopping early only at EOF.
/// Returns the number of bytes read.
pub fn read_exact_or_eof<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<usize, DaqError> {
    let mut off = 0;
    while off < buf.len() {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(off)
}

// ================= Words =================

/// Sequential reader of little-endian 64-bit words.
///
/// A trailing partial word is treated as end of stream; its length is kept
/// in `partial_tail` so callers can tell a clean EOF from a cut capture.
#[derive(Debug)]
pub struct WordReader<R: Read> {
    inner: R,
    words_read: u64,
    partial_tail: usize,
    eof: bool,
}

impl<R: Read> WordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            words_read: 0,
            partial_tail: 0,
            eof: false,
        }
    }

    /// Next word, or `None` once the source is exhausted.
    pub fn read_word(&mut self) -> Result<Option<Word>, DaqError> {
        if self.eof {
            return Ok(None);
        }

        let mut buf = [0u8; WORD_BYTES];
        let n = read_exact_or_eof(&mut self.inner, &mut buf)?;
        if n < WORD_BYTES {
            self.eof = true;
            if n > 0 {
                warn!(bytes = n, offset = self.byte_offset(), "stream ends with a partial word");
                self.partial_tail = n;
            }
            return Ok(None);
        }

        self.words_read += 1;
        Ok(Some(LittleEndian::read_u64(&buf)))
    }

    /// Number of complete words consumed so far.
    pub fn words_read(&self) -> u64 {
        self.words_read
    }

    /// Byte offset of the next word.
    pub fn byte_offset(&self) -> u64 {
        self.words_read * WORD_BYTES as u64
    }

    /// Bytes of a trailing partial word (0 if the stream ended cleanly).
    pub fn partial_tail(&self) -> usize {
        self.partial_tail
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Sequential writer of little-endian 64-bit words.
#[derive(Debug)]
pub struct WordWriter<W: Write> {
    out: W,
    words_written: u64,
}

impl<W: Write> WordWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, words_written: 0 }
    }

    pub fn write_word(&mut self, word: Word) -> Result<(), DaqError> {
        self.out.write_u64::<LittleEndian>(word)?;
        self.words_written += 1;
        Ok(())
    }

    pub fn write_words(&mut self, words: &[Word]) -> Result<(), DaqError> {
        for &w in words {
            self.write_word(w)?;
        }
        Ok(())
    }

    pub fn words_written(&self) -> u64 {
        self.words_written
    }

    pub fn flush(&mut self) -> Result<(), DaqError> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Encode words as a little-endian byte buffer.
pub fn words_to_bytes(words: &[Word]) -> Vec<u8> {
    let mut out = vec![0u8; words.len() * WORD_BYTES];
    LittleEndian::write_u64_into(words, &mut out);
    out
}
