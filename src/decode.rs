//! Incremental decoding of a byte stream into runes.
//!
//! The streaming counterpart of [`crate::encoding::normalize`]: the first
//! bytes are sniffed for a BOM, then the rest of the stream is transcoded
//! chunk by chunk with an `encoding_rs` decoder that never substitutes
//! replacement characters.

use std::io::{self, Read};

use encoding_rs::{Decoder, DecoderResult, Encoding, UTF_8};

use crate::encoding::{is_utf16, malformed, sniff_bom};
use crate::error::{EncodingError, EncodingErrorKind, Result};
use crate::unreader::RuneSource;

const CHUNK_SIZE: usize = 8 * 1024;

/// Decodes an `io::Read` into UTF-8 runes.
pub struct DecodeReader<R> {
    inner: R,
    fallback: &'static Encoding,
    encoding: &'static Encoding,
    decoder: Option<Decoder>,
    raw: Vec<u8>,
    text: String,
    pos: usize,
    /// Raw bytes handed to the decoder so far, BOM included.
    offset: u64,
    bom_len: usize,
    eof: bool,
    finished: bool,
    failed: Option<EncodingError>,
}

impl<R: Read> DecodeReader<R> {
    /// Create a decoder that treats BOM-less input as UTF-8.
    pub fn new(inner: R) -> Self {
        Self::with_encoding(inner, UTF_8)
    }

    /// Create a decoder that treats BOM-less input as `fallback`.
    ///
    /// A BOM at the start of the stream always takes precedence.
    pub fn with_encoding(inner: R, fallback: &'static Encoding) -> Self {
        Self {
            inner,
            fallback,
            encoding: fallback,
            decoder: None,
            raw: Vec::with_capacity(CHUNK_SIZE),
            text: String::new(),
            pos: 0,
            offset: 0,
            bom_len: 0,
            eof: false,
            finished: false,
            failed: None,
        }
    }

    /// The encoding in use. Only final once the first rune has been read.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Number of BOM bytes skipped at the start of the stream.
    pub fn bom_len(&self) -> usize {
        self.bom_len
    }

    /// Consumes the decoder, returning the underlying reader.
    ///
    /// Bytes already buffered but not yet returned as runes are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read the next rune, or `None` at end of input.
    pub fn read_char(&mut self) -> Result<Option<char>> {
        loop {
            if let Some(c) = self.text[self.pos..].chars().next() {
                self.pos += c.len_utf8();
                return Ok(Some(c));
            }
            if let Some(err) = &self.failed {
                return Err(err.clone().into());
            }
            if self.finished {
                return Ok(None);
            }
            self.fill()?;
        }
    }

    fn fill(&mut self) -> Result<()> {
        self.text.clear();
        self.pos = 0;
        if self.decoder.is_none() {
            self.sniff()?;
        } else if !self.eof {
            self.read_chunk()?;
        }
        self.decode();
        Ok(())
    }

    fn read_chunk(&mut self) -> io::Result<()> {
        let start = self.raw.len();
        self.raw.resize(start + CHUNK_SIZE, 0);
        let n = loop {
            match self.inner.read(&mut self.raw[start..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.raw.truncate(start);
                    return Err(e);
                }
            }
        };
        self.raw.truncate(start + n);
        if n == 0 {
            self.eof = true;
        }
        Ok(())
    }

    fn sniff(&mut self) -> io::Result<()> {
        while self.raw.len() < 3 && !self.eof {
            self.read_chunk()?;
        }
        let (encoding, bom_len) = sniff_bom(&self.raw).unwrap_or((self.fallback, 0));
        log::trace!("decoding stream as {} (BOM length {bom_len})", encoding.name());

        self.raw.drain(..bom_len);
        self.bom_len = bom_len;
        self.offset = bom_len as u64;
        self.encoding = encoding;
        self.decoder = Some(encoding.new_decoder_without_bom_handling());
        Ok(())
    }

    fn decode(&mut self) {
        let Some(decoder) = self.decoder.as_mut() else {
            return;
        };
        let last = self.eof;
        let needed = decoder
            .max_utf8_buffer_length_without_replacement(self.raw.len())
            .unwrap_or(self.raw.len().saturating_mul(3));
        self.text.reserve(needed);

        let mut consumed = 0;
        loop {
            let (result, read) = decoder.decode_to_string_without_replacement(
                &self.raw[consumed..],
                &mut self.text,
                last,
            );
            consumed += read;
            match result {
                DecoderResult::InputEmpty => break,
                DecoderResult::OutputFull => self.text.reserve(self.raw.len() - consumed + 16),
                DecoderResult::Malformed(bad, extra) => {
                    let end = self.offset + consumed as u64;
                    let start = end.saturating_sub(u64::from(bad) + u64::from(extra));
                    let body_len = end - self.bom_len as u64;
                    let mut err = malformed(self.encoding, start);
                    if last && is_utf16(self.encoding) && body_len % 2 == 1 && start + 1 >= end {
                        err.kind = EncodingErrorKind::OddLength;
                    }
                    self.failed = Some(err);
                    break;
                }
            }
        }

        self.offset += consumed as u64;
        self.raw.drain(..consumed);
        if last {
            self.finished = true;
        }
    }
}

impl<R: Read> RuneSource for DecodeReader<R> {
    fn next_rune(&mut self) -> Result<Option<char>> {
        self.read_char()
    }
}
