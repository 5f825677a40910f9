//! Byte-order mark handling and transcoding to UTF-8 using `encoding_rs`.
//!
//! [`normalize`] is the strict path used before parsing: invalid input is an
//! error located by byte offset. [`detect_and_transcode`] is the lossy path
//! used for detection samples, where a best guess beats a failure.

use std::borrow::Cow;

use chardetng::EncodingDetector;
use encoding_rs::{DecoderResult, Encoding, UTF_16BE, UTF_16LE, UTF_8};
use simdutf8::basic::from_utf8;

use crate::error::{EncodingError, EncodingErrorKind, Result};

/// Sniff a byte-order mark, returning its encoding and length in bytes.
///
/// Recognizes UTF-8 (`EF BB BF`), UTF-16LE (`FF FE`) and UTF-16BE (`FE FF`).
pub fn sniff_bom(data: &[u8]) -> Option<(&'static Encoding, usize)> {
    Encoding::for_bom(data)
}

/// UTF-8 text produced by [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized<'a> {
    /// The decoded text, borrowed when the input was already UTF-8.
    pub text: Cow<'a, str>,
    /// Number of leading BOM bytes consumed (0 if none).
    pub bom_len: usize,
    /// The encoding the input was decoded from.
    pub encoding: &'static Encoding,
}

impl Normalized<'_> {
    /// Returns true if the input had to be transcoded.
    pub fn was_transcoded(&self) -> bool {
        matches!(self.text, Cow::Owned(_))
    }
}

/// Normalize raw bytes to UTF-8, assuming UTF-8 when there is no BOM.
///
/// A UTF-8 BOM is stripped. A UTF-16 BOM selects UTF-16 decoding with the
/// BOM's byte order. Without a BOM the input must be valid UTF-8.
pub fn normalize(data: &[u8]) -> Result<Normalized<'_>> {
    normalize_with(data, UTF_8)
}

/// Normalize raw bytes to UTF-8, decoding BOM-less input as `fallback`.
///
/// This is how BOM-less UTF-16 input is read: declare `UTF_16LE` or
/// `UTF_16BE` as the fallback.
pub fn normalize_with<'a>(
    data: &'a [u8],
    fallback: &'static Encoding,
) -> Result<Normalized<'a>> {
    let (encoding, bom_len) = sniff_bom(data).unwrap_or((fallback, 0));
    let body = &data[bom_len..];

    if encoding == UTF_8 {
        let text = simdutf8::compat::from_utf8(body).map_err(|e| EncodingError {
            encoding: UTF_8.name(),
            offset: (bom_len + e.valid_up_to()) as u64,
            kind: EncodingErrorKind::InvalidSequence,
        })?;
        return Ok(Normalized {
            text: Cow::Borrowed(text),
            bom_len,
            encoding,
        });
    }

    if is_utf16(encoding) && body.len() % 2 != 0 {
        return Err(EncodingError {
            encoding: encoding.name(),
            offset: (data.len() - 1) as u64,
            kind: EncodingErrorKind::OddLength,
        }
        .into());
    }

    let text = decode_strict(encoding, body, bom_len as u64)?;
    Ok(Normalized {
        text: Cow::Owned(text),
        bom_len,
        encoding,
    })
}

/// Decode a complete buffer without replacement characters.
fn decode_strict(encoding: &'static Encoding, body: &[u8], base: u64) -> Result<String> {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(body.len())
        .unwrap_or(body.len().saturating_mul(3));
    let mut out = String::with_capacity(capacity);
    let mut consumed = 0;

    loop {
        let (result, read) =
            decoder.decode_to_string_without_replacement(&body[consumed..], &mut out, true);
        consumed += read;
        match result {
            DecoderResult::InputEmpty => return Ok(out),
            DecoderResult::OutputFull => out.reserve(body.len() - consumed + 16),
            DecoderResult::Malformed(bad, extra) => {
                let start = consumed.saturating_sub(bad as usize + extra as usize);
                return Err(malformed(encoding, base + start as u64).into());
            }
        }
    }
}

/// Build the error for a malformed sequence at `offset`.
pub(crate) fn malformed(encoding: &'static Encoding, offset: u64) -> EncodingError {
    let kind = if is_utf16(encoding) {
        EncodingErrorKind::UnpairedSurrogate
    } else {
        EncodingErrorKind::InvalidSequence
    };
    EncodingError {
        encoding: encoding.name(),
        offset,
        kind,
    }
}

pub(crate) fn is_utf16(encoding: &'static Encoding) -> bool {
    encoding == UTF_16LE || encoding == UTF_16BE
}

/// Detect the encoding of data and transcode to UTF-8 if necessary.
///
/// Unlike [`normalize`] this never fails: malformed sequences become
/// U+FFFD. A BOM is honored and stripped; BOM-less data that is not valid
/// UTF-8 is guessed with chardetng, which covers legacy encodings such as
/// Windows-1251 or GBK.
///
/// Returns (`text`, `was_transcoded`).
pub fn detect_and_transcode(data: &[u8]) -> (Cow<'_, str>, bool) {
    if let Some((encoding, bom_len)) = sniff_bom(data) {
        let (decoded, _) = encoding.decode_without_bom_handling(&data[bom_len..]);
        return (decoded, encoding != UTF_8);
    }

    if let Ok(text) = from_utf8(data) {
        return (Cow::Borrowed(text), false);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(data, true);
    let encoding = detector.guess(None, true);
    log::trace!("sample is not UTF-8, guessed {}", encoding.name());

    let (decoded, _) = encoding.decode_without_bom_handling(data);
    (decoded, encoding != UTF_8)
}
