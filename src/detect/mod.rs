//! Dialect detection from a bounded input sample.
//!
//! Detection is heuristic: when no clean answer exists the result is
//! `None` (or a default dialect setting), never an error.

pub mod delimiter;
pub mod terminator;

use std::io::{Chain, Cursor, Read};

use crate::dialect::{Dialect, LineTerminator};
use crate::encoding::detect_and_transcode;
use crate::error::Result;
use crate::reader::Reader;
use crate::sample::{Sample, SampleSize};

use self::delimiter::detect_delimiter;
use self::terminator::detect_line_terminator;

/// Default number of lines examined for delimiter detection.
pub const DEFAULT_MAX_LINES: usize = 100;

/// Infers the delimiter and row terminator of unknown input.
///
/// # Example
///
/// ```
/// use csv_dialect::{Detector, LineTerminator};
///
/// let detector = Detector::new();
/// let sample = b"name;city\r\nAlice;Paris\r\n";
/// assert_eq!(detector.detect_delimiter(sample, '"'), Some(';'));
/// assert_eq!(detector.detect_terminator(sample), Some(LineTerminator::CRLF));
/// ```
#[derive(Debug, Clone)]
pub struct Detector {
    /// Sample size for detection.
    sample_size: SampleSize,
    /// Maximum number of lines examined for delimiters.
    max_lines: usize,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector {
    /// Create a detector with a 128 KiB sample window.
    pub fn new() -> Self {
        Self {
            sample_size: SampleSize::default(),
            max_lines: DEFAULT_MAX_LINES,
        }
    }

    /// Set the sample size.
    pub fn sample_size(&mut self, sample_size: SampleSize) -> &mut Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the maximum number of lines examined for delimiters.
    pub fn max_lines(&mut self, max_lines: usize) -> &mut Self {
        self.max_lines = max_lines.max(1);
        self
    }

    /// Detect the row terminator of a sample.
    ///
    /// Returns `None` for an empty sample.
    pub fn detect_terminator(&self, sample: &[u8]) -> Option<LineTerminator> {
        let (text, _) = detect_and_transcode(self.window(sample));
        let terminator = detect_line_terminator(&text);
        log::debug!("detected line terminator {terminator:?}");
        terminator
    }

    /// Detect the field delimiter of a sample, ignoring runes enclosed in
    /// `enclosure` quotes.
    ///
    /// Returns `None` when the sample is empty or has no candidate.
    pub fn detect_delimiter(&self, sample: &[u8], enclosure: char) -> Option<char> {
        let window = self.window(sample);
        let truncated = window.len() < sample.len() || self.fills_window(window);
        self.delimiter_of(window, enclosure, truncated)
    }

    /// Sample `reader` and detect its row terminator.
    ///
    /// A read failure is treated like an empty sample.
    pub fn detect_terminator_in<R: Read>(&self, reader: R) -> Option<LineTerminator> {
        match Sample::read(reader, self.sample_size) {
            Ok(sample) => self.detect_terminator(sample.bytes()),
            Err(e) => {
                log::warn!("could not sample input for terminator detection: {e}");
                None
            }
        }
    }

    /// Sample `reader` and detect its field delimiter.
    ///
    /// A read failure is treated like an empty sample.
    pub fn detect_delimiter_in<R: Read>(&self, reader: R, enclosure: char) -> Option<char> {
        match Sample::read(reader, self.sample_size) {
            Ok(sample) => self.delimiter_of(sample.bytes(), enclosure, sample.is_truncated()),
            Err(e) => {
                log::warn!("could not sample input for delimiter detection: {e}");
                None
            }
        }
    }

    /// Build a dialect from a sample.
    ///
    /// Detected settings override the defaults of [`Dialect::default`]; an
    /// undetectable delimiter or terminator keeps the default.
    pub fn detect_dialect(&self, sample: &[u8]) -> Result<Dialect> {
        self.dialect_of(sample, self.fills_window(sample))
    }

    /// Sample `reader`, detect its dialect and return a reader over the
    /// whole input, sample included.
    pub fn sniff<R: Read>(&self, reader: R) -> Result<(Dialect, Reader<Chain<Cursor<Vec<u8>>, R>>)> {
        let sample = Sample::read(reader, self.sample_size)?;
        let dialect = self.dialect_of(sample.bytes(), sample.is_truncated())?;
        let reader = Reader::with_dialect(sample.into_reader(), dialect.clone());
        Ok((dialect, reader))
    }

    fn dialect_of(&self, sample: &[u8], truncated: bool) -> Result<Dialect> {
        let defaults = Dialect::default();
        let mut builder = defaults.to_builder();
        if let Some(delimiter) = self.delimiter_of(sample, defaults.quote(), truncated) {
            builder.delimiter(delimiter);
        }
        if let Some(terminator) = self.detect_terminator(sample) {
            builder.line_terminator(terminator);
        }
        builder.build()
    }

    fn delimiter_of(&self, sample: &[u8], enclosure: char, truncated: bool) -> Option<char> {
        let (text, _) = detect_and_transcode(sample);
        detect_delimiter(&text, Some(enclosure), self.max_lines, truncated)
    }

    /// The bounded prefix examined by byte-capped detection.
    fn window<'a>(&self, sample: &'a [u8]) -> &'a [u8] {
        match self.sample_size.bytes() {
            Some(n) if n < sample.len() => &sample[..n],
            _ => sample,
        }
    }

    fn fills_window(&self, sample: &[u8]) -> bool {
        self.sample_size.bytes().is_some_and(|n| sample.len() >= n)
    }
}
