//! Quote-aware record reader.

use std::io::Read;
use std::mem;

use encoding_rs::{Encoding, UTF_8};

use crate::decode::DecodeReader;
use crate::dialect::{Dialect, DoubleQuote};
use crate::error::{Error, MalformedKind, Result};
use crate::unreader::Unreader;

/// One row: an ordered sequence of fields.
pub type Record = Vec<String>;

/// Parser states. Each transition consumes at most one rune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartField,
    InUnquotedField,
    InQuotedField,
    QuoteInQuotedField,
    EndOfField,
    EndOfRecord,
    EndOfInput,
}

/// Reads records from a byte stream under a [`Dialect`].
///
/// The stream is decoded as it is read: a UTF-8 or UTF-16 BOM is honored,
/// BOM-less input is UTF-8 unless another encoding is declared with
/// [`Reader::with_encoding`].
///
/// # Example
///
/// ```
/// use csv_dialect::Reader;
///
/// let mut reader = Reader::new("a,\"b,c\"\n1,2\n".as_bytes());
/// assert_eq!(reader.read().unwrap(), Some(vec!["a".to_string(), "b,c".to_string()]));
/// assert_eq!(reader.read().unwrap(), Some(vec!["1".to_string(), "2".to_string()]));
/// assert_eq!(reader.read().unwrap(), None);
/// ```
pub struct Reader<R> {
    input: Unreader<DecodeReader<R>>,
    dialect: Dialect,
    records: u64,
}

impl<R: Read> Reader<R> {
    /// Create a reader using the default dialect.
    pub fn new(rdr: R) -> Self {
        Self::with_dialect(rdr, Dialect::default())
    }

    /// Create a reader using `dialect`.
    pub fn with_dialect(rdr: R, dialect: Dialect) -> Self {
        Self::with_encoding(rdr, dialect, UTF_8)
    }

    /// Create a reader that decodes BOM-less input as `encoding`.
    pub fn with_encoding(rdr: R, dialect: Dialect, encoding: &'static Encoding) -> Self {
        Self {
            input: Unreader::new(DecodeReader::with_encoding(rdr, encoding)),
            dialect,
            records: 0,
        }
    }

    /// The dialect this reader parses.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Number of records returned so far.
    pub fn records_read(&self) -> u64 {
        self.records
    }

    /// Read exactly one record, or `None` once the input is exhausted.
    ///
    /// An empty line is a record with one empty field. The final record
    /// does not need a trailing line terminator.
    pub fn read(&mut self) -> Result<Option<Record>> {
        let quote = self.dialect.quote();
        let delimiter = self.dialect.delimiter();
        let double_quote = self.dialect.double_quote() == DoubleQuote::On;

        let mut record = Record::new();
        let mut field = String::new();
        let mut state = State::StartField;

        loop {
            state = match state {
                State::StartField => match self.input.read_rune()? {
                    None if record.is_empty() => return Ok(None),
                    None => {
                        record.push(String::new());
                        State::EndOfInput
                    }
                    Some(c) if c == quote => State::InQuotedField,
                    Some(c) if c == delimiter => {
                        record.push(String::new());
                        State::StartField
                    }
                    Some(c) if self.at_terminator(c)? => {
                        record.push(String::new());
                        State::EndOfRecord
                    }
                    Some(c) => {
                        self.input.unread_rune(c);
                        State::InUnquotedField
                    }
                },
                State::InUnquotedField => match self.input.read_rune()? {
                    None => {
                        record.push(mem::take(&mut field));
                        State::EndOfInput
                    }
                    Some(c) if c == delimiter => {
                        record.push(mem::take(&mut field));
                        State::StartField
                    }
                    Some(c) if self.dialect.is_escape(c) => {
                        self.read_escaped(&mut field)?;
                        State::InUnquotedField
                    }
                    Some(c) if self.at_terminator(c)? => {
                        record.push(mem::take(&mut field));
                        State::EndOfRecord
                    }
                    Some(c) => {
                        field.push(c);
                        State::InUnquotedField
                    }
                },
                State::InQuotedField => match self.input.read_rune()? {
                    None => return Err(self.malformed(MalformedKind::UnterminatedQuote)),
                    Some(c) if c == quote => State::QuoteInQuotedField,
                    Some(c) if self.dialect.is_escape(c) => {
                        self.read_escaped(&mut field)?;
                        State::InQuotedField
                    }
                    Some(c) => {
                        field.push(c);
                        State::InQuotedField
                    }
                },
                State::QuoteInQuotedField => match self.input.read_rune()? {
                    Some(c) if c == quote && double_quote => {
                        field.push(c);
                        State::InQuotedField
                    }
                    Some(c) => {
                        self.input.unread_rune(c);
                        State::EndOfField
                    }
                    None => State::EndOfField,
                },
                State::EndOfField => match self.input.read_rune()? {
                    None => {
                        record.push(mem::take(&mut field));
                        State::EndOfInput
                    }
                    Some(c) if c == delimiter => {
                        record.push(mem::take(&mut field));
                        State::StartField
                    }
                    Some(c) if self.at_terminator(c)? => {
                        record.push(mem::take(&mut field));
                        State::EndOfRecord
                    }
                    // Text after the closing quote continues the field.
                    Some(c) => {
                        self.input.unread_rune(c);
                        State::InUnquotedField
                    }
                },
                State::EndOfRecord | State::EndOfInput => {
                    self.records += 1;
                    return Ok(Some(record));
                }
            };
        }
    }

    /// Read records until end of input.
    ///
    /// Stops at the first error; use [`records`](Self::records) to keep the
    /// records read before it.
    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        self.records().collect()
    }

    /// Iterate over the remaining records.
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            reader: self,
            done: false,
        }
    }

    /// Consumes the reader, returning the underlying byte source.
    pub fn into_inner(self) -> R {
        self.input.into_inner().into_inner()
    }

    /// Returns true if `c` starts the line terminator and the rest of the
    /// terminator follows, consuming it.
    fn at_terminator(&mut self, c: char) -> Result<bool> {
        let terminator = self.dialect.line_terminator();
        Ok(c == terminator.first() && self.input.accept_str(terminator.rest())?)
    }

    fn read_escaped(&mut self, field: &mut String) -> Result<()> {
        match self.input.read_rune()? {
            Some(c) => {
                field.push(c);
                Ok(())
            }
            None => Err(self.malformed(MalformedKind::TrailingEscape)),
        }
    }

    fn malformed(&self, kind: MalformedKind) -> Error {
        Error::MalformedRecord {
            record: self.records + 1,
            kind,
        }
    }
}

/// Iterator over records, created by [`Reader::records`].
///
/// Yields at most one error, then ends.
pub struct Records<'r, R> {
    reader: &'r mut Reader<R>,
    done: bool,
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
