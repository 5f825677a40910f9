//! Record writer, the inverse of [`Reader`](crate::Reader).

use std::io::{BufWriter, Write};

use crate::dialect::{Dialect, DoubleQuote, Quoting};
use crate::error::{Error, Result};
use crate::numeric::is_numeric;

/// Writes records to a byte sink under a [`Dialect`].
///
/// Output is UTF-8 without a BOM, buffered until [`flush`](Self::flush),
/// [`into_inner`](Self::into_inner) or drop. Records are terminated by the
/// dialect's line terminator exactly.
///
/// # Example
///
/// ```
/// use csv_dialect::Writer;
///
/// let mut writer = Writer::new(Vec::new());
/// writer.write_record(["a", "b,c", "d\"e"]).unwrap();
/// let out = writer.into_inner().unwrap();
/// assert_eq!(out, b"a,\"b,c\",\"d\"\"e\"\n");
/// ```
pub struct Writer<W: Write> {
    wtr: BufWriter<W>,
    dialect: Dialect,
    line: String,
}

impl<W: Write> Writer<W> {
    /// Create a writer using the default dialect.
    pub fn new(wtr: W) -> Self {
        Self::with_dialect(wtr, Dialect::default())
    }

    /// Create a writer using `dialect`.
    pub fn with_dialect(wtr: W, dialect: Dialect) -> Self {
        Self {
            wtr: BufWriter::new(wtr),
            dialect,
            line: String::new(),
        }
    }

    /// The dialect this writer produces.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Write one record followed by the line terminator.
    ///
    /// A record with a single empty field is written as a quoted empty
    /// string (unless quoting is [`Quoting::None`]) so it is not mistaken
    /// for a blank line. A record with no fields is a bare terminator and
    /// reads back as one empty field, so it is the one record that does not
    /// survive a round trip through [`Reader`](crate::Reader) unchanged.
    pub fn write_record<I, S>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: Vec<S> = record.into_iter().collect();
        let sole = fields.len() == 1;

        self.line.clear();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.line.push(self.dialect.delimiter());
            }
            self.push_field(field.as_ref(), sole);
        }
        self.line.push_str(self.dialect.line_terminator().as_str());

        self.wtr.write_all(self.line.as_bytes())?;
        Ok(())
    }

    /// Write every record in `records`.
    pub fn write_records<I, T, S>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Flush buffered output to the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }

    /// Flush and return the underlying sink.
    pub fn into_inner(self) -> Result<W> {
        self.wtr
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }

    fn push_field(&mut self, field: &str, sole: bool) {
        let quote = match self.dialect.quoting() {
            Quoting::All => true,
            Quoting::Minimal => self.needs_quotes(field) || (sole && field.is_empty()),
            Quoting::NonNumeric => self.needs_quotes(field) || !is_numeric(field),
            Quoting::None => {
                self.push_escaped(field);
                return;
            }
        };
        if quote {
            self.push_quoted(field);
        } else {
            self.line.push_str(field);
        }
    }

    fn is_special(&self, c: char) -> bool {
        c == self.dialect.delimiter()
            || c == self.dialect.quote()
            || self.dialect.is_escape(c)
            || c == '\r'
            || c == '\n'
    }

    fn needs_quotes(&self, field: &str) -> bool {
        field.chars().any(|c| self.is_special(c))
    }

    fn push_quoted(&mut self, field: &str) {
        let quote = self.dialect.quote();
        let escape = self.dialect.escape();
        let double_quote = self.dialect.double_quote() == DoubleQuote::On;

        self.line.push(quote);
        for c in field.chars() {
            if c == quote {
                match escape {
                    Some(escape) if !double_quote => self.line.push(escape),
                    _ => self.line.push(quote),
                }
            } else if escape == Some(c) {
                self.line.push(c);
            }
            self.line.push(c);
        }
        self.line.push(quote);
    }

    fn push_escaped(&mut self, field: &str) {
        for c in field.chars() {
            if let Some(escape) = self.dialect.escape()
                && self.is_special(c)
            {
                self.line.push(escape);
            }
            self.line.push(c);
        }
    }
}
