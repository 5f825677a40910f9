//! Dialect: the formatting rules shared by a [`Reader`](crate::Reader) and
//! [`Writer`](crate::Writer) for one stream.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Which fields a writer wraps in quote characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quoting {
    /// Quote every field.
    All,
    /// Quote only fields containing special characters.
    #[default]
    Minimal,
    /// Quote every field that is not a numeric literal.
    NonNumeric,
    /// Never quote; escape special characters instead.
    None,
}

impl FromStr for Quoting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Quoting::All),
            "minimal" => Ok(Quoting::Minimal),
            "nonnumeric" | "non-numeric" => Ok(Quoting::NonNumeric),
            "none" => Ok(Quoting::None),
            _ => Err(Error::config(format!("unknown quoting mode {s:?}"))),
        }
    }
}

impl fmt::Display for Quoting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quoting::All => write!(f, "all"),
            Quoting::Minimal => write!(f, "minimal"),
            Quoting::NonNumeric => write!(f, "nonnumeric"),
            Quoting::None => write!(f, "none"),
        }
    }
}

/// How a quote character inside a quoted field is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DoubleQuote {
    /// A quote is written as two quotes.
    #[default]
    On,
    /// A quote is preceded by the escape character.
    Off,
}

/// Line terminator sequences.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineTerminator {
    /// Unix-style line ending (\n).
    #[default]
    LF,
    /// Windows-style line ending (\r\n).
    CRLF,
    /// Old Mac-style line ending (\r).
    CR,
}

impl LineTerminator {
    /// Returns the terminator sequence.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::LF => "\n",
            LineTerminator::CRLF => "\r\n",
            LineTerminator::CR => "\r",
        }
    }

    /// Returns the byte sequence for this line terminator.
    pub const fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    /// Returns the escaped representation, e.g. `\r\n`.
    pub const fn escaped(&self) -> &'static str {
        match self {
            LineTerminator::LF => "\\n",
            LineTerminator::CRLF => "\\r\\n",
            LineTerminator::CR => "\\r",
        }
    }

    pub(crate) const fn first(&self) -> char {
        match self {
            LineTerminator::LF => '\n',
            LineTerminator::CRLF | LineTerminator::CR => '\r',
        }
    }

    /// The rest of the sequence after [`first`](Self::first).
    pub(crate) const fn rest(&self) -> &'static str {
        match self {
            LineTerminator::CRLF => "\n",
            LineTerminator::LF | LineTerminator::CR => "",
        }
    }
}

impl FromStr for LineTerminator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "\n" | "\\n" => return Ok(LineTerminator::LF),
            "\r\n" | "\\r\\n" => return Ok(LineTerminator::CRLF),
            "\r" | "\\r" => return Ok(LineTerminator::CR),
            _ => {}
        }
        match s.to_ascii_lowercase().as_str() {
            "lf" => Ok(LineTerminator::LF),
            "crlf" => Ok(LineTerminator::CRLF),
            "cr" => Ok(LineTerminator::CR),
            _ => Err(Error::config(format!("unknown line terminator {s:?}"))),
        }
    }
}

impl fmt::Display for LineTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.escaped())
    }
}

/// The formatting conventions of a CSV file.
///
/// Immutable once built; construct one with [`Dialect::builder`]. The
/// delimiter, quote and escape characters are pairwise distinct, and none of
/// them is a line break.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dialect {
    delimiter: char,
    quote: char,
    escape: Option<char>,
    quoting: Quoting,
    double_quote: DoubleQuote,
    line_terminator: LineTerminator,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            escape: None,
            quoting: Quoting::Minimal,
            double_quote: DoubleQuote::On,
            line_terminator: LineTerminator::LF,
        }
    }
}

impl Dialect {
    /// Start building a dialect from the defaults.
    pub fn builder() -> DialectBuilder {
        DialectBuilder::new()
    }

    /// Comma-separated values with `"` quoting and `\n` terminators.
    pub fn csv() -> Self {
        Self::default()
    }

    /// Tab-separated values with `"` quoting and `\n` terminators.
    pub fn tsv() -> Self {
        Self {
            delimiter: '\t',
            ..Self::default()
        }
    }

    /// Field delimiter character.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Quote character.
    pub fn quote(&self) -> char {
        self.quote
    }

    /// Escape character, if any.
    pub fn escape(&self) -> Option<char> {
        self.escape
    }

    /// Quoting mode used when writing.
    pub fn quoting(&self) -> Quoting {
        self.quoting
    }

    /// Double-quote mode.
    pub fn double_quote(&self) -> DoubleQuote {
        self.double_quote
    }

    /// Line terminator.
    pub fn line_terminator(&self) -> LineTerminator {
        self.line_terminator
    }

    /// A builder seeded with this dialect's settings.
    pub fn to_builder(&self) -> DialectBuilder {
        DialectBuilder {
            delimiter: self.delimiter,
            quote: self.quote,
            escape: self.escape,
            quoting: self.quoting,
            double_quote: self.double_quote,
            line_terminator: self.line_terminator,
        }
    }

    pub(crate) fn is_escape(&self, c: char) -> bool {
        self.escape == Some(c)
    }
}

/// Builder for [`Dialect`].
///
/// # Example
///
/// ```
/// use csv_dialect::{Dialect, LineTerminator, Quoting};
///
/// let dialect = Dialect::builder()
///     .delimiter(';')
///     .quoting(Quoting::All)
///     .line_terminator(LineTerminator::CRLF)
///     .build()
///     .unwrap();
/// assert_eq!(dialect.delimiter(), ';');
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectBuilder {
    delimiter: char,
    quote: char,
    escape: Option<char>,
    quoting: Quoting,
    double_quote: DoubleQuote,
    line_terminator: LineTerminator,
}

impl Default for DialectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectBuilder {
    /// Create a builder with the default dialect settings.
    pub fn new() -> Self {
        Dialect::default().to_builder()
    }

    /// Set the field delimiter.
    pub fn delimiter(&mut self, delimiter: char) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the quote character.
    pub fn quote(&mut self, quote: char) -> &mut Self {
        self.quote = quote;
        self
    }

    /// Set or clear the escape character.
    pub fn escape(&mut self, escape: Option<char>) -> &mut Self {
        self.escape = escape;
        self
    }

    /// Set the quoting mode.
    pub fn quoting(&mut self, quoting: Quoting) -> &mut Self {
        self.quoting = quoting;
        self
    }

    /// Set the double-quote mode.
    pub fn double_quote(&mut self, double_quote: DoubleQuote) -> &mut Self {
        self.double_quote = double_quote;
        self
    }

    /// Set the line terminator.
    pub fn line_terminator(&mut self, line_terminator: LineTerminator) -> &mut Self {
        self.line_terminator = line_terminator;
        self
    }

    /// Validate the settings and build the dialect.
    pub fn build(&self) -> Result<Dialect> {
        let specials = [
            ("delimiter", Some(self.delimiter)),
            ("quote", Some(self.quote)),
            ("escape", self.escape),
        ];
        for (name, c) in specials {
            if matches!(c, Some('\r' | '\n')) {
                return Err(Error::config(format!("{name} must not be a line break")));
            }
        }
        if self.delimiter == self.quote {
            return Err(Error::config(format!(
                "delimiter and quote are both {:?}",
                self.delimiter
            )));
        }
        if let Some(escape) = self.escape {
            if escape == self.delimiter {
                return Err(Error::config(format!("delimiter and escape are both {escape:?}")));
            }
            if escape == self.quote {
                return Err(Error::config(format!("quote and escape are both {escape:?}")));
            }
        } else {
            if self.quoting == Quoting::None {
                return Err(Error::config("quoting none requires an escape character"));
            }
            if self.double_quote == DoubleQuote::Off {
                return Err(Error::config("double quote off requires an escape character"));
            }
        }

        Ok(Dialect {
            delimiter: self.delimiter,
            quote: self.quote,
            escape: self.escape,
            quoting: self.quoting,
            double_quote: self.double_quote,
            line_terminator: self.line_terminator,
        })
    }
}
