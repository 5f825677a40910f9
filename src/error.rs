use std::fmt;
use std::io;
use thiserror::Error;

/// Error type for reading, writing and configuring dialects.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error from the underlying source or sink.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Input bytes are not valid for the declared or detected encoding.
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Invalid dialect configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A record could not be parsed.
    #[error("Malformed record {record}: {kind}")]
    MalformedRecord {
        /// 1-based index of the record being read.
        record: u64,
        /// What went wrong.
        kind: MalformedKind,
    },
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Returns true if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Returns true if this is a malformed record error.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedRecord { .. })
    }
}

/// Reason a record is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// Input ended inside a quoted field.
    UnterminatedQuote,
    /// Input ended right after an escape character.
    TrailingEscape,
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedKind::UnterminatedQuote => write!(f, "unterminated quoted field"),
            MalformedKind::TrailingEscape => write!(f, "escape character at end of input"),
        }
    }
}

/// Invalid input for an encoding, located by byte offset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} in {encoding} input at byte offset {offset}")]
pub struct EncodingError {
    /// Name of the encoding being decoded.
    pub encoding: &'static str,
    /// Byte offset into the raw input, BOM included.
    pub offset: u64,
    /// Kind of failure.
    pub kind: EncodingErrorKind,
}

/// Kind of encoding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingErrorKind {
    /// A byte sequence that is not valid in the encoding.
    InvalidSequence,
    /// UTF-16 input with an odd number of bytes.
    OddLength,
    /// UTF-16 surrogate without its pair.
    UnpairedSurrogate,
}

impl fmt::Display for EncodingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingErrorKind::InvalidSequence => write!(f, "invalid byte sequence"),
            EncodingErrorKind::OddLength => write!(f, "odd byte length"),
            EncodingErrorKind::UnpairedSurrogate => write!(f, "unpaired surrogate"),
        }
    }
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
