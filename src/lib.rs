//! csv-dialect: dialect-configurable CSV reading, writing and detection
//!
//! A reader/writer pair converting between byte streams and records (rows
//! of string fields), parameterized by a [`Dialect`] describing the
//! delimiter, quote and escape characters, quoting mode and line
//! terminator, plus a [`Detector`] that infers the delimiter and row
//! terminator of unknown input from a bounded sample.
//!
//! # Quick Start
//!
//! ```
//! use csv_dialect::{Dialect, Quoting, Reader, Writer};
//!
//! let dialect = Dialect::builder()
//!     .delimiter(';')
//!     .quoting(Quoting::NonNumeric)
//!     .build()
//!     .unwrap();
//!
//! let mut writer = Writer::with_dialect(Vec::new(), dialect.clone());
//! writer.write_record(["Alice", "30", "Paris; France"]).unwrap();
//! let bytes = writer.into_inner().unwrap();
//! assert_eq!(bytes, b"\"Alice\";30;\"Paris; France\"\n");
//!
//! let mut reader = Reader::with_dialect(&bytes[..], dialect);
//! let record = reader.read().unwrap().unwrap();
//! assert_eq!(record, ["Alice", "30", "Paris; France"]);
//! ```
//!
//! # Detection
//!
//! ```
//! use csv_dialect::{Detector, LineTerminator};
//!
//! let data = "id|name\r\n1|Ada\r\n2|Grace\r\n".as_bytes();
//! let (dialect, mut reader) = Detector::new().sniff(data).unwrap();
//! assert_eq!(dialect.delimiter(), '|');
//! assert_eq!(dialect.line_terminator(), LineTerminator::CRLF);
//! assert_eq!(reader.read_all().unwrap().len(), 3);
//! ```
//!
//! # Encodings
//!
//! Input is decoded before parsing. A UTF-8 byte-order mark is stripped,
//! a UTF-16 BOM (either byte order) selects UTF-16 transcoding, and input
//! without a BOM must be valid UTF-8 unless another encoding is declared.
//! See [`normalize`] for the whole-buffer form of the same rules.

mod decode;
pub mod detect;
mod dialect;
mod encoding;
mod error;
mod numeric;
mod reader;
mod sample;
mod unreader;
mod writer;

pub use detect::Detector;
pub use dialect::{Dialect, DialectBuilder, DoubleQuote, LineTerminator, Quoting};
pub use error::{EncodingError, EncodingErrorKind, Error, MalformedKind, Result};
pub use reader::{Reader, Record, Records};
pub use sample::{DEFAULT_SAMPLE_BYTES, Sample, SampleSize};
pub use writer::Writer;

// Re-export for advanced usage
pub use decode::DecodeReader;
pub use encoding::{Normalized, detect_and_transcode, normalize, normalize_with, sniff_bom};
pub use numeric::is_numeric;
pub use unreader::{RuneSource, Unreader};
