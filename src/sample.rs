//! Bounded, replayable input samples for detection.

use std::io::{self, Chain, Cursor, Read};

/// Default detection window: 128 KiB.
pub const DEFAULT_SAMPLE_BYTES: usize = 128 * 1024;

/// Sample size configuration for detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    /// Sample at most this many bytes.
    Bytes(usize),
    /// Sample until this many line breaks have been seen (or end of input).
    Lines(usize),
    /// Read the entire input.
    ///
    /// # Warning
    ///
    /// This loads the entire input into memory. For large inputs prefer
    /// [`SampleSize::Bytes`] with a reasonable limit.
    All,
}

impl Default for SampleSize {
    fn default() -> Self {
        SampleSize::Bytes(DEFAULT_SAMPLE_BYTES)
    }
}

impl SampleSize {
    /// Returns the byte cap, or None for other modes.
    pub fn bytes(&self) -> Option<usize> {
        match self {
            SampleSize::Bytes(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the line count, or None for other modes.
    pub fn lines(&self) -> Option<usize> {
        match self {
            SampleSize::Lines(n) => Some(*n),
            _ => None,
        }
    }
}

/// Bytes read eagerly from the head of a source, plus the rest of it.
///
/// Detection only looks at [`bytes`](Self::bytes); parsing should go through
/// [`into_reader`](Self::into_reader), which replays the sample before the
/// unread remainder so no input is lost on sources that cannot seek.
#[derive(Debug)]
pub struct Sample<R> {
    bytes: Vec<u8>,
    truncated: bool,
    rest: R,
}

impl<R: Read> Sample<R> {
    /// Read a sample of `size` from `reader`.
    pub fn read(mut reader: R, size: SampleSize) -> io::Result<Self> {
        let mut bytes = Vec::new();
        let truncated = match size {
            SampleSize::Bytes(n) => {
                reader.by_ref().take(n as u64).read_to_end(&mut bytes)?;
                bytes.len() == n
            }
            SampleSize::All => {
                reader.read_to_end(&mut bytes)?;
                false
            }
            SampleSize::Lines(n) => read_lines(&mut reader, &mut bytes, n)?,
        };
        Ok(Self {
            bytes,
            truncated,
            rest: reader,
        })
    }

    /// The sampled bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns true if the sample may have stopped before end of input.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// A reader over the whole input: the sample, then the remainder.
    pub fn into_reader(self) -> Chain<Cursor<Vec<u8>>, R> {
        Cursor::new(self.bytes).chain(self.rest)
    }
}

/// Read chunks until `n` line breaks are buffered, or until
/// `n * DEFAULT_SAMPLE_BYTES` bytes have been read without finding them.
/// Returns true if reading stopped before end of input.
///
/// `\n`, `\r` and `\r\n` each end one line.
fn read_lines<R: Read>(reader: &mut R, bytes: &mut Vec<u8>, n: usize) -> io::Result<bool> {
    const CHUNK: usize = 8 * 1024;

    let limit = DEFAULT_SAMPLE_BYTES.saturating_mul(n.max(1));
    let mut lines = 0;
    while lines < n {
        if bytes.len() >= limit {
            return Ok(true);
        }
        let start = bytes.len();
        let want = CHUNK.min(limit - start) as u64;
        let read = reader.by_ref().take(want).read_to_end(bytes)?;
        if read == 0 {
            return Ok(false);
        }
        lines += count_line_breaks(bytes, start);
    }
    Ok(true)
}

/// Line breaks ending in `bytes[start..]`, given that `bytes[..start]` was
/// already counted. A `\r\n` split across the boundary is not counted twice.
fn count_line_breaks(bytes: &[u8], start: usize) -> usize {
    let chunk = &bytes[start..];
    let pairs = bytes[start.saturating_sub(1)..]
        .windows(2)
        .filter(|w| *w == b"\r\n")
        .count();
    bytecount::count(chunk, b'\n') + bytecount::count(chunk, b'\r') - pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_bytes_replays_everything() {
        let data = b"a,b\n1,2\n3,4\n";
        let sample = Sample::read(&data[..], SampleSize::Bytes(5)).unwrap();
        assert_eq!(sample.bytes(), b"a,b\n1");
        assert!(sample.is_truncated());

        let mut replay = Vec::new();
        sample.into_reader().read_to_end(&mut replay).unwrap();
        assert_eq!(replay, data);
    }

    #[test]
    fn test_sample_shorter_than_cap() {
        let sample = Sample::read(&b"a,b\n"[..], SampleSize::default()).unwrap();
        assert_eq!(sample.bytes(), b"a,b\n");
        assert!(!sample.is_truncated());
    }

    #[test]
    fn test_sample_lines() {
        let data = "x\n".repeat(10_000);
        let sample = Sample::read(data.as_bytes(), SampleSize::Lines(3)).unwrap();
        assert!(sample.bytes().len() >= 6);
        assert!(sample.is_truncated());

        let mut replay = String::new();
        sample.into_reader().read_to_string(&mut replay).unwrap();
        assert_eq!(replay, data);
    }

    #[test]
    fn test_sample_lines_counts_carriage_returns() {
        let data = "x\r".repeat(200_000);
        let sample = Sample::read(data.as_bytes(), SampleSize::Lines(5)).unwrap();
        assert!(sample.bytes().len() <= 8 * 1024);
        assert!(sample.is_truncated());

        let mut replay = String::new();
        sample.into_reader().read_to_string(&mut replay).unwrap();
        assert_eq!(replay, data);
    }

    #[test]
    fn test_sample_lines_counts_crlf_once() {
        let sample = Sample::read(&b"a\r\nb\r\n"[..], SampleSize::Lines(3)).unwrap();
        assert_eq!(sample.bytes(), b"a\r\nb\r\n");
        assert!(!sample.is_truncated());

        assert_eq!(count_line_breaks(b"a\r\nb\r", 0), 2);
        // The '\n' completes a CRLF whose '\r' was counted already.
        assert_eq!(count_line_breaks(b"a\r\nb\r\nc", 5), 0);
    }

    #[test]
    fn test_sample_lines_without_line_breaks_is_bounded() {
        let data = vec![b'x'; DEFAULT_SAMPLE_BYTES * 2 + 10];
        let sample = Sample::read(&data[..], SampleSize::Lines(1)).unwrap();
        assert_eq!(sample.bytes().len(), DEFAULT_SAMPLE_BYTES);
        assert!(sample.is_truncated());
    }

    #[test]
    fn test_sample_all() {
        let sample = Sample::read(&b"abc"[..], SampleSize::All).unwrap();
        assert_eq!(sample.bytes(), b"abc");
        assert_eq!(SampleSize::All.bytes(), None);
        assert_eq!(SampleSize::Lines(4).lines(), Some(4));
    }
}
