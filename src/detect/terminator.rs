//! Row terminator detection.

use crate::dialect::LineTerminator;

/// Detect the row terminator used in `text`.
///
/// Checks are made in order `\r\n`, `\r`, `\n`; the first sequence present
/// anywhere in the text wins. Text without any line break is assumed to use
/// `\n`. Empty text yields `None`.
pub fn detect_line_terminator(text: &str) -> Option<LineTerminator> {
    if text.is_empty() {
        return None;
    }
    if text.contains("\r\n") {
        Some(LineTerminator::CRLF)
    } else if text.contains('\r') {
        Some(LineTerminator::CR)
    } else {
        Some(LineTerminator::LF)
    }
}
