//! Numeric literal classification for [`Quoting::NonNumeric`](crate::Quoting).

use regex::Regex;
use std::sync::LazyLock;

/// Pattern for decimal numbers, optionally signed, with optional exponent.
static FLOAT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][-+]?[0-9]+)?$")
        .expect("Invalid float pattern")
});

/// Check for a plain integer without the regex.
/// This is the common case for numeric columns.
#[inline]
fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Returns true if `s` is a numeric literal such as `42`, `-3.5` or `1e9`.
///
/// Surrounding whitespace, thousands separators and locale-specific decimal
/// commas are not numeric.
pub fn is_numeric(s: &str) -> bool {
    is_integer(s) || FLOAT_PATTERN.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_literals() {
        for s in ["0", "42", "-7", "+7", "3.14", "-0.5", ".5", "5.", "1e9", "2.5E-3"] {
            assert!(is_numeric(s), "{s} should be numeric");
        }
    }

    #[test]
    fn test_non_numeric() {
        for s in ["", "-", "+", ".", "abc", "1,5", " 1", "1 ", "1e", "e5", "0x10", "١٢"] {
            assert!(!is_numeric(s), "{s:?} should not be numeric");
        }
    }
}
