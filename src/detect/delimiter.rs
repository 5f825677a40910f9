//! Field delimiter detection by per-line frequency consistency.
//!
//! Every rune outside the non-delimiter class (letters, digits, line
//! breaks) and outside quoted regions is a candidate. A candidate's score
//! is the number of sampled lines on which it occurs exactly its modal
//! number of times.

use std::cmp::Ordering;
use std::mem;
use std::sync::LazyLock;

use foldhash::{HashMap, HashMapExt, HashSet, HashSetExt};
use rayon::prelude::*;
use regex::Regex;

/// Runes that are never delimiters.
static NON_DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{Alphabetic}\p{N}\r\n]$").expect("Invalid non-delimiter pattern")
});

/// Returns true if `c` may act as a field delimiter.
pub fn is_potential_delimiter(c: char) -> bool {
    let mut buf = [0u8; 4];
    !NON_DELIMITER.is_match(c.encode_utf8(&mut buf))
}

/// Score of one delimiter candidate over the sampled lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateScore {
    /// The candidate rune.
    pub delimiter: char,
    /// Lines on which the candidate occurs exactly `mode` times.
    pub consistent_lines: usize,
    /// Number of sampled lines.
    pub lines: usize,
    /// Most common non-zero per-line count.
    pub mode: usize,
    /// Total occurrences across sampled lines.
    pub total: usize,
    /// Position in first-seen order.
    pub first_seen: usize,
}

impl CandidateScore {
    /// Fraction of lines with the modal count.
    pub fn consistency(&self) -> f64 {
        if self.lines == 0 {
            return 0.0;
        }
        self.consistent_lines as f64 / self.lines as f64
    }

    /// Ranking: consistency, then comma, then frequency, then first seen.
    fn rank(&self, other: &Self) -> Ordering {
        self.consistent_lines
            .cmp(&other.consistent_lines)
            .then_with(|| (self.delimiter == ',').cmp(&(other.delimiter == ',')))
            .then_with(|| self.total.cmp(&other.total))
            .then_with(|| other.first_seen.cmp(&self.first_seen))
    }
}

/// Per-line candidate counts gathered from a sample.
#[derive(Debug, Default)]
struct Tally {
    lines: Vec<HashMap<char, usize>>,
    order: Vec<char>,
}

/// Count candidate runes per line, skipping quoted regions.
///
/// Blank lines are ignored. When `truncated` is set the last line is
/// assumed to be cut off and is dropped, unless it is the only one.
fn tally(text: &str, enclosure: Option<char>, max_lines: usize, truncated: bool) -> Tally {
    let mut tally = Tally::default();
    let mut classes: HashMap<char, bool> = HashMap::new();
    let mut seen: HashSet<char> = HashSet::new();
    let mut current: HashMap<char, usize> = HashMap::new();
    let mut line_len = 0;
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if Some(c) == enclosure {
            in_quotes = !in_quotes;
            line_len += 1;
            continue;
        }
        if !in_quotes && (c == '\n' || c == '\r') {
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            if line_len > 0 {
                tally.lines.push(mem::take(&mut current));
                if tally.lines.len() >= max_lines {
                    return tally;
                }
            }
            line_len = 0;
            continue;
        }
        line_len += 1;
        if in_quotes {
            continue;
        }
        if *classes.entry(c).or_insert_with(|| is_potential_delimiter(c)) {
            *current.entry(c).or_insert(0) += 1;
            if seen.insert(c) {
                tally.order.push(c);
            }
        }
    }

    if line_len > 0 && (!truncated || tally.lines.is_empty()) {
        tally.lines.push(current);
    }
    tally
}

fn score_candidate(delimiter: char, first_seen: usize, lines: &[HashMap<char, usize>]) -> CandidateScore {
    let counts: Vec<usize> = lines
        .iter()
        .map(|line| line.get(&delimiter).copied().unwrap_or(0))
        .collect();

    let mut freq: HashMap<usize, usize> = HashMap::with_capacity(counts.len());
    for &count in counts.iter().filter(|&&count| count > 0) {
        *freq.entry(count).or_insert(0) += 1;
    }
    // Deterministic tie-break: prefer the higher count.
    let mode = freq
        .into_iter()
        .max_by(|(count_a, n_a), (count_b, n_b)| n_a.cmp(n_b).then_with(|| count_a.cmp(count_b)))
        .map_or(0, |(count, _)| count);

    CandidateScore {
        delimiter,
        consistent_lines: counts.iter().filter(|&&count| count == mode).count(),
        lines: counts.len(),
        mode,
        total: counts.iter().sum(),
        first_seen,
    }
}

/// Score every candidate delimiter in `text`, best first.
pub fn score_delimiters(
    text: &str,
    enclosure: Option<char>,
    max_lines: usize,
    truncated: bool,
) -> Vec<CandidateScore> {
    let tally = tally(text, enclosure, max_lines.max(1), truncated);
    let mut scores: Vec<CandidateScore> = tally
        .order
        .par_iter()
        .enumerate()
        .map(|(i, &c)| score_candidate(c, i, &tally.lines))
        .filter(|score| score.mode > 0)
        .collect();
    scores.sort_by(|a, b| b.rank(a));
    scores
}

/// Detect the most likely field delimiter in `text`.
///
/// Returns `None` when the text is empty or contains no candidate.
pub fn detect_delimiter(
    text: &str,
    enclosure: Option<char>,
    max_lines: usize,
    truncated: bool,
) -> Option<char> {
    let scores = score_delimiters(text, enclosure, max_lines, truncated);
    if let Some(best) = scores.first() {
        log::debug!(
            "delimiter {:?}: consistency {:.2} over {} lines, {} occurrences",
            best.delimiter,
            best.consistency(),
            best.lines,
            best.total
        );
    }
    scores.first().map(|score| score.delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> Option<char> {
        detect_delimiter(text, Some('"'), 100, false)
    }

    #[test]
    fn test_is_potential_delimiter() {
        for c in ['a', 'A', '1', 'é', 'Ω', '٣', '\n', '\r'] {
            assert!(!is_potential_delimiter(c), "{c:?}");
        }
        for c in ['|', '$', ',', ';', '\t', ' ', '¦'] {
            assert!(is_potential_delimiter(c), "{c:?}");
        }
    }

    #[test]
    fn test_detect_common_delimiters() {
        assert_eq!(detect("a,b,c\n1,2,3\n4,5,6\n"), Some(','));
        assert_eq!(detect("name;age;city\nAlice;30;New York\nBob;25;LA\n"), Some(';'));
        assert_eq!(detect("name\tage\nAlice\t30\n"), Some('\t'));
        assert_eq!(detect("a|b|c\nd|e|f\n"), Some('|'));
        assert_eq!(detect("a b c\nd e f\n"), Some(' '));
    }

    #[test]
    fn test_alphanumeric_content_selects_comma() {
        assert_eq!(detect("abc,def,123\nghi,jkl,456\n"), Some(','));
    }

    #[test]
    fn test_quoted_regions_are_ignored() {
        let text = "\"x,y\"|z\n\"p,q,r\"|s\n\"t\"|u\n";
        assert_eq!(detect(text), Some('|'));
    }

    #[test]
    fn test_comma_wins_ties() {
        assert_eq!(detect("a;b,c\n"), Some(','));
        assert_eq!(detect("a;b;c|d\n"), Some(';'));
    }

    #[test]
    fn test_consistency_beats_frequency() {
        let text = "id,score\n1,95.5\n2,87.2\n3,66\n";
        let scores = score_delimiters(text, Some('"'), 100, false);
        assert_eq!(scores[0].delimiter, ',');
        assert_eq!(scores[0].consistent_lines, 4);
        assert_eq!(scores[1].delimiter, '.');
    }

    #[test]
    fn test_undetectable() {
        assert_eq!(detect(""), None);
        assert_eq!(detect("abc\ndef\n"), None);
    }

    #[test]
    fn test_truncated_last_line_is_dropped() {
        // The cut-off tail would otherwise make ';' look inconsistent.
        let text = "a;b;c\nd;e;f\ng;h";
        let scores = score_delimiters(text, None, 100, true);
        assert_eq!(scores[0].lines, 2);
        assert_eq!(scores[0].consistent_lines, 2);
    }

    #[test]
    fn test_max_lines() {
        let text = "a,b\nc,d\ne;f;g;h\n";
        let scores = score_delimiters(text, None, 2, false);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].delimiter, ',');
    }
}
