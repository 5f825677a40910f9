//! Rune cursor with push-back and lookahead.

use std::str::Chars;

use crate::error::Result;

/// A source of runes consumed by an [`Unreader`].
pub trait RuneSource {
    /// Returns the next rune, or `None` when the source is exhausted.
    fn next_rune(&mut self) -> Result<Option<char>>;
}

impl RuneSource for Chars<'_> {
    fn next_rune(&mut self) -> Result<Option<char>> {
        Ok(self.next())
    }
}

/// A rune cursor supporting push-back and multi-rune lookahead.
///
/// Pushed-back runes live on a LIFO stack and are returned before any
/// further input is pulled from the source. Lookahead reads runes and then
/// pushes them back in reverse order, so position is always restored in
/// whole runes.
pub struct Unreader<S> {
    source: S,
    pending: Vec<char>,
}

impl<S: RuneSource> Unreader<S> {
    /// Wrap a rune source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            pending: Vec::with_capacity(4),
        }
    }

    /// Read the next rune, or `None` at end of input.
    pub fn read_rune(&mut self) -> Result<Option<char>> {
        match self.pending.pop() {
            Some(c) => Ok(Some(c)),
            None => self.source.next_rune(),
        }
    }

    /// Push `c` back so the next [`read_rune`](Self::read_rune) returns it.
    pub fn unread_rune(&mut self, c: char) {
        self.pending.push(c);
    }

    /// Returns true if the upcoming runes spell `s`. Never consumes input.
    pub fn next_is_str(&mut self, s: &str) -> Result<bool> {
        let mut taken = Vec::with_capacity(s.len());
        let mut matched = true;
        for expected in s.chars() {
            match self.read_rune() {
                Ok(Some(c)) => {
                    taken.push(c);
                    if c != expected {
                        matched = false;
                        break;
                    }
                }
                Ok(None) => {
                    matched = false;
                    break;
                }
                Err(e) => {
                    self.restore(taken);
                    return Err(e);
                }
            }
        }
        self.restore(taken);
        Ok(matched)
    }

    /// Consume `s` if the upcoming runes spell it, otherwise leave the
    /// position untouched.
    pub fn accept_str(&mut self, s: &str) -> Result<bool> {
        if !self.next_is_str(s)? {
            return Ok(false);
        }
        for _ in s.chars() {
            self.pending.pop();
        }
        Ok(true)
    }

    /// Consumes the unreader, returning the source. Pending runes are lost.
    pub fn into_inner(self) -> S {
        self.source
    }

    fn restore(&mut self, taken: Vec<char>) {
        self.pending.extend(taken.into_iter().rev());
    }
}
