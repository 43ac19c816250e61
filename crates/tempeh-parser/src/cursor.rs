//! Position-tracking cursor over template source text.

use crate::chars::is_whitespace;
use tempeh_source::{Position, Span};

/// A forward-only scanner over the full source string.
///
/// Offsets are byte offsets into the source; the line/column [`Position`]
/// is kept up to date on every advance. Peeking or advancing past the end
/// yields `None`, which callers treat as end of input.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    pos: usize,
    position: Position,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of a file.
    pub fn new(source: &'a str) -> Self {
        Self::with_start(source, Position::START)
    }

    /// Create a cursor whose first character sits at `start`.
    pub fn with_start(source: &'a str, start: Position) -> Self {
        Self {
            source,
            pos: 0,
            position: start,
        }
    }

    /// Get the current byte offset.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Get the line/column of the current character.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Get the remaining source.
    pub fn remaining(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// Check if at end of input.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// The current character, without consuming it.
    pub fn current(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// The character `n` characters ahead; `peek(0)` is the current one.
    pub fn peek(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    /// The next `len` bytes, if that many remain.
    pub fn peek_substring(&self, len: usize) -> Option<&'a str> {
        self.source.get(self.pos..self.pos + len)
    }

    /// Check if the remaining source starts with the given string.
    pub fn starts_with(&self, s: &str) -> bool {
        self.peek_substring(s.len()) == Some(s)
    }

    /// The character just before the cursor.
    pub fn prev_char(&self) -> Option<char> {
        self.source[..self.pos].chars().next_back()
    }

    /// Number of consecutive `\` characters immediately before the cursor.
    pub fn preceding_backslashes(&self) -> usize {
        self.source[..self.pos]
            .bytes()
            .rev()
            .take_while(|&b| b == b'\\')
            .count()
    }

    /// Consume and return the current character.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += c.len_utf8();
        self.position = match c {
            // CRLF counts as one line break; the `\n` does the work.
            '\r' if self.current() == Some('\n') => self.position,
            '\n' | '\r' | '\x0C' => self.position.next_line(),
            _ => self.position.next_column(),
        };
        Some(c)
    }

    /// Advance up to `n` characters and return how many were consumed.
    pub fn advance_by(&mut self, n: usize) -> usize {
        let mut advanced = 0;
        while advanced < n && self.advance().is_some() {
            advanced += 1;
        }
        advanced
    }

    /// Consume a string if the remaining source starts with it.
    pub fn consume(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.advance_by(s.chars().count());
            true
        } else {
            false
        }
    }

    /// Skip whitespace and return the number of characters skipped.
    pub fn skip_whitespace(&mut self) -> usize {
        self.consume_while(is_whitespace).chars().count()
    }

    /// Consume characters while the predicate is true.
    pub fn consume_while<F>(&mut self, pred: F) -> &'a str
    where
        F: Fn(char) -> bool,
    {
        let start = self.pos;
        while let Some(c) = self.current() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
        &self.source[start..self.pos]
    }

    /// Get the source between two byte offsets.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }

    /// Get a span from start to current position.
    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }
}
