//! Source position tracking for tempeh templates.
//!
//! This crate provides the line/column [`Position`] attached to every parsed
//! node and attribute, and the byte-offset [`Span`] used when reporting
//! errors against the source text.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// A 1-based line and column in the source text.
///
/// Columns count characters, not bytes. The text form is `"line:column"`,
/// which is also how positions are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Position {
    /// The first character of a file.
    pub const START: Position = Position { line: 1, column: 1 };

    /// Create a new position.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The position one character to the right.
    #[inline]
    pub const fn next_column(self) -> Self {
        Self {
            line: self.line,
            column: self.column + 1,
        }
    }

    /// The first column of the following line.
    #[inline]
    pub const fn next_line(self) -> Self {
        Self {
            line: self.line + 1,
            column: 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Error returned when a `"line:column"` string cannot be read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePositionError(String);

impl fmt::Display for ParsePositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid position \"{}\", expected line:column", self.0)
    }
}

impl std::error::Error for ParsePositionError {}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePositionError(s.to_string());
        let (line, column) = s.split_once(':').ok_or_else(err)?;
        let line: u32 = line.trim().parse().map_err(|_| err())?;
        let column: u32 = column.trim().parse().map_err(|_| err())?;
        if line == 0 || column == 0 {
            return Err(err());
        }
        Ok(Self { line, column })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Position {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Position {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A span in the source code, representing a half-open byte range [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Start offset (inclusive)
    pub start: u32,
    /// End offset (exclusive)
    pub end: u32,
}

impl Span {
    /// Create a new span from start and end offsets.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Create an empty span at the given offset.
    #[inline]
    pub const fn empty(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Get the length of the span.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Convert to a Range<usize>.
    #[inline]
    pub fn to_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self {
            start: range.start as u32,
            end: range.end as u32,
        }
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.to_range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(12, 4).to_string(), "12:4");
        assert_eq!(Position::default(), Position::START);
    }

    #[test]
    fn test_position_advance() {
        let pos = Position::START.next_column().next_column();
        assert_eq!(pos, Position::new(1, 3));
        assert_eq!(pos.next_line(), Position::new(2, 1));
    }

    #[test]
    fn test_position_from_str() {
        assert_eq!("3:17".parse::<Position>(), Ok(Position::new(3, 17)));
        assert!("3".parse::<Position>().is_err());
        assert!("0:1".parse::<Position>().is_err());
        assert!("a:b".parse::<Position>().is_err());
    }

    #[test]
    fn test_span() {
        let span = Span::new(10, 20);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
        assert!(Span::empty(4).is_empty());
        assert_eq!(span.to_range(), 10..20);
        assert_eq!(Span::from(3..7), Span::new(3, 7));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_position_serde() {
        let json = serde_json::to_string(&Position::new(2, 9)).unwrap();
        assert_eq!(json, "\"2:9\"");
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Position::new(2, 9));
    }
}
