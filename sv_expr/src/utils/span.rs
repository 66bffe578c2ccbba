//! Source location tracking for expression diagnostics
//!
//! Expressions are usually a single line, but parameter values pasted from
//! HDL sources can carry newlines, so positions keep a line number as well as
//! the byte offset and column used in error reports.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in expression text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Position of byte `offset` within `text`
    ///
    /// Offsets past the end clamp to the end of the text; offsets inside a
    /// multi-byte character resolve to the character's first byte.
    pub fn at(text: &str, offset: usize) -> Self {
        let mut position = Self::new(0, 1, 1);
        for (index, ch) in text.char_indices() {
            if index >= offset {
                break;
            }
            position = position.advance(ch);
        }
        position
    }

    fn advance(self, ch: char) -> Self {
        if ch == '\n' {
            Self::new(self.offset + 1, self.line.saturating_add(1), 1)
        } else {
            Self::new(
                self.offset + ch.len_utf8(),
                self.line,
                self.column.saturating_add(1),
            )
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of expression text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// Span covering the bytes `start..end` of `text`
    pub fn of(text: &str, start: usize, end: usize) -> Self {
        Self::new(Position::at(text, start), Position::at(text, end.max(start)))
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_at_counts_columns() {
        let text = "8'hFF + 1";
        let position = Position::at(text, 6);
        assert_eq!(position, Position::new(6, 1, 7));
    }

    #[test]
    fn test_position_at_tracks_lines() {
        let text = "1 +\n  2";
        let position = Position::at(text, 6);
        assert_eq!(position.line, 2);
        assert_eq!(position.column, 3);
    }

    #[test]
    fn test_position_at_clamps_past_end() {
        assert_eq!(Position::at("12", 10), Position::new(2, 1, 3));
    }

    #[test]
    fn test_span_of_and_display() {
        let text = "(1 + 2))";
        let span = Span::of(text, 1, 6);
        assert_eq!(span.start().offset, 1);
        assert_eq!(span.end().offset, 6);
        assert_eq!(span.to_string(), "1:2-7");
    }

    #[test]
    fn test_span_across_lines() {
        let span = Span::of("(1 +
 2", 0, 6);
        assert_eq!(span.end().line, 2);
        assert_eq!(span.to_string(), "1:1-2:2");
    }

    #[test]
    fn test_span_end_never_precedes_start() {
        let span = Span::of("1))", 2, 1);
        assert_eq!(span.start(), span.end());
    }
}
