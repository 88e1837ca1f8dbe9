//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where tokens, AST nodes and compile errors
//! occur in module source text.

use std::fmt;

/// A span of source code, represented by its starting position.
///
/// Lines and columns are 1-indexed. `len` covers the bytes of the
/// spanned text on its first line.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Merge two spans into one that starts at the earlier span and covers both.
    ///
    /// Spans on different lines keep the first span's position and sum the
    /// lengths; only the start position is used for diagnostics.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.line == other.line {
            let start_col = self.col.min(other.col);
            let end_col = (other.col + other.len).max(self.col + self.len);
            Span {
                line: self.line,
                col: start_col,
                len: end_col - start_col,
            }
        } else {
            let (first, second) = if self.line < other.line {
                (self, other)
            } else {
                (other, self)
            };
            Span {
                line: first.line,
                col: first.col,
                len: first.len + second.len,
            }
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let span = Span::new(1, 5, 10);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());

        let empty = Span::point(1, 5);
        assert!(empty.is_empty());
    }

    #[test]
    fn span_display() {
        let span = Span::new(3, 15, 5);
        assert_eq!(format!("{}", span), "3:15");
        assert_eq!(format!("{:?}", span), "3:15");
    }

    #[test]
    fn span_merge_same_line() {
        let span1 = Span::new(1, 5, 3);
        let span2 = Span::new(1, 10, 3);
        let merged = span1.merge(span2);

        assert_eq!(merged.line, 1);
        assert_eq!(merged.col, 5);
        assert_eq!(merged.len, 8);
    }

    #[test]
    fn span_merge_same_line_reverse_order() {
        let merged = Span::new(1, 10, 3).merge(Span::new(1, 5, 3));
        assert_eq!(merged.col, 5);
        assert_eq!(merged.len, 8);
    }

    #[test]
    fn span_merge_keeps_earliest_line() {
        let merged = Span::new(4, 2, 3).merge(Span::new(2, 7, 5));
        assert_eq!(merged.line, 2);
        assert_eq!(merged.col, 7);
        assert_eq!(merged.len, 8);
    }
}
