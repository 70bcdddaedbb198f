//! Source locations

/// A trait that can provide the [Span] of some node or token
pub trait Spanned {
    fn span(&self) -> Span;
}

/// A region of source text.
///
/// Lines start at 1 and columns start at 0, counted in characters.
#[derive(Debug, Copy, Clone, Default, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Span {
    offset: usize,
    len: usize,
    line: usize,
    column: usize,
}

impl Span {
    /// Creates a new span
    pub const fn new(offset: usize, len: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            len,
            line,
            column,
        }
    }

    /// Gets a zero-length span directly after this span
    pub const fn end(&self) -> Self {
        Self {
            offset: self.offset + self.len,
            len: 0,
            line: self.line,
            column: self.column + self.len,
        }
    }

    /// Creates a span that encompasses both
    pub fn join(&self, other: Self) -> Self {
        let first = if self.offset <= other.offset {
            self
        } else {
            &other
        };
        let min = self.offset.min(other.offset);
        let max = (self.offset + self.len).max(other.offset + other.len);
        Self {
            offset: min,
            len: max - min,
            line: first.line,
            column: first.column,
        }
    }

    /// Byte offset of the start of this span
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Length of this span in bytes
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The line this span starts on
    pub const fn line(&self) -> usize {
        self.line
    }

    /// The column this span starts on
    pub const fn column(&self) -> usize {
        self.column
    }
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_keeps_earliest_position() {
        let a = Span::new(10, 2, 2, 4);
        let b = Span::new(4, 3, 1, 4);
        let joined = a.join(b);
        assert_eq!(joined, Span::new(4, 8, 1, 4));
    }

    #[test]
    fn end_is_empty() {
        let span = Span::new(3, 4, 1, 3).end();
        assert!(span.is_empty());
        assert_eq!(span.offset(), 7);
        assert_eq!(span.column(), 7);
    }
}
