/// Span tracking for positions inside script lines and files
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Represents a span in the source text (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Move the span by `offset` bytes, e.g. from line-relative to file-relative
    pub fn shift(self, offset: usize) -> Self {
        Span {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    /// Convert to a Range for use with ariadne and slicing
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span {
            start: range.start,
            end: range.end,
        }
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_keeps_length() {
        let span = Span::new(2, 7).shift(10);
        assert_eq!(span, Span::new(12, 17));
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_slice_with_range() {
        let text = "hi {{heart}}!";
        let span = Span::new(3, 12);
        assert_eq!(&text[span.range()], "{{heart}}");
    }
}
