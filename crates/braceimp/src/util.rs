use std::ops::Range;

/// Location of a token or expression: the 1-based line it starts on and the
/// byte range it covers in the source text.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourceSpan {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl std::fmt::Debug for SourceSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}..{}", self.line, self.start, self.end)
    }
}

impl SourceSpan {
    pub fn new(line: usize, range: Range<usize>) -> Self {
        SourceSpan {
            line,
            start: range.start,
            end: range.end,
        }
    }

    pub fn into_range(self) -> Range<usize> {
        self.start..self.end
    }

    /// Smallest span covering both `self` and `other`. The line is taken from
    /// whichever span starts first.
    pub fn to(self, other: SourceSpan) -> Self {
        let line = if other.start < self.start {
            other.line
        } else {
            self.line
        };

        SourceSpan {
            line,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn make_wrapped<T>(self, inner: T) -> Spanned<T> {
        Spanned { inner, span: self }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Spanned<T> {
    pub inner: T,
    pub span: SourceSpan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_to_covers_both() {
        let a = SourceSpan::new(1, 4..6);
        let b = SourceSpan::new(2, 10..12);
        assert_eq!(a.to(b), SourceSpan::new(1, 4..12));
        assert_eq!(b.to(a), SourceSpan::new(1, 4..12));
    }

    #[test]
    fn test_make_wrapped() {
        let spanned = SourceSpan::new(3, 0..1).make_wrapped("x");
        assert_eq!(spanned.inner, "x");
        assert_eq!(spanned.span.line, 3);
    }
}
