use core::{
    fmt,
    ops::{Bound, Range, RangeBounds},
};

use serde_derive::{Deserialize, Serialize};

/// A range in the source text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    // [start, end)
    start: usize,
    end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(
            start <= end,
            "invalid span: start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// An empty span at the start of the file.
    ///
    /// Used by nodes built without a parser, e.g. in tests.
    pub const fn empty() -> Self {
        Span { start: 0, end: 0 }
    }

    /// Returns the start position.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the end position.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Merges two spans into a single span.
    pub fn merge(&self, other: Span) -> Span {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Returns the length of the span.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Reports whether the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Converts the span into a [`Range`].
    pub fn into_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::empty()
    }
}

impl RangeBounds<usize> for Span {
    fn start_bound(&self) -> Bound<&usize> {
        Bound::Included(&self.start)
    }

    fn end_bound(&self) -> Bound<&usize> {
        Bound::Excluded(&self.end)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Range::from(*self).fmt(f)
    }
}

/// A trait for types that can provide a source span.
pub trait Spanned {
    /// Returns a span covering the contents of the item.
    fn span(&self) -> Span;
}

impl<T: Spanned + ?Sized> Spanned for &T {
    fn span(&self) -> Span {
        (**self).span()
    }
}

impl<T: Spanned + ?Sized> Spanned for alloc::sync::Arc<T> {
    fn span(&self) -> Span {
        (**self).span()
    }
}

impl<T: Spanned> Spanned for [T] {
    /// The merged span of all items, or an empty span for an
    /// empty slice.
    fn span(&self) -> Span {
        match self {
            [] => Span::empty(),
            [first, rest @ ..] => rest
                .iter()
                .fold(first.span(), |acc, item| acc.merge(item.span())),
        }
    }
}

impl<T: Spanned> Spanned for alloc::vec::Vec<T> {
    fn span(&self) -> Span {
        self.as_slice().span()
    }
}
