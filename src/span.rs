//! Byte ranges into the parsed document.

#[cfg(test)]
#[path = "./span_tests.rs"]
mod tests;

/// A half-open byte range `start..end` within a TOML document.
///
/// Keys in a parsed tree record where they were written, and every
/// positioned [`Error`](crate::Error) carries the span of the offending text.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
pub struct Span {
    /// Offset of the first byte.
    pub start: u32,
    /// Offset one past the last byte.
    pub end: u32,
}

impl Span {
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Span covering the single byte at `offset`.
    #[inline]
    pub(crate) fn at(offset: usize) -> Self {
        Self::new(offset as u32, offset as u32 + 1)
    }

    /// Span from `start` to `end`; inputs never exceed `u32::MAX` bytes.
    #[inline]
    pub(crate) fn range(start: usize, end: usize) -> Self {
        Self::new(start as u32, end as u32)
    }

    /// Number of bytes covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    /// Returns `true` when the span covers no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(s: Span) -> Self {
        s.start as usize..s.end as usize
    }
}

impl From<std::ops::Range<u32>> for Span {
    fn from(s: std::ops::Range<u32>) -> Self {
        Self::new(s.start, s.end)
    }
}
