//! Source location spans and line/column mapping.

use std::fmt;

/// Error when creating a span from a range that exceeds `u32::MAX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanError {
    StartTooLarge(usize),
    EndTooLarge(usize),
}

impl fmt::Display for SpanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanError::StartTooLarge(v) => {
                write!(f, "span start {v} exceeds u32::MAX ({})", u32::MAX)
            }
            SpanError::EndTooLarge(v) => write!(f, "span end {v} exceeds u32::MAX ({})", u32::MAX),
        }
    }
}

impl std::error::Error for SpanError {}

/// Byte range in the template source.
///
/// Layout: 8 bytes, `start` inclusive, `end` exclusive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Span for nodes that have no source text.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Try to create a span from a byte range.
    #[inline]
    pub fn try_from_range(range: std::ops::Range<usize>) -> Result<Self, SpanError> {
        let start =
            u32::try_from(range.start).map_err(|_| SpanError::StartTooLarge(range.start))?;
        let end = u32::try_from(range.end).map_err(|_| SpanError::EndTooLarge(range.end))?;
        Ok(Span { start, end })
    }

    /// Create from a byte range.
    ///
    /// # Panics
    /// Panics if the range exceeds `u32::MAX` bytes. Sources are checked
    /// against that limit before lexing starts.
    #[inline]
    pub fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::try_from_range(range).unwrap_or_else(|e| panic!("{}", e))
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Smallest span covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Zero-length span at `offset`.
    #[inline]
    pub const fn point(offset: u32) -> Span {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Shift both ends by `offset`.
    #[inline]
    #[must_use]
    pub const fn offset_by(self, offset: u32) -> Span {
        Span {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    #[inline]
    pub fn to_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<std::ops::Range<u32>> for Span {
    fn from(range: std::ops::Range<u32>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// 1-based line and column of a byte offset.
///
/// Columns count characters, not bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Line-start table for converting byte offsets to [`SourcePos`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut offset = 0u32;
        for line in source.split_inclusive('\n') {
            offset = offset.saturating_add(u32::try_from(line.len()).unwrap_or(u32::MAX));
            line_starts.push(offset);
        }
        // `split_inclusive` yields no trailing empty line; drop a start that
        // points past the end unless the source ends with a newline.
        if line_starts.len() > 1 && !source.ends_with('\n') {
            line_starts.pop();
        }
        LineIndex { line_starts }
    }

    /// Position of `offset` within `source` (the text this index was built from).
    pub fn position(&self, source: &str, offset: u32) -> SourcePos {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len());
        let column = source
            .get(line_start..end)
            .map_or(0, |prefix| prefix.chars().count());
        SourcePos {
            line: u32::try_from(line + 1).unwrap_or(u32::MAX),
            column: u32::try_from(column + 1).unwrap_or(u32::MAX),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests;
