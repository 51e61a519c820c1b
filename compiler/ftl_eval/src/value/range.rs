//! Lazy integer ranges.

/// `a..b`, `a..<b`, `a..*n` and `a..` as start, step and optional length.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RangeValue {
    start: i64,
    /// `1` or `-1`.
    step: i64,
    /// `None` for a right-unbounded range.
    len: Option<u64>,
}

impl RangeValue {
    /// `start..end`; counts down when `end < start`.
    pub fn inclusive(start: i64, end: i64) -> Self {
        let distance = span_between(start, end);
        RangeValue {
            start,
            step: if end < start { -1 } else { 1 },
            len: Some(distance.saturating_add(1)),
        }
    }

    /// `start..<end`; empty when `end == start`.
    pub fn exclusive(start: i64, end: i64) -> Self {
        RangeValue {
            start,
            step: if end < start { -1 } else { 1 },
            len: Some(span_between(start, end)),
        }
    }

    /// `start..*length`; a negative length counts down.
    pub fn with_length(start: i64, length: i64) -> Self {
        RangeValue {
            start,
            step: if length < 0 { -1 } else { 1 },
            len: Some(length.unsigned_abs()),
        }
    }

    /// `start..`
    pub fn unbounded(start: i64) -> Self {
        RangeValue {
            start,
            step: 1,
            len: None,
        }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn len(&self) -> Option<u64> {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == Some(0)
    }

    pub fn is_unbounded(&self) -> bool {
        self.len.is_none()
    }

    pub fn is_descending(&self) -> bool {
        self.step < 0
    }

    /// The item at `index`, or `None` past the end (or past `i64`).
    pub fn get(&self, index: u64) -> Option<i64> {
        if self.len.is_some_and(|len| index >= len) {
            return None;
        }
        let offset = i64::try_from(index).ok()?;
        self.start.checked_add(self.step.checked_mul(offset)?)
    }

    /// The items in order.
    pub fn iter(self) -> impl Iterator<Item = i64> {
        (0u64..).map_while(move |index| self.get(index))
    }
}

fn span_between(start: i64, end: i64) -> u64 {
    let distance = (i128::from(end) - i128::from(start)).unsigned_abs();
    u64::try_from(distance).unwrap_or(u64::MAX)
}
