//! Run - a closed interval of set pixels on one scanline

use crate::error::{Error, Result};
use std::fmt;

/// A closed integer interval `[start, end]` of set pixels along one axis.
///
/// Invariant: `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Run {
    start: i32,
    end: i32,
}

impl Run {
    /// Create a run covering `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRun`] if `start > end`.
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRun { start, end });
        }
        Ok(Run { start, end })
    }

    /// Create a run of length one.
    #[inline]
    pub fn single(x: i32) -> Self {
        Run { start: x, end: x }
    }

    /// Caller guarantees `start <= end`.
    #[inline]
    pub(crate) fn new_unchecked(start: i32, end: i32) -> Self {
        debug_assert!(start <= end, "run [{start}, {end}] is reversed");
        Run { start, end }
    }

    /// First set position.
    #[inline]
    pub fn start(&self) -> i32 {
        self.start
    }

    /// Last set position (inclusive).
    #[inline]
    pub fn end(&self) -> i32 {
        self.end
    }

    /// Number of positions covered.
    #[inline]
    pub fn len(&self) -> u64 {
        (self.end as i64 - self.start as i64 + 1) as u64
    }

    /// Always false; a run covers at least one position.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check whether `x` lies inside the run.
    #[inline]
    pub fn contains(&self, x: i32) -> bool {
        self.start <= x && x <= self.end
    }

    /// Check whether the two runs overlap or touch, so that their union is a
    /// single run.
    pub fn is_mergeable_with(&self, other: &Run) -> bool {
        let (first, second) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        first.end as i64 + 1 >= second.start as i64
    }

    /// Union of two mergeable runs.
    ///
    /// Returns `None` if a gap separates them.
    pub fn merge(&self, other: &Run) -> Option<Run> {
        if !self.is_mergeable_with(other) {
            return None;
        }
        Some(Run {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        })
    }

    /// Intersection of two runs, if non-empty.
    pub fn intersect(&self, other: &Run) -> Option<Run> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Run { start, end })
    }

    /// Clip to `[min, max]`, returning `None` if nothing remains.
    pub fn clip(&self, min: i32, max: i32) -> Option<Run> {
        let start = self.start.max(min);
        let end = self.end.min(max);
        (start <= end).then_some(Run { start, end })
    }

    /// Translate by `dx`, saturating at the `i32` range.
    pub fn shifted(&self, dx: i32) -> Run {
        Run {
            start: self.start.saturating_add(dx),
            end: self.end.saturating_add(dx),
        }
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
