//! BinaryRow - the canonical run set of one scanline
//!
//! A row stores its set pixels as an ordered map from run start to run end.
//! Every mutation re-establishes canonical form:
//!
//! - runs are sorted by start
//! - no two runs overlap
//! - no two runs touch (`run[i].end + 1 < run[i + 1].start`)
//!
//! Because of this, two rows with the same pixel content always compare
//! equal, and an empty map is an all-false row.
//!
//! Rows are combined without expanding pixels: boolean operators run a
//! two-pointer sweep over both run lists, and dilation generates all shifted
//! intervals and folds them in one sort+merge pass.

use crate::logic::LogicalOp;
use crate::run::Run;
use std::collections::BTreeMap;

/// The set of runs along one scanline, in canonical form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BinaryRow {
    /// run start -> run end (inclusive)
    runs: BTreeMap<i32, i32>,
}

impl BinaryRow {
    /// Create an all-false row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a row holding a single run.
    pub fn from_run(run: Run) -> Self {
        let mut runs = BTreeMap::new();
        runs.insert(run.start(), run.end());
        BinaryRow { runs }
    }

    /// Create a row with every position in `[min, max]` set.
    ///
    /// Returns an empty row when `min > max`.
    pub fn full(min: i32, max: i32) -> Self {
        match Run::new(min, max) {
            Ok(run) => Self::from_run(run),
            Err(_) => Self::new(),
        }
    }

    /// Build a canonical row from runs in any order, merging overlapping and
    /// touching runs.
    pub fn from_runs<I>(runs: I) -> Self
    where
        I: IntoIterator<Item = Run>,
    {
        let mut runs: Vec<Run> = runs.into_iter().collect();
        runs.sort_unstable();
        let mut builder = RowBuilder::with_capacity(runs.len());
        for run in runs {
            builder.push_run(run);
        }
        builder.finish()
    }

    /// Union of any number of rows.
    pub fn union_all<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a BinaryRow>,
    {
        Self::from_runs(rows.into_iter().flat_map(|row| row.runs()))
    }

    /// Get the state of position `x`.
    pub fn get(&self, x: i32) -> bool {
        self.runs
            .range(..=x)
            .next_back()
            .is_some_and(|(_, &end)| x <= end)
    }

    /// Set position `x` to `state`.
    ///
    /// Setting `true` extends or bridges neighbouring runs; setting `false`
    /// truncates, splits, or removes the covering run.
    pub fn set(&mut self, x: i32, state: bool) {
        if state {
            self.insert_run(Run::single(x));
        } else {
            self.clear_run(Run::single(x));
        }
    }

    /// Set every position of `run`, merging with overlapping or touching runs.
    pub fn insert_run(&mut self, run: Run) {
        let mut start = run.start();
        let mut end = run.end();

        if let Some((&s, &e)) = self.runs.range(..=start).next_back()
            && e as i64 + 1 >= start as i64
        {
            start = s;
            end = end.max(e);
        }

        let upper = end.saturating_add(1);
        let absorbed: Vec<(i32, i32)> = self
            .runs
            .range(start..=upper)
            .map(|(&s, &e)| (s, e))
            .collect();
        for (s, e) in absorbed {
            self.runs.remove(&s);
            end = end.max(e);
        }

        self.runs.insert(start, end);
    }

    /// Clear every position of `run`, truncating or splitting covered runs.
    pub fn clear_run(&mut self, run: Run) {
        let (lo, hi) = (run.start(), run.end());

        if let Some((&s, &e)) = self.runs.range(..lo).next_back()
            && e >= lo
        {
            self.runs.insert(s, lo - 1);
            if e > hi {
                self.runs.insert(hi + 1, e);
            }
        }

        let covered: Vec<(i32, i32)> = self
            .runs
            .range(lo..=hi)
            .map(|(&s, &e)| (s, e))
            .collect();
        for (s, e) in covered {
            self.runs.remove(&s);
            if e > hi {
                self.runs.insert(hi + 1, e);
            }
        }
    }

    /// Iterate over runs in ascending order.
    pub fn runs(&self) -> impl DoubleEndedIterator<Item = Run> + ExactSizeIterator + '_ {
        self.runs
            .iter()
            .map(|(&start, &end)| Run::new_unchecked(start, end))
    }

    /// Number of runs.
    #[inline]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Number of set positions.
    pub fn pixel_count(&self) -> u64 {
        self.runs().map(|run| run.len()).sum()
    }

    /// Check whether no position is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// First run, if any.
    pub fn first(&self) -> Option<Run> {
        self.runs
            .first_key_value()
            .map(|(&s, &e)| Run::new_unchecked(s, e))
    }

    /// Last run, if any.
    pub fn last(&self) -> Option<Run> {
        self.runs
            .last_key_value()
            .map(|(&s, &e)| Run::new_unchecked(s, e))
    }

    /// Interval from the first set position to the last, if any.
    pub fn hull(&self) -> Option<Run> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some(Run::new_unchecked(first.start(), last.end())),
            _ => None,
        }
    }

    /// Check the canonical-form invariant.
    ///
    /// Always true for rows built through the public API.
    pub fn is_canonical(&self) -> bool {
        let mut prev_end: Option<i32> = None;
        for (&start, &end) in &self.runs {
            if start > end {
                return false;
            }
            if let Some(pe) = prev_end
                && pe as i64 + 1 >= start as i64
            {
                return false;
            }
            prev_end = Some(end);
        }
        true
    }

    /// Runs clipped to `[min, max]`.
    pub fn runs_within(&self, min: i32, max: i32) -> Vec<Run> {
        if min > max {
            return Vec::new();
        }
        let mut out = Vec::new();
        if let Some((&s, &e)) = self.runs.range(..min).next_back()
            && e >= min
        {
            out.push(Run::new_unchecked(s.max(min), e.min(max)));
        }
        out.extend(
            self.runs
                .range(min..=max)
                .map(|(&s, &e)| Run::new_unchecked(s, e.min(max))),
        );
        out
    }

    /// Restrict the row to `[min, max]`.
    pub fn clip(&self, min: i32, max: i32) -> BinaryRow {
        let mut builder = RowBuilder::new();
        for run in self.runs_within(min, max) {
            builder.push_run(run);
        }
        builder.finish()
    }

    /// Translate every run by `dx`.
    pub fn shift(&self, dx: i32) -> BinaryRow {
        Self::from_runs(self.runs().map(|run| run.shifted(dx)))
    }

    /// Horizontal dilation by a list of `(dstart, dend)` offset pairs.
    ///
    /// The result is the union, over all runs and all pairs, of
    /// `[run.start + dstart, run.end + dend]`. Pairs that would produce a
    /// reversed interval contribute nothing.
    pub fn dilate_by(&self, offsets: &[(i32, i32)]) -> BinaryRow {
        let mut spans = Vec::with_capacity(self.runs.len() * offsets.len());
        for run in self.runs() {
            for &(dstart, dend) in offsets {
                let start = run.start() as i64 + dstart as i64;
                let end = run.end() as i64 + dend as i64;
                if start <= end {
                    spans.push(Run::new_unchecked(clamp_i32(start), clamp_i32(end)));
                }
            }
        }
        Self::from_runs(spans)
    }

    /// Runs covering the gaps of this row within `[min, max]`.
    pub fn complement(&self, min: i32, max: i32) -> BinaryRow {
        let mut builder = RowBuilder::new();
        if min > max {
            return builder.finish();
        }
        let mut cursor = min as i64;
        for run in self.runs_within(min, max) {
            if (run.start() as i64) > cursor {
                builder.push(cursor as i32, run.start() - 1);
            }
            cursor = run.end() as i64 + 1;
        }
        if cursor <= max as i64 {
            builder.push(cursor as i32, max);
        }
        builder.finish()
    }

    /// Combine two rows with a boolean operator over the hull of both rows.
    ///
    /// Positions outside both rows are not emitted, so this is exact when
    /// `op(false, false)` is false. Use [`BinaryRow::combine_within`] for
    /// operators that set background positions.
    pub fn combine(&self, other: &BinaryRow, op: LogicalOp) -> BinaryRow {
        let hull = match (self.hull(), other.hull()) {
            (Some(a), Some(b)) => {
                Run::new_unchecked(a.start().min(b.start()), a.end().max(b.end()))
            }
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => return BinaryRow::new(),
        };
        self.combine_within(other, op, hull.start(), hull.end())
    }

    /// Combine two rows with a boolean operator, evaluated exactly on
    /// `[min, max]`.
    ///
    /// Sweeps both run lists once, evaluating `op` on each maximal interval
    /// where both inputs are constant.
    pub fn combine_within(&self, other: &BinaryRow, op: LogicalOp, min: i32, max: i32) -> BinaryRow {
        let mut builder = RowBuilder::new();
        if min > max {
            return builder.finish();
        }
        let a = self.runs_within(min, max);
        let b = other.runs_within(min, max);
        let limit = max as i64 + 1;

        let (mut i, mut j) = (0usize, 0usize);
        let mut x = min as i64;
        while x < limit {
            while i < a.len() && (a[i].end() as i64) < x {
                i += 1;
            }
            while j < b.len() && (b[j].end() as i64) < x {
                j += 1;
            }
            let (va, next_a) = sweep_state(a.get(i), x, limit);
            let (vb, next_b) = sweep_state(b.get(j), x, limit);
            let next = next_a.min(next_b);
            if op.apply(va, vb) {
                builder.push(x as i32, (next - 1) as i32);
            }
            x = next;
        }
        builder.finish()
    }

    /// Intersection.
    pub fn and(&self, other: &BinaryRow) -> BinaryRow {
        self.combine(other, LogicalOp::AND)
    }

    /// Union.
    pub fn or(&self, other: &BinaryRow) -> BinaryRow {
        self.combine(other, LogicalOp::OR)
    }

    /// Symmetric difference.
    pub fn xor(&self, other: &BinaryRow) -> BinaryRow {
        self.combine(other, LogicalOp::XOR)
    }

    /// Positions set here but not in `other`.
    pub fn and_not(&self, other: &BinaryRow) -> BinaryRow {
        self.combine(other, LogicalOp::AND_NOT)
    }
}

/// Value at `x` for a sweep cursor positioned on `run`, and the next
/// position where that value may change.
#[inline]
fn sweep_state(run: Option<&Run>, x: i64, limit: i64) -> (bool, i64) {
    match run {
        Some(r) if (r.start() as i64) <= x => (true, (r.end() as i64 + 1).min(limit)),
        Some(r) => (false, (r.start() as i64).min(limit)),
        None => (false, limit),
    }
}

#[inline]
fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Incremental builder for a canonical row.
///
/// Runs must be pushed in ascending order of start. Pushes that overlap or
/// touch the previous run are merged into it, so the finished row is
/// canonical without any per-pixel map updates.
#[derive(Debug, Default)]
pub struct RowBuilder {
    runs: Vec<Run>,
}

impl RowBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with room for `capacity` runs.
    pub fn with_capacity(capacity: usize) -> Self {
        RowBuilder {
            runs: Vec::with_capacity(capacity),
        }
    }

    /// Append the interval `[start, end]`.
    ///
    /// Reversed intervals are ignored.
    pub fn push(&mut self, start: i32, end: i32) {
        if start > end {
            return;
        }
        self.push_run(Run::new_unchecked(start, end));
    }

    /// Append a run.
    pub fn push_run(&mut self, run: Run) {
        if let Some(last) = self.runs.last_mut() {
            debug_assert!(
                run.start() >= last.start(),
                "runs pushed out of order: {run} after {last}"
            );
            if let Some(merged) = last.merge(&run) {
                *last = merged;
                return;
            }
        }
        self.runs.push(run);
    }

    /// Check whether nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Finish into a canonical row.
    pub fn finish(self) -> BinaryRow {
        BinaryRow {
            runs: self.runs.into_iter().map(|r| (r.start(), r.end())).collect(),
        }
    }
}
