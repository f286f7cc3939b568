//! Set algebra on binary arrays
//!
//! This module provides row-wise boolean operations on run-length arrays:
//!
//! - Complement (NOT) over the whole array domain
//! - Any two-input boolean operator ([`LogicalOp`]), with AND, OR, XOR and
//!   AND-NOT predefined
//! - Dispatch over `&dyn BinaryArray`, taking the run-length fast path when
//!   both operands are run-length arrays of the same kind
//!
//! Rows absent from an input are all-false. When an operator maps
//! (false, false) to true, rows absent from both inputs are set in the
//! output, so every row of the domain is visited.

use crate::array::{BinaryArray, RunLengthArray, RunLengthRef, check_same_size, for_each_position};
use crate::dense::DenseBinaryArray;
use crate::error::Result;
use crate::progress::{NoProgress, ProgressObserver, ProgressTracker};
use crate::row::BinaryRow;
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// A named two-input boolean operator.
///
/// The operator is stored as a truth table: bit `(a << 1) | b` holds
/// `op(a, b)`.
///
/// # Examples
///
/// ```
/// use rlebin_core::{LogicalOp, RunLengthBinaryArray2D};
///
/// let a = RunLengthBinaryArray2D::from_fn(8, 4, |x, _| x < 5).unwrap();
/// let b = RunLengthBinaryArray2D::from_fn(8, 4, |x, _| x > 2).unwrap();
/// let both = LogicalOp::AND.process(&a, &b).unwrap();
/// assert!(both.get(3, 0).unwrap());
/// assert!(!both.get(5, 0).unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicalOp {
    name: &'static str,
    table: u8,
}

impl LogicalOp {
    /// Intersection
    pub const AND: LogicalOp = LogicalOp::from_table("and", 0b1000);
    /// Union
    pub const OR: LogicalOp = LogicalOp::from_table("or", 0b1110);
    /// Symmetric difference
    pub const XOR: LogicalOp = LogicalOp::from_table("xor", 0b0110);
    /// Set in the first input and not in the second
    pub const AND_NOT: LogicalOp = LogicalOp::from_table("and_not", 0b0100);

    /// Operator from a raw truth table; only the low four bits are used.
    pub const fn from_table(name: &'static str, table: u8) -> Self {
        LogicalOp {
            name,
            table: table & 0b1111,
        }
    }

    /// Operator from a boolean function, sampled on all four inputs.
    pub fn from_fn<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(bool, bool) -> bool,
    {
        let mut table = 0u8;
        for idx in 0..4u8 {
            if f(idx & 0b10 != 0, idx & 0b01 != 0) {
                table |= 1 << idx;
            }
        }
        LogicalOp { name, table }
    }

    /// Evaluate the operator.
    #[inline]
    pub fn apply(self, a: bool, b: bool) -> bool {
        let idx = ((a as u8) << 1) | b as u8;
        ((self.table >> idx) & 1) == 1
    }

    /// Operator name.
    pub fn name(self) -> &'static str {
        self.name
    }

    /// Truth table.
    pub fn table(self) -> u8 {
        self.table
    }

    /// Check whether two false inputs give false.
    ///
    /// Only such operators can skip rows absent from both inputs.
    #[inline]
    pub fn preserves_background(self) -> bool {
        !self.apply(false, false)
    }

    /// Combine two arrays of equal size into a new array.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IncompatibleSizes`] if the sizes differ; no
    /// row is processed in that case.
    pub fn process<A: RunLengthArray>(self, a: &A, b: &A) -> Result<A> {
        self.process_with_progress(a, b, &mut NoProgress)
    }

    /// [`LogicalOp::process`] with progress reporting.
    pub fn process_with_progress<A: RunLengthArray>(
        self,
        a: &A,
        b: &A,
        progress: &mut dyn ProgressObserver,
    ) -> Result<A> {
        let mut out = a.new_instance();
        self.process_into_with_progress(a, b, &mut out, progress)?;
        Ok(out)
    }

    /// Combine two arrays, replacing the content of `out`.
    ///
    /// `out` is left untouched on error.
    pub fn process_into<A: RunLengthArray>(self, a: &A, b: &A, out: &mut A) -> Result<()> {
        self.process_into_with_progress(a, b, out, &mut NoProgress)
    }

    /// [`LogicalOp::process_into`] with progress reporting.
    pub fn process_into_with_progress<A: RunLengthArray>(
        self,
        a: &A,
        b: &A,
        out: &mut A,
        progress: &mut dyn ProgressObserver,
    ) -> Result<()> {
        check_same_size(a.dims(), b.dims())?;
        check_same_size(a.dims(), out.dims())?;

        let max = a.width() as i32 - 1;
        let empty = BinaryRow::new();
        let mut result = a.new_instance();
        let mut tracker = ProgressTracker::new(progress, a.progress_units());

        if self.preserves_background() {
            for (key, ra, rb) in paired_rows(a, b) {
                tracker.enter(a.progress_unit(key));
                let ra = ra.unwrap_or(&empty);
                let rb = rb.unwrap_or(&empty);
                result.put_row(key, ra.combine_within(rb, self, 0, max))?;
            }
        } else {
            for key in a.keys() {
                tracker.enter(a.progress_unit(key));
                let ra = a.row(key).unwrap_or(&empty);
                let rb = b.row(key).unwrap_or(&empty);
                result.put_row(key, ra.combine_within(rb, self, 0, max))?;
            }
        }
        tracker.finish();

        debug!(
            op = self.name,
            dims = ?a.dims(),
            runs_a = a.run_count(),
            runs_b = b.run_count(),
            runs_out = result.run_count(),
            "logical op"
        );
        *out = result;
        Ok(())
    }

    /// Combine any two binary arrays of equal size.
    ///
    /// Two run-length arrays of the same kind use [`LogicalOp::process`];
    /// any other pair is evaluated per position into a dense array.
    pub fn process_any(self, a: &dyn BinaryArray, b: &dyn BinaryArray) -> Result<Box<dyn BinaryArray>> {
        check_same_size(a.dims(), b.dims())?;
        match (a.as_run_length(), b.as_run_length()) {
            (Some(RunLengthRef::Plane(pa)), Some(RunLengthRef::Plane(pb))) => {
                Ok(Box::new(self.process(pa, pb)?))
            }
            (Some(RunLengthRef::Volume(va)), Some(RunLengthRef::Volume(vb))) => {
                Ok(Box::new(self.process(va, vb)?))
            }
            _ => {
                debug!(op = self.name, dims = ?a.dims(), "logical op: dense fallback");
                let out = dense_map(a.dims(), |pos| {
                    Ok(self.apply(a.get_boolean(pos)?, b.get_boolean(pos)?))
                })?;
                Ok(Box::new(out))
            }
        }
    }
}

impl fmt::Debug for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicalOp({}, {:04b})", self.name, self.table)
    }
}

/// Complement every position of the array domain.
///
/// Rows absent from the input become one full-width run.
pub fn complement<A: RunLengthArray>(a: &A) -> Result<A> {
    complement_with_progress(a, &mut NoProgress)
}

/// [`complement`] with progress reporting.
pub fn complement_with_progress<A: RunLengthArray>(
    a: &A,
    progress: &mut dyn ProgressObserver,
) -> Result<A> {
    let max = a.width() as i32 - 1;
    let mut out = a.new_instance();
    let mut tracker = ProgressTracker::new(progress, a.progress_units());
    for key in a.keys() {
        tracker.enter(a.progress_unit(key));
        let row = match a.row(key) {
            Some(row) => row.complement(0, max),
            None => BinaryRow::full(0, max),
        };
        out.put_row(key, row)?;
    }
    tracker.finish();
    debug!(
        dims = ?a.dims(),
        runs_in = a.run_count(),
        runs_out = out.run_count(),
        "complement"
    );
    Ok(out)
}

/// Complement any binary array.
///
/// Run-length arrays use [`complement`]; anything else is evaluated per
/// position into a dense array.
pub fn complement_any(a: &dyn BinaryArray) -> Result<Box<dyn BinaryArray>> {
    match a.as_run_length() {
        Some(RunLengthRef::Plane(plane)) => Ok(Box::new(complement(plane)?)),
        Some(RunLengthRef::Volume(volume)) => Ok(Box::new(complement(volume)?)),
        None => {
            debug!(dims = ?a.dims(), "complement: dense fallback");
            Ok(Box::new(dense_map(a.dims(), |pos| Ok(!a.get_boolean(pos)?))?))
        }
    }
}

/// Dense array whose positions are `f(pos)`.
fn dense_map(dims: &[u32], mut f: impl FnMut(&[i32]) -> Result<bool>) -> Result<DenseBinaryArray> {
    let mut out = DenseBinaryArray::new(dims)?;
    let mut status = Ok(());
    for_each_position(dims, |pos| {
        if status.is_err() {
            return;
        }
        status = f(pos).and_then(|value| {
            if value {
                out.set_boolean(pos, true)?;
            }
            Ok(())
        });
    });
    status.map(|()| out)
}

type RowPair<'a, K> = (K, Option<&'a BinaryRow>, Option<&'a BinaryRow>);

/// Stored rows of both arrays, joined on key in ascending order.
fn paired_rows<'a, A: RunLengthArray>(a: &'a A, b: &'a A) -> Vec<RowPair<'a, A::Key>> {
    let mut ia = a.rows().peekable();
    let mut ib = b.rows().peekable();
    let mut out = Vec::new();
    loop {
        let order = match (ia.peek(), ib.peek()) {
            (Some(&(ka, _)), Some(&(kb, _))) => ka.cmp(&kb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        match order {
            Ordering::Less => {
                if let Some((key, row)) = ia.next() {
                    out.push((key, Some(row), None));
                }
            }
            Ordering::Greater => {
                if let Some((key, row)) = ib.next() {
                    out.push((key, None, Some(row)));
                }
            }
            Ordering::Equal => {
                if let (Some((key, ra)), Some((_, rb))) = (ia.next(), ib.next()) {
                    out.push((key, Some(ra), Some(rb)));
                }
            }
        }
    }
    out
}
