//! Binary array abstraction
//!
//! [`BinaryArray`] is the storage-independent view of a boolean image used
//! by operators that must accept any backend. [`RunLengthArray`] is the
//! row-oriented view shared by the 2D and 3D run-length arrays; set algebra
//! is written once against it.

use crate::error::{Error, Result};
use crate::rle::{RunLengthBinaryArray2D, RunLengthBinaryArray3D};
use crate::row::BinaryRow;
use std::fmt;

/// Largest accepted extent along any axis.
pub const MAX_DIMENSION: u32 = i32::MAX as u32;

/// Borrowed run-length storage behind a [`BinaryArray`].
#[derive(Debug, Clone, Copy)]
pub enum RunLengthRef<'a> {
    /// 2D array
    Plane(&'a RunLengthBinaryArray2D),
    /// 3D array
    Volume(&'a RunLengthBinaryArray3D),
}

/// Any boolean array addressable by integer positions.
///
/// Positions are given as `[x, y]` or `[x, y, z]`; `x` is the scanline axis.
pub trait BinaryArray {
    /// Extent along each axis, `x` first.
    fn dims(&self) -> &[u32];

    /// Get the value at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionalityMismatch`] if `pos` has the wrong
    /// length, or [`Error::PositionOutOfBounds`] if it lies outside the array.
    fn get_boolean(&self, pos: &[i32]) -> Result<bool>;

    /// Set the value at `pos`.
    ///
    /// # Errors
    ///
    /// Same as [`BinaryArray::get_boolean`].
    fn set_boolean(&mut self, pos: &[i32], state: bool) -> Result<()>;

    /// Run-length storage, when this array has one.
    fn as_run_length(&self) -> Option<RunLengthRef<'_>> {
        None
    }

    /// Number of axes.
    fn ndim(&self) -> usize {
        self.dims().len()
    }

    /// Number of set positions.
    fn count_true(&self) -> u64 {
        let mut count = 0u64;
        for_each_position(self.dims(), |pos| {
            if self.get_boolean(pos).unwrap_or(false) {
                count += 1;
            }
        });
        count
    }
}

/// Row-oriented run-length array.
///
/// A key addresses one scanline (`y` in 2D, `(z, y)` in 3D). Rows absent
/// from the store are all-false and [`RunLengthArray::put_row`] never stores
/// an empty row.
pub trait RunLengthArray: BinaryArray + Clone {
    /// Scanline key.
    type Key: Copy + Ord + fmt::Debug;

    /// Scanline length.
    fn width(&self) -> u32;

    /// Stored row for `key`, if any.
    fn row(&self, key: Self::Key) -> Option<&BinaryRow>;

    /// Stored (non-empty) rows in ascending key order.
    fn rows(&self) -> impl Iterator<Item = (Self::Key, &BinaryRow)> + '_;

    /// Every key of the domain in ascending order, stored or not.
    fn keys(&self) -> impl Iterator<Item = Self::Key> + '_;

    /// Number of keys in the domain.
    fn key_count(&self) -> usize;

    /// Replace the row at `key`; the row is clipped to `[0, width)` and an
    /// empty result removes the row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] if `key` is outside the array.
    fn put_row(&mut self, key: Self::Key, row: BinaryRow) -> Result<()>;

    /// Empty array of the same kind and size.
    ///
    /// Always has `self`'s extent; build an array of another size with the
    /// concrete type's `new`.
    fn new_instance(&self) -> Self;

    /// Number of progress units: rows in 2D, planes in 3D.
    fn progress_units(&self) -> usize;

    /// Progress unit holding `key`.
    fn progress_unit(&self, key: Self::Key) -> usize;

    /// Number of stored rows.
    fn stored_row_count(&self) -> usize {
        self.rows().count()
    }

    /// Total number of runs.
    fn run_count(&self) -> usize {
        self.rows().map(|(_, row)| row.run_count()).sum()
    }

    /// Total number of set positions.
    fn pixel_count(&self) -> u64 {
        self.rows().map(|(_, row)| row.pixel_count()).sum()
    }

    /// Check whether no position is set.
    fn is_empty(&self) -> bool {
        self.rows().next().is_none()
    }
}

/// Validate array dimensions: each extent in `1..=MAX_DIMENSION`.
pub fn validate_dims(dims: &[u32]) -> Result<()> {
    if dims.is_empty() || dims.iter().any(|&d| d == 0 || d > MAX_DIMENSION) {
        return Err(Error::InvalidDimension(dims.to_vec()));
    }
    Ok(())
}

/// Check that `pos` addresses a position inside an array of size `dims`.
pub fn check_position(pos: &[i32], dims: &[u32]) -> Result<()> {
    if pos.len() != dims.len() {
        return Err(Error::DimensionalityMismatch {
            expected: dims.len(),
            actual: pos.len(),
        });
    }
    let inside = pos
        .iter()
        .zip(dims)
        .all(|(&p, &d)| p >= 0 && (p as u32) < d);
    if !inside {
        return Err(Error::PositionOutOfBounds {
            pos: pos.to_vec(),
            size: dims.to_vec(),
        });
    }
    Ok(())
}

/// Check that two arrays have the same shape.
pub fn check_same_size(a: &[u32], b: &[u32]) -> Result<()> {
    if a != b {
        return Err(Error::IncompatibleSizes(a.to_vec(), b.to_vec()));
    }
    Ok(())
}

/// Visit every position of an array of size `dims`, `x` fastest.
pub fn for_each_position(dims: &[u32], mut f: impl FnMut(&[i32])) {
    if dims.is_empty() || dims.contains(&0) {
        return;
    }
    let mut pos = vec![0i32; dims.len()];
    loop {
        f(&pos);
        let mut axis = 0;
        loop {
            pos[axis] += 1;
            if (pos[axis] as u32) < dims[axis] {
                break;
            }
            pos[axis] = 0;
            axis += 1;
            if axis == dims.len() {
                return;
            }
        }
    }
}
