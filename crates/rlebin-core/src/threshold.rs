//! RLE construction from scalar sources
//!
//! Each row is built by a single left-to-right scan of the source that
//! records run boundaries where the predicate changes. No dense boolean
//! buffer is created.

use crate::array::RunLengthArray;
use crate::error::{Error, Result};
use crate::rle::{RunLengthBinaryArray2D, RunLengthBinaryArray3D};
use crate::scalar::ScalarArray;
use tracing::debug;

/// Build a 2D array whose pixels are `predicate(value)`.
///
/// # Errors
///
/// Returns [`Error::DimensionalityMismatch`] if `source` is not 2D.
///
/// # Examples
///
/// ```
/// use rlebin_core::{ScalarGrid, threshold_plane};
///
/// let grid = ScalarGrid::from_fn(&[6, 2], |p| p[0] as f64).unwrap();
/// let mask = threshold_plane(&grid, |v| v > 1.5 && v < 4.5).unwrap();
/// assert_eq!(mask.row(0).unwrap().first().unwrap().start(), 2);
/// ```
pub fn threshold_plane<S, F>(source: &S, mut predicate: F) -> Result<RunLengthBinaryArray2D>
where
    S: ScalarArray + ?Sized,
    F: FnMut(f64) -> bool,
{
    let dims = expect_dims(source.dims(), 2)?;
    let out = RunLengthBinaryArray2D::from_fn(dims[0], dims[1], |x, y| {
        source.get_value(&[x, y]).is_ok_and(|v| predicate(v))
    })?;
    debug!(dims = ?dims, runs = out.run_count(), "threshold plane");
    Ok(out)
}

/// Build a 3D array whose voxels are `predicate(value)`.
///
/// # Errors
///
/// Returns [`Error::DimensionalityMismatch`] if `source` is not 3D.
pub fn threshold_volume<S, F>(source: &S, mut predicate: F) -> Result<RunLengthBinaryArray3D>
where
    S: ScalarArray + ?Sized,
    F: FnMut(f64) -> bool,
{
    let dims = expect_dims(source.dims(), 3)?;
    let out = RunLengthBinaryArray3D::from_fn(dims[0], dims[1], dims[2], |x, y, z| {
        source.get_value(&[x, y, z]).is_ok_and(|v| predicate(v))
    })?;
    debug!(dims = ?dims, runs = out.run_count(), "threshold volume");
    Ok(out)
}

/// Set every pixel whose value is at least `threshold`.
pub fn threshold_at_least<S>(source: &S, threshold: f64) -> Result<RunLengthBinaryArray2D>
where
    S: ScalarArray + ?Sized,
{
    threshold_plane(source, |v| v >= threshold)
}

/// Set every voxel whose value is at least `threshold`.
pub fn threshold_volume_at_least<S>(source: &S, threshold: f64) -> Result<RunLengthBinaryArray3D>
where
    S: ScalarArray + ?Sized,
{
    threshold_volume(source, |v| v >= threshold)
}

/// Set every pixel whose value lies in `[low, high]`, e.g. one label of a
/// label image.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `low > high` or either bound is NaN.
pub fn threshold_between<S>(source: &S, low: f64, high: f64) -> Result<RunLengthBinaryArray2D>
where
    S: ScalarArray + ?Sized,
{
    if low.is_nan() || high.is_nan() || low > high {
        return Err(Error::InvalidParameter(format!(
            "threshold range [{low}, {high}] is empty"
        )));
    }
    threshold_plane(source, |v| v >= low && v <= high)
}

fn expect_dims(dims: &[u32], ndim: usize) -> Result<&[u32]> {
    if dims.len() != ndim {
        return Err(Error::DimensionalityMismatch {
            expected: ndim,
            actual: dims.len(),
        });
    }
    Ok(dims)
}
