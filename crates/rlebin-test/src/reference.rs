//! Dense brute-force reference operators
//!
//! Straight per-position definitions of the set-algebra and morphology
//! operators, used to check the run-length implementations. Offsets are
//! `[dx, dy, dz]`; `dz` must be 0 for 2D arrays.

use crate::error::{TestError, TestResult};
use rlebin_core::array::for_each_position;
use rlebin_core::{BinaryArray, DenseBinaryArray};

/// One structuring-element offset `[dx, dy, dz]`.
pub type Offset = [i32; 3];

fn check_offsets(dims: &[u32], offsets: &[Offset]) -> TestResult<()> {
    if !matches!(dims.len(), 2 | 3) {
        return Err(TestError::InvalidParameter(format!(
            "reference operators need a 2D or 3D array, got {:?}",
            dims
        )));
    }
    if dims.len() == 2 && offsets.iter().any(|o| o[2] != 0) {
        return Err(TestError::InvalidParameter(
            "2D array with a non-planar offset".into(),
        ));
    }
    Ok(())
}

/// Value at `pos + offset`, or `None` outside the array.
fn shifted(source: &dyn BinaryArray, pos: &[i32], offset: &Offset) -> Option<bool> {
    let mut target = [0i32; 3];
    for (axis, &p) in pos.iter().enumerate() {
        target[axis] = p.checked_add(offset[axis])?;
    }
    source.get_boolean(&target[..pos.len()]).ok()
}

fn build(dims: &[u32], mut f: impl FnMut(&[i32]) -> bool) -> TestResult<DenseBinaryArray> {
    let mut out = DenseBinaryArray::new(dims)?;
    let mut status = Ok(());
    for_each_position(dims, |pos| {
        if status.is_ok() && f(pos) {
            status = out.set_boolean(pos, true);
        }
    });
    status?;
    Ok(out)
}

/// Dilation: a position is set when some `pos - offset` is set.
pub fn dilate(source: &dyn BinaryArray, offsets: &[Offset]) -> TestResult<DenseBinaryArray> {
    check_offsets(source.dims(), offsets)?;
    let reflected: Vec<Offset> = offsets.iter().map(|o| [-o[0], -o[1], -o[2]]).collect();
    build(source.dims(), |pos| {
        reflected
            .iter()
            .any(|o| shifted(source, pos, o).unwrap_or(false))
    })
}

/// Erosion: a position is set when every `pos + offset` is set.
///
/// With `outside_is_background`, an offset leaving the array clears the
/// position; otherwise such offsets are ignored.
pub fn erode(
    source: &dyn BinaryArray,
    offsets: &[Offset],
    outside_is_background: bool,
) -> TestResult<DenseBinaryArray> {
    check_offsets(source.dims(), offsets)?;
    build(source.dims(), |pos| {
        offsets
            .iter()
            .all(|o| shifted(source, pos, o).unwrap_or(!outside_is_background))
    })
}

/// Hit-miss transform: every `pos + hit` set and every `pos + miss` clear,
/// with positions outside the array treated as clear.
pub fn hit_miss(source: &dyn BinaryArray, hits: &[Offset], misses: &[Offset]) -> TestResult<DenseBinaryArray> {
    check_offsets(source.dims(), hits)?;
    check_offsets(source.dims(), misses)?;
    build(source.dims(), |pos| {
        hits.iter().all(|o| shifted(source, pos, o).unwrap_or(false))
            && misses.iter().all(|o| !shifted(source, pos, o).unwrap_or(false))
    })
}

/// Position-wise boolean combination of two arrays of the same shape.
pub fn combine(
    a: &dyn BinaryArray,
    b: &dyn BinaryArray,
    op: impl Fn(bool, bool) -> bool,
) -> TestResult<DenseBinaryArray> {
    if a.dims() != b.dims() {
        return Err(TestError::ShapeMismatch(a.dims().to_vec(), b.dims().to_vec()));
    }
    build(a.dims(), |pos| {
        op(
            a.get_boolean(pos).unwrap_or(false),
            b.get_boolean(pos).unwrap_or(false),
        )
    })
}

/// Position-wise complement.
pub fn complement(a: &dyn BinaryArray) -> TestResult<DenseBinaryArray> {
    build(a.dims(), |pos| !a.get_boolean(pos).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(w: u32, h: u32, x: i32, y: i32) -> DenseBinaryArray {
        let mut a = DenseBinaryArray::new(&[w, h]).unwrap();
        a.set_boolean(&[x, y], true).unwrap();
        a
    }

    #[test]
    fn test_dilate_moves_by_offset() {
        let out = dilate(&dot(5, 5, 2, 2), &[[1, 0, 0], [0, -1, 0]]).unwrap();
        assert_eq!(out.count_true(), 2);
        assert!(out.get_boolean(&[3, 2]).unwrap());
        assert!(out.get_boolean(&[2, 1]).unwrap());
    }

    #[test]
    fn test_erode_boundary_handling() {
        let full = complement(&DenseBinaryArray::new(&[4, 3]).unwrap()).unwrap();
        let cross = [[0, 0, 0], [1, 0, 0], [-1, 0, 0], [0, 1, 0], [0, -1, 0]];
        assert_eq!(erode(&full, &cross, false).unwrap().count_true(), 12);
        // Only the interior survives when the outside is background
        assert_eq!(erode(&full, &cross, true).unwrap().count_true(), 2);
    }

    #[test]
    fn test_rejects_non_planar_offsets() {
        assert!(dilate(&dot(3, 3, 0, 0), &[[0, 0, 1]]).is_err());
    }
}
