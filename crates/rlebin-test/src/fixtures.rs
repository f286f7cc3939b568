//! Deterministic pseudo-random test arrays
//!
//! Every fixture is a pure function of its seed, so a failing regression
//! test can be replayed exactly.

use crate::error::{TestError, TestResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rlebin_core::{BinaryArray, DenseBinaryArray, RunLengthBinaryArray2D, RunLengthBinaryArray3D};

fn check_density(density: f64) -> TestResult<()> {
    if !(0.0..=1.0).contains(&density) {
        return Err(TestError::InvalidParameter(format!(
            "density {density} outside [0, 1]"
        )));
    }
    Ok(())
}

/// 2D array with each pixel set independently with probability `density`.
pub fn random_plane(seed: u64, width: u32, height: u32, density: f64) -> TestResult<RunLengthBinaryArray2D> {
    check_density(density)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(RunLengthBinaryArray2D::from_fn(width, height, |_, _| {
        rng.random_bool(density)
    })?)
}

/// 3D array with each voxel set independently with probability `density`.
pub fn random_volume(
    seed: u64,
    width: u32,
    height: u32,
    depth: u32,
    density: f64,
) -> TestResult<RunLengthBinaryArray3D> {
    check_density(density)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(RunLengthBinaryArray3D::from_fn(width, height, depth, |_, _, _| {
        rng.random_bool(density)
    })?)
}

/// 2D array made of `count` random filled rectangles, each side at most
/// `max_side`; rectangles may cross the border and are clipped.
pub fn random_blobs(seed: u64, width: u32, height: u32, count: usize, max_side: u32) -> TestResult<RunLengthBinaryArray2D> {
    if max_side == 0 {
        return Err(TestError::InvalidParameter("max_side must be > 0".into()));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut array = RunLengthBinaryArray2D::new(width, height)?;
    let (w, h) = (width as i32, height as i32);
    for _ in 0..count {
        let x0 = rng.random_range(-2..w);
        let y0 = rng.random_range(-2..h);
        let bw = rng.random_range(1..=max_side) as i32;
        let bh = rng.random_range(1..=max_side) as i32;
        for y in y0.max(0)..(y0 + bh).min(h) {
            for x in x0.max(0)..(x0 + bw).min(w) {
                array.set(x, y, true)?;
            }
        }
    }
    Ok(array)
}

/// Dense array of any shape with each position set with probability
/// `density`.
pub fn random_dense(seed: u64, dims: &[u32], density: f64) -> TestResult<DenseBinaryArray> {
    check_density(density)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut array = DenseBinaryArray::new(dims)?;
    let mut status = Ok(());
    rlebin_core::array::for_each_position(dims, |pos| {
        if status.is_ok() && rng.random_bool(density) {
            status = array.set_boolean(pos, true);
        }
    });
    status?;
    Ok(array)
}
