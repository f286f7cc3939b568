//! Scalar sources for RLE construction
//!
//! [`ScalarArray`] is the read-only view thresholding consumes.
//! [`ScalarGrid`] is a dense row-major `f64` grid of any dimensionality.
//!
//! # Examples
//!
//! ```
//! use rlebin_core::{ScalarArray, ScalarGrid};
//!
//! let mut grid = ScalarGrid::new(&[100, 100]).unwrap();
//! grid.set(&[10, 20], 0.5).unwrap();
//! assert_eq!(grid.get_value(&[10, 20]).unwrap(), 0.5);
//! ```

use crate::array::{check_position, validate_dims};
use crate::error::{Error, Result};

/// Any numeric array addressable by integer positions.
pub trait ScalarArray {
    /// Extent along each axis, `x` first.
    fn dims(&self) -> &[u32];

    /// Value at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionalityMismatch`] or
    /// [`Error::PositionOutOfBounds`] for an invalid position.
    fn get_value(&self, pos: &[i32]) -> Result<f64>;
}

/// Dense scalar grid
///
/// Data is stored with no padding, `x` fastest. The value at `[x, y, z]`
/// is at index `(z * height + y) * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    dims: Vec<u32>,
    data: Vec<f64>,
}

impl ScalarGrid {
    /// Create a grid with all values set to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if any extent is 0.
    pub fn new(dims: &[u32]) -> Result<Self> {
        Self::new_with_value(dims, 0.0)
    }

    /// Create a grid with all values set to `value`.
    pub fn new_with_value(dims: &[u32], value: f64) -> Result<Self> {
        validate_dims(dims)?;
        let len = element_count(dims);
        Ok(ScalarGrid {
            dims: dims.to_vec(),
            data: vec![value; len],
        })
    }

    /// Create a grid from raw data, `x` fastest.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or the data length doesn't
    /// match.
    pub fn from_data(dims: &[u32], data: Vec<f64>) -> Result<Self> {
        validate_dims(dims)?;
        let expected = element_count(dims);
        if data.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {:?} = {}",
                data.len(),
                dims,
                expected
            )));
        }
        Ok(ScalarGrid {
            dims: dims.to_vec(),
            data,
        })
    }

    /// Create a grid whose values are given by `f(pos)`.
    pub fn from_fn(dims: &[u32], mut f: impl FnMut(&[i32]) -> f64) -> Result<Self> {
        validate_dims(dims)?;
        let mut data = Vec::with_capacity(element_count(dims));
        crate::array::for_each_position(dims, |pos| data.push(f(pos)));
        Ok(ScalarGrid {
            dims: dims.to_vec(),
            data,
        })
    }

    /// Set the value at `pos`.
    pub fn set(&mut self, pos: &[i32], value: f64) -> Result<()> {
        check_position(pos, &self.dims)?;
        let idx = self.index(pos);
        self.data[idx] = value;
        Ok(())
    }

    /// Raw values, `x` fastest.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable raw values.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Minimum and maximum value.
    pub fn min_max(&self) -> (f64, f64) {
        self.data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    fn index(&self, pos: &[i32]) -> usize {
        let mut idx = 0usize;
        for (&p, &d) in pos.iter().zip(&self.dims).rev() {
            idx = idx * d as usize + p as usize;
        }
        idx
    }
}

fn element_count(dims: &[u32]) -> usize {
    dims.iter().map(|&d| d as usize).product()
}

impl ScalarArray for ScalarGrid {
    fn dims(&self) -> &[u32] {
        &self.dims
    }

    fn get_value(&self, pos: &[i32]) -> Result<f64> {
        check_position(pos, &self.dims)?;
        Ok(self.data[self.index(pos)])
    }
}
