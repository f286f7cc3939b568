//! Bit-packed dense binary array
//!
//! Lines run along `x` and are packed into 32-bit words, padded to a whole
//! word. Within a word, the pixel with the lowest `x` occupies bit 31 (MSB).
//! Lines are stored in `y`-fastest order, then `z`, and so on.

use crate::array::{BinaryArray, check_position, validate_dims};
use crate::error::Result;
use crate::scalar::ScalarArray;

/// Dense binary array of any dimensionality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DenseBinaryArray {
    dims: Vec<u32>,
    /// Words per line
    wpl: usize,
    data: Vec<u32>,
}

impl DenseBinaryArray {
    /// Create an all-false array.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidDimension`] if `dims` is empty or any
    /// extent is 0 or exceeds `i32::MAX`.
    pub fn new(dims: &[u32]) -> Result<Self> {
        validate_dims(dims)?;
        Ok(Self::zeros(dims))
    }

    /// All-false array for already validated dimensions.
    pub(crate) fn zeros(dims: &[u32]) -> Self {
        let wpl = (dims[0] as usize).div_ceil(32);
        let lines: usize = dims[1..].iter().map(|&d| d as usize).product();
        DenseBinaryArray {
            dims: dims.to_vec(),
            wpl,
            data: vec![0; wpl * lines],
        }
    }

    /// Words per line.
    #[inline]
    pub fn wpl(&self) -> usize {
        self.wpl
    }

    /// Number of lines (product of all extents but `x`).
    #[inline]
    pub fn line_count(&self) -> usize {
        self.data.len() / self.wpl.max(1)
    }

    /// Raw packed words.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Packed words of line `index`, or `None` past the last line.
    pub fn line(&self, index: usize) -> Option<&[u32]> {
        let start = index.checked_mul(self.wpl)?;
        self.data.get(start..start.checked_add(self.wpl)?)
    }

    /// Set bits `x0..=x1` of line `line`, whole words at a time.
    pub(crate) fn set_line_span(&mut self, line: usize, x0: u32, x1: u32) {
        let base = line * self.wpl;
        let (w0, w1) = ((x0 >> 5) as usize, (x1 >> 5) as usize);
        let head = u32::MAX >> (x0 & 31);
        let tail = u32::MAX << (31 - (x1 & 31));
        if w0 == w1 {
            self.data[base + w0] |= head & tail;
            return;
        }
        self.data[base + w0] |= head;
        for word in &mut self.data[base + w0 + 1..base + w1] {
            *word = u32::MAX;
        }
        self.data[base + w1] |= tail;
    }

    /// Line index of a validated position.
    fn line_index(&self, pos: &[i32]) -> usize {
        let mut index = 0usize;
        let mut stride = 1usize;
        for (&p, &d) in pos[1..].iter().zip(&self.dims[1..]) {
            index += p as usize * stride;
            stride *= d as usize;
        }
        index
    }

    fn bit(&self, pos: &[i32]) -> (usize, u32) {
        let x = pos[0] as usize;
        let word = self.line_index(pos) * self.wpl + (x >> 5);
        (word, 0x8000_0000 >> (x & 31))
    }
}

impl BinaryArray for DenseBinaryArray {
    fn dims(&self) -> &[u32] {
        &self.dims
    }

    fn get_boolean(&self, pos: &[i32]) -> Result<bool> {
        check_position(pos, &self.dims)?;
        let (word, mask) = self.bit(pos);
        Ok(self.data[word] & mask != 0)
    }

    fn set_boolean(&mut self, pos: &[i32], state: bool) -> Result<()> {
        check_position(pos, &self.dims)?;
        let (word, mask) = self.bit(pos);
        if state {
            self.data[word] |= mask;
        } else {
            self.data[word] &= !mask;
        }
        Ok(())
    }

    fn count_true(&self) -> u64 {
        // Padding bits are never set
        self.data.iter().map(|w| w.count_ones() as u64).sum()
    }
}

impl ScalarArray for DenseBinaryArray {
    fn dims(&self) -> &[u32] {
        &self.dims
    }

    fn get_value(&self, pos: &[i32]) -> Result<f64> {
        Ok(if self.get_boolean(pos)? { 1.0 } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let a = DenseBinaryArray::new(&[33, 4, 2]).unwrap();
        assert_eq!(a.wpl(), 2);
        assert_eq!(a.line_count(), 8);
        assert_eq!(a.data().len(), 16);
        assert!(DenseBinaryArray::new(&[0, 3]).is_err());
    }

    #[test]
    fn test_msb_first() {
        let mut a = DenseBinaryArray::new(&[40, 2]).unwrap();
        a.set_boolean(&[0, 1], true).unwrap();
        a.set_boolean(&[33, 1], true).unwrap();
        assert_eq!(a.line(1), Some(&[0x8000_0000, 0x4000_0000][..]));
        assert_eq!(a.line(2), None);
        assert_eq!(a.line(usize::MAX), None);
        assert_eq!(a.count_true(), 2);
        a.set_boolean(&[0, 1], false).unwrap();
        assert_eq!(a.count_true(), 1);
        assert!(a.get_boolean(&[40, 0]).is_err());
    }

    #[test]
    fn test_set_line_span() {
        let mut a = DenseBinaryArray::new(&[100, 1]).unwrap();
        a.set_line_span(0, 3, 5);
        assert_eq!(a.line(0).map(|l| l[0]), Some(0x1C00_0000));
        a.set_line_span(0, 30, 70);
        assert_eq!(a.count_true(), 3 + 41);
        for x in 0..100 {
            let expected = (3..=5).contains(&x) || (30..=70).contains(&x);
            assert_eq!(a.get_boolean(&[x, 0]).unwrap(), expected, "x = {x}");
        }
    }

    #[test]
    fn test_scalar_view() {
        let mut a = DenseBinaryArray::new(&[4, 4]).unwrap();
        a.set_boolean(&[2, 3], true).unwrap();
        assert_eq!(a.get_value(&[2, 3]).unwrap(), 1.0);
        assert_eq!(a.get_value(&[1, 3]).unwrap(), 0.0);
    }
}
