//! 2D run-length encoded binary array

use crate::array::{BinaryArray, RunLengthArray, RunLengthRef, check_position, validate_dims};
use crate::dense::DenseBinaryArray;
use crate::error::{Error, Result};
use crate::row::{BinaryRow, RowBuilder};
use crate::run::Run;
use std::collections::BTreeMap;

/// A binary image stored as one [`BinaryRow`] per non-empty scanline.
///
/// Rows absent from the map are all-false. The map never holds an empty
/// row, so mostly-empty images stay small.
///
/// # Examples
///
/// ```
/// use rlebin_core::RunLengthBinaryArray2D;
///
/// let mut mask = RunLengthBinaryArray2D::new(8, 6).unwrap();
/// mask.set(2, 1, true).unwrap();
/// mask.set(3, 1, true).unwrap();
/// assert!(mask.get(3, 1).unwrap());
/// assert_eq!(mask.row(1).unwrap().run_count(), 1);
/// assert!(mask.set(8, 0, true).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunLengthBinaryArray2D {
    /// [width, height]
    size: [u32; 2],
    /// y -> row
    rows: BTreeMap<i32, BinaryRow>,
}

impl RunLengthBinaryArray2D {
    /// Create an all-false array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either extent is 0 or exceeds
    /// `i32::MAX`.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        validate_dims(&[width, height])?;
        Ok(RunLengthBinaryArray2D {
            size: [width, height],
            rows: BTreeMap::new(),
        })
    }

    /// Empty array of an already validated size.
    pub(crate) fn empty_unchecked(width: u32, height: u32) -> Self {
        RunLengthBinaryArray2D {
            size: [width, height],
            rows: BTreeMap::new(),
        }
    }

    /// Store a non-empty row already clipped to the width.
    pub(crate) fn insert_row_unchecked(&mut self, y: i32, row: BinaryRow) {
        debug_assert!(!row.is_empty());
        self.rows.insert(y, row);
    }

    /// Check whether no row is stored.
    pub(crate) fn is_empty_plane(&self) -> bool {
        self.rows.is_empty()
    }

    /// Create an array whose pixels are given by `predicate(x, y)`.
    pub fn from_fn<F>(width: u32, height: u32, predicate: F) -> Result<Self>
    where
        F: FnMut(i32, i32) -> bool,
    {
        let mut array = Self::new(width, height)?;
        array.fill_booleans(predicate);
        Ok(array)
    }

    /// Wrap a prepared row map.
    ///
    /// Rows are clipped to the width and empty rows dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] if a key lies outside
    /// `[0, height)`.
    pub fn from_row_map(width: u32, height: u32, rows: BTreeMap<i32, BinaryRow>) -> Result<Self> {
        let mut array = Self::new(width, height)?;
        for (y, row) in rows {
            array.put_row(y, row)?;
        }
        Ok(array)
    }

    /// Encode any 2D binary array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionalityMismatch`] if `source` is not 2D.
    pub fn from_binary(source: &dyn BinaryArray) -> Result<Self> {
        let dims = source.dims();
        if dims.len() != 2 {
            return Err(Error::DimensionalityMismatch {
                expected: 2,
                actual: dims.len(),
            });
        }
        if let Some(RunLengthRef::Plane(plane)) = source.as_run_length() {
            return Ok(plane.clone());
        }
        Self::from_fn(dims[0], dims[1], |x, y| {
            source.get_boolean(&[x, y]).unwrap_or(false)
        })
    }

    /// Width (scanline length).
    #[inline]
    pub fn width(&self) -> u32 {
        self.size[0]
    }

    /// Height (number of scanlines).
    #[inline]
    pub fn height(&self) -> u32 {
        self.size[1]
    }

    /// Size as (width, height).
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.size[0], self.size[1])
    }

    /// Get the pixel at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] outside the array.
    pub fn get(&self, x: i32, y: i32) -> Result<bool> {
        check_position(&[x, y], &self.size)?;
        Ok(self.get_unchecked(x, y))
    }

    /// Get the pixel at (x, y); positions outside the array read as false.
    #[inline]
    pub fn get_unchecked(&self, x: i32, y: i32) -> bool {
        self.rows.get(&y).is_some_and(|row| row.get(x))
    }

    /// Set the pixel at (x, y).
    ///
    /// A row is created on the first `true` write and removed once it
    /// becomes empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] outside the array.
    pub fn set(&mut self, x: i32, y: i32, state: bool) -> Result<()> {
        check_position(&[x, y], &self.size)?;
        if state {
            self.rows.entry(y).or_default().set(x, true);
        } else if let Some(row) = self.rows.get_mut(&y) {
            row.set(x, false);
            if row.is_empty() {
                self.rows.remove(&y);
            }
        }
        Ok(())
    }

    /// Row `y`, if it has any set pixel.
    pub fn row(&self, y: i32) -> Option<&BinaryRow> {
        self.rows.get(&y)
    }

    /// Non-empty rows in ascending `y`.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = (i32, &BinaryRow)> + '_ {
        self.rows.iter().map(|(&y, row)| (y, row))
    }

    /// The underlying row map.
    pub fn row_map(&self) -> &BTreeMap<i32, BinaryRow> {
        &self.rows
    }

    /// Consume the array, returning its row map.
    pub fn into_row_map(self) -> BTreeMap<i32, BinaryRow> {
        self.rows
    }

    /// Replace row `y`, clipping it to the width; an empty row is removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] if `y` is outside `[0, height)`.
    pub fn put_row(&mut self, y: i32, row: BinaryRow) -> Result<()> {
        if y < 0 || y as u32 >= self.height() {
            return Err(Error::PositionOutOfBounds {
                pos: vec![0, y],
                size: self.size.to_vec(),
            });
        }
        let max_x = self.width() as i32 - 1;
        let row = match row.hull() {
            Some(hull) if hull.start() >= 0 && hull.end() <= max_x => row,
            Some(_) => row.clip(0, max_x),
            None => row,
        };
        if row.is_empty() {
            self.rows.remove(&y);
        } else {
            self.rows.insert(y, row);
        }
        Ok(())
    }

    /// Rebuild every row from `predicate(x, y)`.
    ///
    /// Each row is built by one left-to-right scan that opens a run when the
    /// predicate turns true and closes it when it turns false.
    pub fn fill_booleans<F>(&mut self, mut predicate: F)
    where
        F: FnMut(i32, i32) -> bool,
    {
        self.rows.clear();
        let width = self.width() as i32;
        for y in 0..self.height() as i32 {
            let row = scan_row(width, |x| predicate(x, y));
            if !row.is_empty() {
                self.rows.insert(y, row);
            }
        }
    }

    /// Remove every set pixel.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Smallest (x-range, y-range) holding every set pixel.
    pub fn bounding_box(&self) -> Option<(Run, Run)> {
        let (&y0, _) = self.rows.first_key_value()?;
        let (&y1, _) = self.rows.last_key_value()?;
        let x0 = self.rows.values().filter_map(|row| row.first()).map(|r| r.start()).min()?;
        let x1 = self.rows.values().filter_map(|row| row.last()).map(|r| r.end()).max()?;
        Some((Run::new(x0, x1).ok()?, Run::new(y0, y1).ok()?))
    }

    /// Expand into a bit-packed dense array.
    pub fn to_dense(&self) -> DenseBinaryArray {
        let mut dense = DenseBinaryArray::zeros(&self.size);
        for (&y, row) in &self.rows {
            let line = y as usize;
            for run in row.runs() {
                dense.set_line_span(line, run.start() as u32, run.end() as u32);
            }
        }
        dense
    }
}

/// Build one canonical row of `width` positions from a predicate scan.
pub(crate) fn scan_row(width: i32, mut predicate: impl FnMut(i32) -> bool) -> BinaryRow {
    let mut builder = RowBuilder::new();
    let mut open: Option<i32> = None;
    for x in 0..width {
        match (predicate(x), open) {
            (true, None) => open = Some(x),
            (false, Some(start)) => {
                builder.push(start, x - 1);
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        builder.push(start, width - 1);
    }
    builder.finish()
}

impl BinaryArray for RunLengthBinaryArray2D {
    fn dims(&self) -> &[u32] {
        &self.size
    }

    fn get_boolean(&self, pos: &[i32]) -> Result<bool> {
        check_position(pos, &self.size)?;
        Ok(self.get_unchecked(pos[0], pos[1]))
    }

    fn set_boolean(&mut self, pos: &[i32], state: bool) -> Result<()> {
        check_position(pos, &self.size)?;
        self.set(pos[0], pos[1], state)
    }

    fn as_run_length(&self) -> Option<RunLengthRef<'_>> {
        Some(RunLengthRef::Plane(self))
    }

    fn count_true(&self) -> u64 {
        RunLengthArray::pixel_count(self)
    }
}

impl RunLengthArray for RunLengthBinaryArray2D {
    type Key = i32;

    fn width(&self) -> u32 {
        self.size[0]
    }

    fn row(&self, key: i32) -> Option<&BinaryRow> {
        self.rows.get(&key)
    }

    fn rows(&self) -> impl Iterator<Item = (i32, &BinaryRow)> + '_ {
        self.rows.iter().map(|(&y, row)| (y, row))
    }

    fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        0..self.size[1] as i32
    }

    fn key_count(&self) -> usize {
        self.size[1] as usize
    }

    fn put_row(&mut self, key: i32, row: BinaryRow) -> Result<()> {
        RunLengthBinaryArray2D::put_row(self, key, row)
    }

    fn new_instance(&self) -> Self {
        RunLengthBinaryArray2D {
            size: self.size,
            rows: BTreeMap::new(),
        }
    }

    fn progress_units(&self) -> usize {
        self.size[1] as usize
    }

    fn progress_unit(&self, key: i32) -> usize {
        key as usize
    }

    fn stored_row_count(&self) -> usize {
        self.rows.len()
    }
}
