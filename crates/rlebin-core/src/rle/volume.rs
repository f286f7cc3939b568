//! 3D run-length encoded binary array
//!
//! A volume is a sparse stack of 2D planes indexed by `z`. Each stored plane
//! is a [`RunLengthBinaryArray2D`], so a plane can be handed to any 2D
//! operation without copying.

use crate::array::{BinaryArray, RunLengthArray, RunLengthRef, check_position, validate_dims};
use crate::dense::DenseBinaryArray;
use crate::error::{Error, Result};
use crate::rle::plane::{RunLengthBinaryArray2D, scan_row};
use crate::row::BinaryRow;
use crate::run::Run;
use std::collections::BTreeMap;

/// A binary volume stored as one [`BinaryRow`] per non-empty `(y, z)` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunLengthBinaryArray3D {
    /// [width, height, depth]
    size: [u32; 3],
    /// z -> plane; never holds an empty plane
    planes: BTreeMap<i32, RunLengthBinaryArray2D>,
}

impl RunLengthBinaryArray3D {
    /// Create an all-false volume.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if any extent is 0 or exceeds
    /// `i32::MAX`.
    pub fn new(width: u32, height: u32, depth: u32) -> Result<Self> {
        validate_dims(&[width, height, depth])?;
        Ok(RunLengthBinaryArray3D {
            size: [width, height, depth],
            planes: BTreeMap::new(),
        })
    }

    /// Create a volume whose voxels are given by `predicate(x, y, z)`.
    pub fn from_fn<F>(width: u32, height: u32, depth: u32, predicate: F) -> Result<Self>
    where
        F: FnMut(i32, i32, i32) -> bool,
    {
        let mut volume = Self::new(width, height, depth)?;
        volume.fill_booleans(predicate);
        Ok(volume)
    }

    /// Encode any 3D binary array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionalityMismatch`] if `source` is not 3D.
    pub fn from_binary(source: &dyn BinaryArray) -> Result<Self> {
        let dims = source.dims();
        if dims.len() != 3 {
            return Err(Error::DimensionalityMismatch {
                expected: 3,
                actual: dims.len(),
            });
        }
        if let Some(RunLengthRef::Volume(volume)) = source.as_run_length() {
            return Ok(volume.clone());
        }
        Self::from_fn(dims[0], dims[1], dims[2], |x, y, z| {
            source.get_boolean(&[x, y, z]).unwrap_or(false)
        })
    }

    /// Width (scanline length).
    #[inline]
    pub fn width(&self) -> u32 {
        self.size[0]
    }

    /// Height (scanlines per plane).
    #[inline]
    pub fn height(&self) -> u32 {
        self.size[1]
    }

    /// Depth (number of planes).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.size[2]
    }

    /// Size as (width, height, depth).
    #[inline]
    pub fn size(&self) -> (u32, u32, u32) {
        (self.size[0], self.size[1], self.size[2])
    }

    /// Get the voxel at (x, y, z).
    pub fn get(&self, x: i32, y: i32, z: i32) -> Result<bool> {
        check_position(&[x, y, z], &self.size)?;
        Ok(self.get_unchecked(x, y, z))
    }

    /// Get the voxel at (x, y, z); positions outside read as false.
    #[inline]
    pub fn get_unchecked(&self, x: i32, y: i32, z: i32) -> bool {
        self.planes
            .get(&z)
            .is_some_and(|plane| plane.get_unchecked(x, y))
    }

    /// Set the voxel at (x, y, z), creating or pruning rows and planes.
    pub fn set(&mut self, x: i32, y: i32, z: i32, state: bool) -> Result<()> {
        check_position(&[x, y, z], &self.size)?;
        if state {
            self.plane_entry(z).set(x, y, true)?;
        } else if let Some(plane) = self.planes.get_mut(&z) {
            plane.set(x, y, false)?;
            if plane.is_empty() {
                self.planes.remove(&z);
            }
        }
        Ok(())
    }

    fn plane_entry(&mut self, z: i32) -> &mut RunLengthBinaryArray2D {
        let (width, height) = (self.size[0], self.size[1]);
        self.planes.entry(z).or_insert_with(|| empty_plane(width, height))
    }

    /// Plane `z`, if it has any set voxel.
    pub fn plane(&self, z: i32) -> Option<&RunLengthBinaryArray2D> {
        self.planes.get(&z)
    }

    /// Non-empty planes in ascending `z`.
    pub fn planes(&self) -> impl DoubleEndedIterator<Item = (i32, &RunLengthBinaryArray2D)> + '_ {
        self.planes.iter().map(|(&z, plane)| (z, plane))
    }

    /// Owned copy of plane `z` (empty if nothing is set there).
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] if `z` is outside `[0, depth)`.
    pub fn slice(&self, z: i32) -> Result<RunLengthBinaryArray2D> {
        self.check_plane(z)?;
        Ok(self
            .planes
            .get(&z)
            .cloned()
            .unwrap_or_else(|| empty_plane(self.size[0], self.size[1])))
    }

    /// Replace plane `z`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] if `z` is outside the volume or
    /// [`Error::IncompatibleSizes`] if the plane size differs.
    pub fn put_plane(&mut self, z: i32, plane: RunLengthBinaryArray2D) -> Result<()> {
        self.check_plane(z)?;
        let expected = [self.size[0], self.size[1]];
        if plane.dims() != expected {
            return Err(Error::IncompatibleSizes(
                expected.to_vec(),
                plane.dims().to_vec(),
            ));
        }
        if plane.is_empty() {
            self.planes.remove(&z);
        } else {
            self.planes.insert(z, plane);
        }
        Ok(())
    }

    /// Row `y` of plane `z`, if it has any set voxel.
    pub fn row(&self, z: i32, y: i32) -> Option<&BinaryRow> {
        self.planes.get(&z).and_then(|plane| plane.row(y))
    }

    /// Replace row `y` of plane `z`.
    pub fn put_row(&mut self, z: i32, y: i32, row: BinaryRow) -> Result<()> {
        check_position(&[0, y, z], &self.size)?;
        if row.is_empty() {
            if let Some(plane) = self.planes.get_mut(&z) {
                plane.put_row(y, row)?;
                if plane.is_empty() {
                    self.planes.remove(&z);
                }
            }
            return Ok(());
        }
        let plane = self.plane_entry(z);
        plane.put_row(y, row)?;
        if plane.is_empty() {
            self.planes.remove(&z);
        }
        Ok(())
    }

    /// Rebuild every row from `predicate(x, y, z)`, one scan per row.
    pub fn fill_booleans<F>(&mut self, mut predicate: F)
    where
        F: FnMut(i32, i32, i32) -> bool,
    {
        self.planes.clear();
        let (width, height, depth) = (self.size[0], self.size[1], self.size[2]);
        for z in 0..depth as i32 {
            let mut plane = empty_plane(width, height);
            for y in 0..height as i32 {
                let row = scan_row(width as i32, |x| predicate(x, y, z));
                if !row.is_empty() {
                    plane.insert_row_unchecked(y, row);
                }
            }
            if !plane.is_empty_plane() {
                self.planes.insert(z, plane);
            }
        }
    }

    /// Remove every set voxel.
    pub fn clear(&mut self) {
        self.planes.clear();
    }

    /// Smallest (x-range, y-range, z-range) holding every set voxel.
    pub fn bounding_box(&self) -> Option<(Run, Run, Run)> {
        let (&z0, _) = self.planes.first_key_value()?;
        let (&z1, _) = self.planes.last_key_value()?;
        let boxes: Vec<(Run, Run)> = self
            .planes
            .values()
            .filter_map(|plane| plane.bounding_box())
            .collect();
        let x0 = boxes.iter().map(|(x, _)| x.start()).min()?;
        let x1 = boxes.iter().map(|(x, _)| x.end()).max()?;
        let y0 = boxes.iter().map(|(_, y)| y.start()).min()?;
        let y1 = boxes.iter().map(|(_, y)| y.end()).max()?;
        Some((
            Run::new(x0, x1).ok()?,
            Run::new(y0, y1).ok()?,
            Run::new(z0, z1).ok()?,
        ))
    }

    /// Expand into a bit-packed dense array.
    pub fn to_dense(&self) -> DenseBinaryArray {
        let mut dense = DenseBinaryArray::zeros(&self.size);
        let height = self.size[1] as usize;
        for (&z, plane) in &self.planes {
            for (y, row) in plane.rows() {
                let line = z as usize * height + y as usize;
                for run in row.runs() {
                    dense.set_line_span(line, run.start() as u32, run.end() as u32);
                }
            }
        }
        dense
    }

    fn check_plane(&self, z: i32) -> Result<()> {
        if z < 0 || z as u32 >= self.size[2] {
            return Err(Error::PositionOutOfBounds {
                pos: vec![0, 0, z],
                size: self.size.to_vec(),
            });
        }
        Ok(())
    }
}

fn empty_plane(width: u32, height: u32) -> RunLengthBinaryArray2D {
    RunLengthBinaryArray2D::empty_unchecked(width, height)
}

impl BinaryArray for RunLengthBinaryArray3D {
    fn dims(&self) -> &[u32] {
        &self.size
    }

    fn get_boolean(&self, pos: &[i32]) -> Result<bool> {
        check_position(pos, &self.size)?;
        Ok(self.get_unchecked(pos[0], pos[1], pos[2]))
    }

    fn set_boolean(&mut self, pos: &[i32], state: bool) -> Result<()> {
        check_position(pos, &self.size)?;
        self.set(pos[0], pos[1], pos[2], state)
    }

    fn as_run_length(&self) -> Option<RunLengthRef<'_>> {
        Some(RunLengthRef::Volume(self))
    }

    fn count_true(&self) -> u64 {
        RunLengthArray::pixel_count(self)
    }
}

impl RunLengthArray for RunLengthBinaryArray3D {
    /// (z, y)
    type Key = (i32, i32);

    fn width(&self) -> u32 {
        self.size[0]
    }

    fn row(&self, key: (i32, i32)) -> Option<&BinaryRow> {
        RunLengthBinaryArray3D::row(self, key.0, key.1)
    }

    fn rows(&self) -> impl Iterator<Item = ((i32, i32), &BinaryRow)> + '_ {
        self.planes
            .iter()
            .flat_map(|(&z, plane)| plane.rows().map(move |(y, row)| ((z, y), row)))
    }

    fn keys(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let height = self.size[1] as i32;
        (0..self.size[2] as i32).flat_map(move |z| (0..height).map(move |y| (z, y)))
    }

    fn key_count(&self) -> usize {
        self.size[1] as usize * self.size[2] as usize
    }

    fn put_row(&mut self, key: (i32, i32), row: BinaryRow) -> Result<()> {
        RunLengthBinaryArray3D::put_row(self, key.0, key.1, row)
    }

    fn new_instance(&self) -> Self {
        RunLengthBinaryArray3D {
            size: self.size,
            planes: BTreeMap::new(),
        }
    }

    fn progress_units(&self) -> usize {
        self.size[2] as usize
    }

    fn progress_unit(&self, key: (i32, i32)) -> usize {
        key.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_depth() {
        assert!(RunLengthBinaryArray3D::new(4, 4, 0).is_err());
    }

    #[test]
    fn test_set_get_and_prune() {
        let mut v = RunLengthBinaryArray3D::new(6, 5, 4).unwrap();
        v.set(1, 2, 3, true).unwrap();
        v.set(2, 2, 3, true).unwrap();
        assert!(v.get(2, 2, 3).unwrap());
        assert!(!v.get(2, 2, 2).unwrap());
        assert_eq!(v.row(3, 2).unwrap().run_count(), 1);

        v.set(1, 2, 3, false).unwrap();
        v.set(2, 2, 3, false).unwrap();
        assert!(v.plane(3).is_none());
        assert!(RunLengthArray::is_empty(&v));
        assert!(v.set(0, 0, 4, true).is_err());
    }

    #[test]
    fn test_slice_and_put_plane() {
        let mut v = RunLengthBinaryArray3D::new(6, 5, 4).unwrap();
        let plane = RunLengthBinaryArray2D::from_fn(6, 5, |x, y| x == y).unwrap();
        v.put_plane(2, plane.clone()).unwrap();
        assert_eq!(v.slice(2).unwrap(), plane);
        assert!(RunLengthArray::is_empty(&v.slice(0).unwrap()));
        assert!(v.slice(4).is_err());

        let wrong = RunLengthBinaryArray2D::new(5, 5).unwrap();
        assert!(matches!(
            v.put_plane(1, wrong),
            Err(Error::IncompatibleSizes(_, _))
        ));
    }

    #[test]
    fn test_fill_and_keys() {
        let v = RunLengthBinaryArray3D::from_fn(8, 3, 2, |x, y, z| x >= 2 && x <= 4 && y == z).unwrap();
        assert_eq!(v.stored_row_count(), 2);
        assert_eq!(RunLengthArray::pixel_count(&v), 6);
        let keys: Vec<(i32, i32)> = v.keys().collect();
        assert_eq!(keys.len(), v.key_count());
        assert_eq!(keys[0], (0, 0));
        assert_eq!(keys[3], (1, 0));
        let stored: Vec<(i32, i32)> = RunLengthArray::rows(&v).map(|(k, _)| k).collect();
        assert_eq!(stored, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_bounding_box_and_dense() {
        let mut v = RunLengthBinaryArray3D::new(9, 7, 5).unwrap();
        v.set(2, 1, 1, true).unwrap();
        v.set(6, 5, 3, true).unwrap();
        let (xr, yr, zr) = v.bounding_box().unwrap();
        assert_eq!((xr.start(), xr.end()), (2, 6));
        assert_eq!((yr.start(), yr.end()), (1, 5));
        assert_eq!((zr.start(), zr.end()), (1, 3));

        let dense = v.to_dense();
        assert_eq!(dense.count_true(), 2);
        assert!(dense.get_boolean(&[6, 5, 3]).unwrap());
        assert_eq!(RunLengthBinaryArray3D::from_binary(&dense).unwrap(), v);
    }
}
