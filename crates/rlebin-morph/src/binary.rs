//! Binary morphological operations
//!
//! Implements dilation, erosion and the operations built from them for
//! run-length encoded 2D and 3D arrays. Pixels are never visited one at a
//! time; every step works on whole runs.
//!
//! Dilation: the structuring element is decomposed into lines of
//! horizontal spans (see [`SelDecomposition`]). Each stored row `(z, y)` is
//! dilated once per distinct span list with [`BinaryRow::dilate_by`] and the
//! result is contributed to row `(z + dz, y + dy)` for every line sharing
//! that list. Contributions are unioned by one sort and merge per output
//! row.
//!
//! Erosion is the dual: `erode(A) = !dilate(!A, reflect(SE))`, with the
//! treatment of the image border chosen by [`BoundaryCondition`].

use crate::decompose::SelDecomposition;
use crate::sel::Sel;
use crate::{MorphError, MorphResult};
use rlebin_core::{
    BinaryRow, LogicalOp, NoProgress, ProgressObserver, ProgressTracker, Run, RunLengthArray,
    RunLengthBinaryArray2D, RunLengthBinaryArray3D, complement,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Row address shared by both array kinds, `(z, y)`; `z` is 0 in 2D.
pub type RowKey = (i32, i32);

/// Row-level access needed by the morphology engine.
///
/// Implemented by [`RunLengthBinaryArray2D`] and [`RunLengthBinaryArray3D`].
pub trait RunLengthMorph: RunLengthArray {
    /// Dimensionality, 2 or 3
    const NDIM: usize;

    /// `[width, height, depth]`; depth is 1 in 2D
    fn extent(&self) -> [u32; 3];

    /// Stored rows in ascending `(z, y)` order
    fn keyed_rows(&self) -> impl Iterator<Item = (RowKey, &BinaryRow)> + '_;

    /// The array's own key for a row address
    fn row_key(key: RowKey) -> Self::Key;

    /// Build an array of the given extent from rows that lie inside it
    fn from_keyed_rows(extent: [u32; 3], rows: BTreeMap<RowKey, BinaryRow>) -> MorphResult<Self>;
}

impl RunLengthMorph for RunLengthBinaryArray2D {
    const NDIM: usize = 2;

    fn extent(&self) -> [u32; 3] {
        [self.width(), self.height(), 1]
    }

    fn keyed_rows(&self) -> impl Iterator<Item = (RowKey, &BinaryRow)> + '_ {
        self.rows().map(|(y, row)| ((0, y), row))
    }

    fn row_key(key: RowKey) -> i32 {
        key.1
    }

    fn from_keyed_rows(extent: [u32; 3], rows: BTreeMap<RowKey, BinaryRow>) -> MorphResult<Self> {
        if extent[2] != 1 {
            return Err(MorphError::InvalidParameters(format!(
                "2D array with depth {}",
                extent[2]
            )));
        }
        let rows = rows
            .into_iter()
            .filter(|((z, _), _)| *z == 0)
            .map(|((_, y), row)| (y, row))
            .collect();
        Ok(RunLengthBinaryArray2D::from_row_map(extent[0], extent[1], rows)?)
    }
}

impl RunLengthMorph for RunLengthBinaryArray3D {
    const NDIM: usize = 3;

    fn extent(&self) -> [u32; 3] {
        [self.width(), self.height(), self.depth()]
    }

    fn keyed_rows(&self) -> impl Iterator<Item = (RowKey, &BinaryRow)> + '_ {
        RunLengthArray::rows(self)
    }

    fn row_key(key: RowKey) -> RowKey {
        key
    }

    fn from_keyed_rows(extent: [u32; 3], rows: BTreeMap<RowKey, BinaryRow>) -> MorphResult<Self> {
        let mut out = RunLengthBinaryArray3D::new(extent[0], extent[1], extent[2])?;
        for ((z, y), row) in rows {
            out.put_row(z, y, row)?;
        }
        Ok(out)
    }
}

/// Treatment of the image border during erosion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryCondition {
    /// Offsets that leave the image are ignored; erosion and dilation are
    /// exact duals over the image.
    #[default]
    Symmetric,
    /// Positions outside the image count as background, so foreground
    /// touching the border is eroded.
    Asymmetric,
}

/// Boundary type for [`extract_boundary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryType {
    /// Background boundary: pixels just outside the foreground objects.
    /// Computed as (dilate 3×3) XOR original.
    Outer,
    /// Foreground boundary: pixels on the inner edge of foreground objects.
    /// Computed as (erode 3×3) XOR original.
    Inner,
}

/// Decompose `sel` for arrays of type `A`, rejecting mismatched
/// dimensionality and elements without hits.
fn decompose_for<A: RunLengthMorph>(sel: &Sel) -> MorphResult<SelDecomposition> {
    check_ndim::<A>(sel)?;
    SelDecomposition::new(sel)
}

fn check_ndim<A: RunLengthMorph>(sel: &Sel) -> MorphResult<()> {
    if sel.ndim() != A::NDIM {
        return Err(MorphError::DimensionMismatch {
            array: A::NDIM,
            sel: sel.ndim(),
        });
    }
    Ok(())
}

/// Lines sharing one span list.
struct SpanGroup<'a> {
    spans: &'a [(i32, i32)],
    /// `(dz, dy)` of every line with these spans
    targets: Vec<(i32, i32)>,
}

fn group_lines(dec: &SelDecomposition) -> Vec<SpanGroup<'_>> {
    let mut groups: Vec<SpanGroup<'_>> = Vec::new();
    for line in dec.lines() {
        match groups.iter_mut().find(|g| g.spans == line.spans.as_slice()) {
            Some(group) => group.targets.push((line.dz, line.dy)),
            None => groups.push(SpanGroup {
                spans: &line.spans,
                targets: vec![(line.dz, line.dy)],
            }),
        }
    }
    groups
}

/// Row address `(z + dz, y + dy)` if it lies inside `extent`.
fn target_row(extent: [u32; 3], (z, y): RowKey, (dz, dy): (i32, i32)) -> Option<RowKey> {
    let tz = z as i64 + dz as i64;
    let ty = y as i64 + dy as i64;
    if (0..extent[2] as i64).contains(&tz) && (0..extent[1] as i64).contains(&ty) {
        Some((tz as i32, ty as i32))
    } else {
        None
    }
}

fn dilate_decomposed<A: RunLengthMorph>(
    array: &A,
    dec: &SelDecomposition,
    progress: &mut dyn ProgressObserver,
) -> MorphResult<A> {
    let extent = array.extent();
    let max_x = extent[0] as i32 - 1;
    let groups = group_lines(dec);
    let mut pending: BTreeMap<RowKey, Vec<Run>> = BTreeMap::new();
    let mut tracker = ProgressTracker::new(progress, array.progress_units());

    for (key, row) in array.keyed_rows() {
        tracker.enter(array.progress_unit(A::row_key(key)));
        for group in &groups {
            let targets: Vec<RowKey> = group
                .targets
                .iter()
                .filter_map(|&offset| target_row(extent, key, offset))
                .collect();
            if targets.is_empty() {
                continue;
            }
            let dilated = row.dilate_by(group.spans).clip(0, max_x);
            if dilated.is_empty() {
                continue;
            }
            for target in targets {
                pending.entry(target).or_default().extend(dilated.runs());
            }
        }
    }
    tracker.finish();

    let rows = pending
        .into_iter()
        .map(|(key, runs)| (key, BinaryRow::from_runs(runs)))
        .collect();
    let out = A::from_keyed_rows(extent, rows)?;

    debug!(
        dims = ?extent,
        lines = dec.lines().len(),
        span_lists = groups.len(),
        spans = dec.span_count(),
        runs_in = array.run_count(),
        runs_out = out.run_count(),
        "dilate"
    );
    Ok(out)
}

fn erode_decomposed<A: RunLengthMorph>(
    array: &A,
    dec: &SelDecomposition,
    boundary: BoundaryCondition,
    progress: &mut dyn ProgressObserver,
) -> MorphResult<A> {
    let reflected = dec.reflect();
    let grown = match boundary {
        BoundaryCondition::Symmetric => {
            let inverse = complement(array)?;
            dilate_decomposed(&inverse, &reflected, progress)?
        }
        BoundaryCondition::Asymmetric => {
            let pad = dec.reach();
            let inverse = embed(array, pad, true)?;
            let dilated = dilate_decomposed(&inverse, &reflected, progress)?;
            crop(&dilated, pad, array.extent())?
        }
    };
    let out = complement(&grown)?;

    debug!(
        dims = ?array.extent(),
        boundary = ?boundary,
        runs_in = array.run_count(),
        runs_out = out.run_count(),
        "erode"
    );
    Ok(out)
}

/// Place `array` inside a frame of `pad` on every side.
///
/// With `inverse`, the content is complemented and the frame is set;
/// otherwise the content is copied and the frame is clear.
fn embed<A: RunLengthMorph>(array: &A, pad: [u32; 3], inverse: bool) -> MorphResult<A> {
    let extent = array.extent();
    let mut padded = [0u32; 3];
    for axis in 0..3 {
        let planes = if axis == 2 && A::NDIM == 2 { 0 } else { pad[axis] };
        padded[axis] = planes
            .checked_mul(2)
            .and_then(|p| p.checked_add(extent[axis]))
            .ok_or_else(|| {
                MorphError::InvalidParameters(format!(
                    "padding {:?} overflows size {:?}",
                    pad, extent
                ))
            })?;
    }
    let (px, py, pz) = (pad[0] as i32, pad[1] as i32, (padded[2] - extent[2]) as i32 / 2);
    let max_x = padded[0] as i32 - 1;

    let mut rows = BTreeMap::new();
    if inverse {
        let empty = BinaryRow::new();
        let full = BinaryRow::full(0, max_x);
        for z in 0..padded[2] as i32 {
            for y in 0..padded[1] as i32 {
                let inside = (pz..pz + extent[2] as i32).contains(&z)
                    && (py..py + extent[1] as i32).contains(&y);
                let row = if inside {
                    let key = A::row_key((z - pz, y - py));
                    let source = array.row(key).unwrap_or(&empty);
                    source.shift(px).complement(0, max_x)
                } else {
                    full.clone()
                };
                rows.insert((z, y), row);
            }
        }
    } else {
        for ((z, y), row) in array.keyed_rows() {
            rows.insert((z + pz, y + py), row.shift(px));
        }
    }
    A::from_keyed_rows(padded, rows)
}

/// Inverse of [`embed`]: cut the `extent`-sized interior out of `array`.
fn crop<A: RunLengthMorph>(array: &A, pad: [u32; 3], extent: [u32; 3]) -> MorphResult<A> {
    let padded = array.extent();
    let (px, py, pz) = (pad[0] as i32, pad[1] as i32, (padded[2] - extent[2]) as i32 / 2);
    let max_x = extent[0] as i32 - 1;
    let rows = array
        .keyed_rows()
        .filter_map(|((z, y), row)| {
            let (z, y) = (z - pz, y - py);
            let inside = (0..extent[2] as i32).contains(&z) && (0..extent[1] as i32).contains(&y);
            if !inside {
                return None;
            }
            let row = row.shift(-px).clip(0, max_x);
            (!row.is_empty()).then_some(((z, y), row))
        })
        .collect();
    A::from_keyed_rows(extent, rows)
}

/// Dilate a binary array
///
/// A position is set when some `p - offset` is set, for the hit offsets of
/// `sel`. Content is never shifted in from outside the array.
///
/// # Errors
///
/// Returns [`MorphError::DimensionMismatch`] if `sel` is 2D for a 3D array
/// or vice versa, and [`MorphError::InvalidSel`] if it has no hits. Both are
/// checked before any row is processed.
///
/// # Examples
///
/// ```
/// use rlebin_core::RunLengthBinaryArray2D;
/// use rlebin_morph::{Sel, dilate};
///
/// let mut mask = RunLengthBinaryArray2D::new(16, 3).unwrap();
/// for x in 5..=9 {
///     mask.set(x, 1, true).unwrap();
/// }
/// let grown = dilate(&mask, &Sel::create_horizontal(3).unwrap()).unwrap();
/// let run = grown.row(1).unwrap().first().unwrap();
/// assert_eq!((run.start(), run.end()), (4, 10));
/// ```
pub fn dilate<A: RunLengthMorph>(array: &A, sel: &Sel) -> MorphResult<A> {
    dilate_with_progress(array, sel, &mut NoProgress)
}

/// [`dilate`] with progress reported per row (2D) or plane (3D).
pub fn dilate_with_progress<A: RunLengthMorph>(
    array: &A,
    sel: &Sel,
    progress: &mut dyn ProgressObserver,
) -> MorphResult<A> {
    let dec = decompose_for::<A>(sel)?;
    dilate_decomposed(array, &dec, progress)
}

/// Erode a binary array with the default [`BoundaryCondition::Symmetric`]
///
/// A position is kept when every in-bounds `p + offset` is set.
pub fn erode<A: RunLengthMorph>(array: &A, sel: &Sel) -> MorphResult<A> {
    erode_with(array, sel, BoundaryCondition::default())
}

/// Erode a binary array with an explicit boundary condition
pub fn erode_with<A: RunLengthMorph>(
    array: &A,
    sel: &Sel,
    boundary: BoundaryCondition,
) -> MorphResult<A> {
    erode_with_progress(array, sel, boundary, &mut NoProgress)
}

/// [`erode_with`] with progress reported per row (2D) or plane (3D).
pub fn erode_with_progress<A: RunLengthMorph>(
    array: &A,
    sel: &Sel,
    boundary: BoundaryCondition,
    progress: &mut dyn ProgressObserver,
) -> MorphResult<A> {
    let dec = decompose_for::<A>(sel)?;
    erode_decomposed(array, &dec, boundary, progress)
}

/// Open a binary array
///
/// Opening = Erosion followed by Dilation.
/// Removes small foreground objects and smooths contours.
pub fn open<A: RunLengthMorph>(array: &A, sel: &Sel) -> MorphResult<A> {
    let eroded = erode(array, sel)?;
    dilate(&eroded, sel)
}

/// Close a binary array
///
/// Closing = Dilation followed by Erosion.
/// Fills small holes and connects nearby objects.
pub fn close<A: RunLengthMorph>(array: &A, sel: &Sel) -> MorphResult<A> {
    let dilated = dilate(array, sel)?;
    erode(&dilated, sel)
}

/// Close a binary array as if it were surrounded by background
///
/// The array is padded by the element's reach, closed, and cropped back, so
/// foreground near the border is treated like foreground anywhere else.
pub fn close_safe<A: RunLengthMorph>(array: &A, sel: &Sel) -> MorphResult<A> {
    let dec = decompose_for::<A>(sel)?;
    let pad = dec.reach();
    let padded = embed(array, pad, false)?;
    let dilated = dilate_decomposed(&padded, &dec, &mut NoProgress)?;
    let closed = erode_decomposed(&dilated, &dec, BoundaryCondition::Symmetric, &mut NoProgress)?;
    crop(&closed, pad, array.extent())
}

/// Hit-miss transform
///
/// A position is set when every hit offset lands on foreground and every
/// miss offset lands on background. Positions outside the array count as
/// background.
pub fn hit_miss_transform<A: RunLengthMorph>(array: &A, sel: &Sel) -> MorphResult<A> {
    check_ndim::<A>(sel)?;
    let hits = SelDecomposition::from_offsets(sel.hit_offsets());
    let misses = SelDecomposition::from_offsets(sel.miss_offsets());

    let fits_hits = || erode_decomposed(array, &hits, BoundaryCondition::Asymmetric, &mut NoProgress);
    let fits_misses = || -> MorphResult<A> {
        let inverse = complement(array)?;
        erode_decomposed(&inverse, &misses, BoundaryCondition::Symmetric, &mut NoProgress)
    };

    let out = match (hits.is_empty(), misses.is_empty()) {
        (true, true) => {
            return Err(MorphError::InvalidSel(
                "hit-miss element has no hits or misses".to_string(),
            ));
        }
        (false, true) => fits_hits()?,
        (true, false) => fits_misses()?,
        (false, false) => LogicalOp::AND.process(&fits_hits()?, &fits_misses()?)?,
    };

    debug!(
        dims = ?array.extent(),
        hits = hits.hit_count(),
        misses = misses.hit_count(),
        runs_out = out.run_count(),
        "hit-miss transform"
    );
    Ok(out)
}

/// Morphological gradient (dilation - erosion)
///
/// Highlights edges/boundaries of objects.
pub fn gradient<A: RunLengthMorph>(array: &A, sel: &Sel) -> MorphResult<A> {
    let dilated = dilate(array, sel)?;
    let eroded = erode(array, sel)?;
    Ok(LogicalOp::AND_NOT.process(&dilated, &eroded)?)
}

/// Top-hat transform (original - opening)
///
/// Extracts foreground features smaller than the SE.
pub fn top_hat<A: RunLengthMorph>(array: &A, sel: &Sel) -> MorphResult<A> {
    let opened = open(array, sel)?;
    Ok(LogicalOp::AND_NOT.process(array, &opened)?)
}

/// Bottom-hat transform (closing - original)
///
/// Extracts background features smaller than the SE.
pub fn bottom_hat<A: RunLengthMorph>(array: &A, sel: &Sel) -> MorphResult<A> {
    let closed = close(array, sel)?;
    Ok(LogicalOp::AND_NOT.process(&closed, array)?)
}

/// Unit neighborhood: 3×3 in 2D, 3×3×3 in 3D.
fn neighborhood<A: RunLengthMorph>() -> MorphResult<Sel> {
    if A::NDIM == 3 {
        Sel::create_brick_3d(3, 3, 3)
    } else {
        Sel::create_brick(3, 3)
    }
}

/// Extract boundary pixels of foreground components.
///
/// - [`BoundaryType::Outer`]: background pixels adjacent to foreground
///   (dilation XOR original)
/// - [`BoundaryType::Inner`]: foreground pixels adjacent to background
///   (erosion XOR original)
///
/// Adjacency is 8-connected in 2D and 26-connected in 3D. The image border
/// does not count as background.
pub fn extract_boundary<A: RunLengthMorph>(array: &A, boundary_type: BoundaryType) -> MorphResult<A> {
    let sel = neighborhood::<A>()?;
    let morphed = match boundary_type {
        BoundaryType::Outer => dilate(array, &sel)?,
        BoundaryType::Inner => erode(array, &sel)?,
    };
    Ok(LogicalOp::XOR.process(array, &morphed)?)
}

/// Brick of `width` x `height` hits, planar even for 3D arrays.
fn brick<A: RunLengthMorph>(width: u32, height: u32) -> MorphResult<Sel> {
    if width == 0 || height == 0 {
        return Err(MorphError::InvalidParameters(format!(
            "brick size must be >= 1, got {}x{}",
            width, height
        )));
    }
    if A::NDIM == 3 {
        Sel::create_brick_3d(width, height, 1)
    } else {
        Sel::create_brick(width, height)
    }
}

/// Dilate with a brick (rectangular) structuring element
///
/// A brick decomposes into one span per row offset, so this costs one
/// [`BinaryRow::dilate_by`] per stored row.
pub fn dilate_brick<A: RunLengthMorph>(array: &A, width: u32, height: u32) -> MorphResult<A> {
    let sel = brick::<A>(width, height)?;
    if width == 1 && height == 1 {
        return Ok(array.clone());
    }
    dilate(array, &sel)
}

/// Erode with a brick (rectangular) structuring element
pub fn erode_brick<A: RunLengthMorph>(array: &A, width: u32, height: u32) -> MorphResult<A> {
    let sel = brick::<A>(width, height)?;
    if width == 1 && height == 1 {
        return Ok(array.clone());
    }
    erode(array, &sel)
}

/// Open with a brick structuring element
///
/// Opening = erosion followed by dilation.
pub fn open_brick<A: RunLengthMorph>(array: &A, width: u32, height: u32) -> MorphResult<A> {
    let sel = brick::<A>(width, height)?;
    if width == 1 && height == 1 {
        return Ok(array.clone());
    }
    open(array, &sel)
}

/// Close with a brick structuring element
///
/// Closing = dilation followed by erosion.
pub fn close_brick<A: RunLengthMorph>(array: &A, width: u32, height: u32) -> MorphResult<A> {
    let sel = brick::<A>(width, height)?;
    if width == 1 && height == 1 {
        return Ok(array.clone());
    }
    close(array, &sel)
}
