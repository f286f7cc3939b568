//! Row decomposition of structuring elements
//!
//! Run-length morphology never looks at single offsets. The hits of an
//! element are grouped by `(dz, dy)` and each group's `dx` values are folded
//! into maximal spans, so dilating a row by one group is a single
//! [`BinaryRow::dilate_by`](rlebin_core::BinaryRow::dilate_by) call.

use crate::sel::{Sel, SelOffset};
use crate::{MorphError, MorphResult};
use std::collections::BTreeMap;

/// Horizontal spans of one `(dz, dy)` group, as `(dx_start, dx_end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelLine {
    /// Plane offset
    pub dz: i32,
    /// Row offset
    pub dy: i32,
    /// Sorted, disjoint, non-adjacent spans
    pub spans: Vec<(i32, i32)>,
}

/// A structuring element as a list of [`SelLine`]s, ordered by `(dz, dy)`.
///
/// # Examples
///
/// ```
/// use rlebin_morph::{Sel, SelDecomposition};
///
/// let cross = Sel::create_cross(3).unwrap();
/// let dec = SelDecomposition::new(&cross).unwrap();
/// assert_eq!(dec.lines().len(), 3);
/// assert_eq!(dec.lines()[1].spans, vec![(-1, 1)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelDecomposition {
    lines: Vec<SelLine>,
    hit_count: usize,
}

impl SelDecomposition {
    /// Decompose the hits of `sel`.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::InvalidSel`] if `sel` has no hits.
    pub fn new(sel: &Sel) -> MorphResult<Self> {
        if sel.hit_count() == 0 {
            return Err(MorphError::InvalidSel(
                "structuring element has no hits".to_string(),
            ));
        }
        Ok(Self::from_offsets(sel.hit_offsets()))
    }

    /// Decompose an arbitrary offset set; duplicates are ignored.
    pub fn from_offsets(offsets: impl IntoIterator<Item = SelOffset>) -> Self {
        let mut groups: BTreeMap<(i32, i32), Vec<i32>> = BTreeMap::new();
        for (dx, dy, dz) in offsets {
            groups.entry((dz, dy)).or_default().push(dx);
        }

        let mut hit_count = 0;
        let lines = groups
            .into_iter()
            .map(|((dz, dy), mut xs)| {
                xs.sort_unstable();
                xs.dedup();
                hit_count += xs.len();
                SelLine {
                    dz,
                    dy,
                    spans: fold_spans(&xs),
                }
            })
            .collect();

        SelDecomposition { lines, hit_count }
    }

    /// The lines, ordered by `(dz, dy)`.
    pub fn lines(&self) -> &[SelLine] {
        &self.lines
    }

    /// Number of distinct offsets.
    pub fn hit_count(&self) -> usize {
        self.hit_count
    }

    /// Total number of spans over all lines.
    pub fn span_count(&self) -> usize {
        self.lines.iter().map(|l| l.spans.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when every offset has `dz == 0`.
    pub fn is_planar(&self) -> bool {
        self.lines.iter().all(|l| l.dz == 0)
    }

    /// Decomposition of the point-reflected element.
    pub fn reflect(&self) -> Self {
        let mut lines: Vec<SelLine> = self
            .lines
            .iter()
            .map(|l| SelLine {
                dz: -l.dz,
                dy: -l.dy,
                spans: l.spans.iter().rev().map(|&(s, e)| (-e, -s)).collect(),
            })
            .collect();
        lines.sort_unstable_by_key(|l| (l.dz, l.dy));
        SelDecomposition {
            lines,
            hit_count: self.hit_count,
        }
    }

    /// Per-axis `(min, max)` of the offsets, as `[x, y, z]`.
    ///
    /// Returns `None` for an empty decomposition.
    pub fn extent(&self) -> Option<[(i32, i32); 3]> {
        let mut out: Option<[(i32, i32); 3]> = None;
        for line in &self.lines {
            let (Some(first), Some(last)) = (line.spans.first(), line.spans.last()) else {
                continue;
            };
            let cur = [(first.0, last.1), (line.dy, line.dy), (line.dz, line.dz)];
            out = Some(match out {
                None => cur,
                Some(acc) => {
                    let mut merged = acc;
                    for axis in 0..3 {
                        merged[axis].0 = merged[axis].0.min(cur[axis].0);
                        merged[axis].1 = merged[axis].1.max(cur[axis].1);
                    }
                    merged
                }
            });
        }
        out
    }

    /// Largest absolute offset along each axis, `[x, y, z]`.
    pub fn reach(&self) -> [u32; 3] {
        match self.extent() {
            Some(ext) => ext.map(|(lo, hi)| lo.unsigned_abs().max(hi.unsigned_abs())),
            None => [0; 3],
        }
    }
}

/// Fold sorted, deduplicated values into maximal consecutive spans.
fn fold_spans(xs: &[i32]) -> Vec<(i32, i32)> {
    let mut spans: Vec<(i32, i32)> = Vec::new();
    for &x in xs {
        match spans.last_mut() {
            Some(last) if last.1 as i64 + 1 == x as i64 => last.1 = x,
            _ => spans.push((x, x)),
        }
    }
    spans
}
