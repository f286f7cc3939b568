//! Structuring Element (SEL) for morphological operations
//!
//! A structuring element defines the neighborhood used in morphological
//! operations. Elements are either planar (2D, one plane) or volumetric
//! (3D); offsets are always reported as `(dx, dy, dz)` with `dz == 0` for
//! planar elements.

use crate::{MorphError, MorphResult};

/// Largest number of elements a single SEL may hold.
pub const MAX_SEL_ELEMENTS: usize = 1 << 26;

/// Element type in a structuring element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[derive(Default)]
pub enum SelElement {
    /// Don't care - this position is ignored
    #[default]
    DontCare = 0,
    /// Hit - must match foreground (set pixels)
    Hit = 1,
    /// Miss - must match background (unset pixels)
    Miss = 2,
}

/// Offset of an element relative to the origin, `(dx, dy, dz)`.
pub type SelOffset = (i32, i32, i32);

/// Structuring Element (SEL)
///
/// Defines the neighborhood pattern for morphological operations.
/// The origin (cx, cy, cz) is the reference point for the operation.
///
/// # Examples
///
/// ```
/// use rlebin_morph::Sel;
///
/// let sel = Sel::create_cross(3).unwrap();
/// assert_eq!(sel.hit_count(), 5);
/// assert!(sel.hit_offsets().any(|o| o == (0, -1, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sel {
    width: u32,
    height: u32,
    depth: u32,
    cx: u32,
    cy: u32,
    cz: u32,
    ndim: usize,
    /// x fastest, then y, then z
    data: Vec<SelElement>,
    name: Option<String>,
}

fn check_extent(width: u32, height: u32, depth: u32) -> MorphResult<usize> {
    if width == 0 || height == 0 || depth == 0 {
        return Err(MorphError::InvalidSel(format!(
            "dimensions must be > 0, got {}x{}x{}",
            width, height, depth
        )));
    }
    if [width, height, depth].iter().any(|&d| d > i32::MAX as u32) {
        return Err(MorphError::InvalidSel(format!(
            "dimension too large: {}x{}x{}",
            width, height, depth
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(depth as usize))
        .filter(|&n| n <= MAX_SEL_ELEMENTS)
        .ok_or_else(|| {
            MorphError::InvalidSel(format!(
                "too many elements: {}x{}x{}",
                width, height, depth
            ))
        })
}

fn diameter(radius: u32) -> MorphResult<u32> {
    radius
        .checked_mul(2)
        .and_then(|d| d.checked_add(1))
        .ok_or_else(|| MorphError::InvalidParameters(format!("radius {} too large", radius)))
}

impl Sel {
    fn with_extent(width: u32, height: u32, depth: u32, ndim: usize) -> MorphResult<Self> {
        let len = check_extent(width, height, depth)?;
        Ok(Sel {
            width,
            height,
            depth,
            cx: width / 2,
            cy: height / 2,
            cz: depth / 2,
            ndim,
            data: vec![SelElement::DontCare; len],
            name: None,
        })
    }

    /// Fill from a predicate on the offset from the origin.
    fn filled(mut self, mut hit: impl FnMut(i32, i32, i32) -> bool) -> Self {
        let (w, h) = (self.width as usize, self.height as usize);
        let (cx, cy, cz) = (self.cx as i32, self.cy as i32, self.cz as i32);
        for (idx, elem) in self.data.iter_mut().enumerate() {
            let x = (idx % w) as i32;
            let y = (idx / w % h) as i32;
            let z = (idx / (w * h)) as i32;
            if hit(x - cx, y - cy, z - cz) {
                *elem = SelElement::Hit;
            }
        }
        self
    }

    /// Create a new empty (all don't-care) planar structuring element
    ///
    /// The origin is placed at the center, `(width / 2, height / 2)`.
    pub fn new(width: u32, height: u32) -> MorphResult<Self> {
        Self::with_extent(width, height, 1, 2)
    }

    /// Create a new empty volumetric structuring element
    ///
    /// The origin is placed at the center.
    pub fn new_3d(width: u32, height: u32, depth: u32) -> MorphResult<Self> {
        Self::with_extent(width, height, depth, 3)
    }

    /// Create a rectangular "brick" structuring element with all hits
    pub fn create_brick(width: u32, height: u32) -> MorphResult<Self> {
        let mut sel = Self::new(width, height)?;
        sel.data.fill(SelElement::Hit);
        Ok(sel)
    }

    /// Create a box structuring element with all hits
    pub fn create_brick_3d(width: u32, height: u32, depth: u32) -> MorphResult<Self> {
        let mut sel = Self::new_3d(width, height, depth)?;
        sel.data.fill(SelElement::Hit);
        Ok(sel)
    }

    /// Create a square structuring element with all hits
    pub fn create_square(size: u32) -> MorphResult<Self> {
        Self::create_brick(size, size)
    }

    /// Create a horizontal line structuring element
    pub fn create_horizontal(length: u32) -> MorphResult<Self> {
        Self::create_brick(length, 1)
    }

    /// Create a vertical line structuring element
    pub fn create_vertical(length: u32) -> MorphResult<Self> {
        Self::create_brick(1, length)
    }

    /// Create a cross (+) structuring element
    ///
    /// A `size` x `size` element with hits on the center row and column.
    pub fn create_cross(size: u32) -> MorphResult<Self> {
        Ok(Self::new(size, size)?.filled(|dx, dy, _| dx == 0 || dy == 0))
    }

    /// Create a diamond structuring element
    ///
    /// Hits where `|dx| + |dy| <= radius`.
    pub fn create_diamond(radius: u32) -> MorphResult<Self> {
        let size = diameter(radius)?;
        let r = radius as i64;
        Ok(Self::new(size, size)?.filled(|dx, dy, _| (dx as i64).abs() + (dy as i64).abs() <= r))
    }

    /// Create a disk (approximate circle) structuring element
    ///
    /// Hits where `dx² + dy² <= radius²`.
    pub fn create_disk(radius: u32) -> MorphResult<Self> {
        let size = diameter(radius)?;
        let r2 = radius as i64 * radius as i64;
        Ok(Self::new(size, size)?.filled(|dx, dy, _| {
            let (dx, dy) = (dx as i64, dy as i64);
            dx * dx + dy * dy <= r2
        }))
    }

    /// Create a ball structuring element
    ///
    /// Hits where `dx² + dy² + dz² <= radius²`.
    pub fn create_sphere(radius: u32) -> MorphResult<Self> {
        let size = diameter(radius)?;
        let r2 = radius as i64 * radius as i64;
        Ok(Self::new_3d(size, size, size)?.filled(|dx, dy, dz| {
            let (dx, dy, dz) = (dx as i64, dy as i64, dz as i64);
            dx * dx + dy * dy + dz * dz <= r2
        }))
    }

    /// Create a structuring element from a string pattern
    ///
    /// Rows are separated by newlines and must all have the same length.
    ///
    /// # Arguments
    /// * `pattern` - String with 'x' for hit, 'o' for miss, '.' or ' ' for
    ///   don't care (case-insensitive)
    /// * `origin_x` - X coordinate of origin
    /// * `origin_y` - Y coordinate of origin
    pub fn from_string(pattern: &str, origin_x: u32, origin_y: u32) -> MorphResult<Self> {
        let lines: Vec<&str> = pattern.lines().collect();
        let height = lines.len() as u32;
        let width = lines.first().map_or(0, |l| l.chars().count()) as u32;
        let mut sel = Self::new(width, height)?;

        for (y, line) in lines.iter().enumerate() {
            if line.chars().count() as u32 != width {
                return Err(MorphError::InvalidSel(format!(
                    "row {} has length {}, expected {}",
                    y,
                    line.chars().count(),
                    width
                )));
            }
            for (x, ch) in line.chars().enumerate() {
                let elem = match ch {
                    'x' | 'X' => SelElement::Hit,
                    'o' | 'O' => SelElement::Miss,
                    '.' | ' ' => SelElement::DontCare,
                    other => {
                        return Err(MorphError::InvalidSel(format!(
                            "unexpected character '{}' at ({}, {})",
                            other, x, y
                        )));
                    }
                };
                sel.set_element(x as u32, y as u32, elem);
            }
        }

        sel.set_origin(origin_x, origin_y)?;
        Ok(sel)
    }

    /// Create a planar structuring element whose hits are exactly `offsets`
    ///
    /// The element is the bounding box of the offsets, with the origin at
    /// offset `(0, 0)`; the origin need not be a hit.
    pub fn from_offsets(offsets: &[(i32, i32)]) -> MorphResult<Self> {
        let planar: Vec<SelOffset> = offsets.iter().map(|&(dx, dy)| (dx, dy, 0)).collect();
        Self::build_from_offsets(&planar, 2)
    }

    /// Create a volumetric structuring element whose hits are exactly
    /// `offsets`
    pub fn from_offsets_3d(offsets: &[SelOffset]) -> MorphResult<Self> {
        Self::build_from_offsets(offsets, 3)
    }

    fn build_from_offsets(offsets: &[SelOffset], ndim: usize) -> MorphResult<Self> {
        if offsets.is_empty() {
            return Err(MorphError::InvalidSel("no offsets given".to_string()));
        }
        let mut min = [0i64; 3];
        let mut max = [0i64; 3];
        for &(dx, dy, dz) in offsets {
            for (axis, d) in [dx, dy, dz].into_iter().enumerate() {
                min[axis] = min[axis].min(d as i64);
                max[axis] = max[axis].max(d as i64);
            }
        }
        let extent = |axis: usize| -> MorphResult<u32> {
            u32::try_from(max[axis] - min[axis] + 1)
                .map_err(|_| MorphError::InvalidSel("offsets span too wide".to_string()))
        };
        let mut sel = Self::with_extent(extent(0)?, extent(1)?, extent(2)?, ndim)?;
        sel.cx = (-min[0]) as u32;
        sel.cy = (-min[1]) as u32;
        sel.cz = (-min[2]) as u32;
        for &(dx, dy, dz) in offsets {
            let x = (dx as i64 - min[0]) as u32;
            let y = (dy as i64 - min[1]) as u32;
            let z = (dz as i64 - min[2]) as u32;
            sel.set_element_3d(x, y, z, SelElement::Hit);
        }
        Ok(sel)
    }

    /// Get the width
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the depth (1 for planar elements)
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of dimensions, 2 or 3
    #[inline]
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Get the origin x coordinate
    #[inline]
    pub fn origin_x(&self) -> u32 {
        self.cx
    }

    /// Get the origin y coordinate
    #[inline]
    pub fn origin_y(&self) -> u32 {
        self.cy
    }

    /// Get the origin z coordinate
    #[inline]
    pub fn origin_z(&self) -> u32 {
        self.cz
    }

    /// Set the origin within the current plane
    pub fn set_origin(&mut self, cx: u32, cy: u32) -> MorphResult<()> {
        self.set_origin_3d(cx, cy, self.cz)
    }

    /// Set the origin
    pub fn set_origin_3d(&mut self, cx: u32, cy: u32, cz: u32) -> MorphResult<()> {
        if cx >= self.width || cy >= self.height || cz >= self.depth {
            return Err(MorphError::InvalidSel(format!(
                "origin ({}, {}, {}) outside {}x{}x{}",
                cx, cy, cz, self.width, self.height, self.depth
            )));
        }
        self.cx = cx;
        self.cy = cy;
        self.cz = cz;
        Ok(())
    }

    /// Get the name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    #[inline]
    fn index(&self, x: u32, y: u32, z: u32) -> Option<usize> {
        if x < self.width && y < self.height && z < self.depth {
            Some(((z as usize * self.height as usize) + y as usize) * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Get an element at (x, y) of plane 0
    #[inline]
    pub fn get_element(&self, x: u32, y: u32) -> Option<SelElement> {
        self.get_element_3d(x, y, 0)
    }

    /// Get an element at (x, y, z)
    #[inline]
    pub fn get_element_3d(&self, x: u32, y: u32, z: u32) -> Option<SelElement> {
        self.index(x, y, z).map(|i| self.data[i])
    }

    /// Set an element at (x, y) of plane 0; out-of-range positions are ignored
    #[inline]
    pub fn set_element(&mut self, x: u32, y: u32, elem: SelElement) {
        self.set_element_3d(x, y, 0, elem);
    }

    /// Set an element at (x, y, z); out-of-range positions are ignored
    #[inline]
    pub fn set_element_3d(&mut self, x: u32, y: u32, z: u32, elem: SelElement) {
        if let Some(i) = self.index(x, y, z) {
            self.data[i] = elem;
        }
    }

    /// Get raw element data
    pub fn data(&self) -> &[SelElement] {
        &self.data
    }

    /// Count the number of hit elements
    pub fn hit_count(&self) -> usize {
        self.data.iter().filter(|&&e| e == SelElement::Hit).count()
    }

    /// Count the number of miss elements
    pub fn miss_count(&self) -> usize {
        self.data.iter().filter(|&&e| e == SelElement::Miss).count()
    }

    /// Create the reflected (point-mirrored through the origin) SEL
    ///
    /// Every offset `(dx, dy, dz)` becomes `(-dx, -dy, -dz)`.
    pub fn reflect(&self) -> Self {
        let (w, h, d) = (self.width, self.height, self.depth);
        let mut out = Sel {
            cx: w - 1 - self.cx,
            cy: h - 1 - self.cy,
            cz: d - 1 - self.cz,
            data: vec![SelElement::DontCare; self.data.len()],
            ..self.clone()
        };
        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    if let Some(elem) = self.get_element_3d(x, y, z) {
                        out.set_element_3d(w - 1 - x, h - 1 - y, d - 1 - z, elem);
                    }
                }
            }
        }
        out
    }

    /// Rotate the SEL by 90 degrees clockwise in the xy plane
    ///
    /// # Arguments
    /// * `rotation` - Number of 90-degree rotations; taken modulo 4
    pub fn rotate_orth(&self, rotation: u32) -> Self {
        let mut out = self.clone();
        for _ in 0..rotation % 4 {
            out = out.rotate_quarter();
        }
        out
    }

    /// One clockwise quarter turn: `(dx, dy)` becomes `(-dy, dx)`.
    fn rotate_quarter(&self) -> Self {
        let (w, h, d) = (self.width, self.height, self.depth);
        let mut out = Sel {
            width: h,
            height: w,
            cx: h - 1 - self.cy,
            cy: self.cx,
            data: vec![SelElement::DontCare; self.data.len()],
            ..self.clone()
        };
        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    if let Some(elem) = self.get_element_3d(x, y, z) {
                        out.set_element_3d(h - 1 - y, x, z, elem);
                    }
                }
            }
        }
        out
    }

    fn offsets_of(&self, kind: SelElement) -> impl Iterator<Item = SelOffset> + '_ {
        let (cx, cy, cz) = (self.cx as i32, self.cy as i32, self.cz as i32);
        let (w, h) = (self.width as usize, self.height as usize);

        self.data
            .iter()
            .enumerate()
            .filter_map(move |(idx, &elem)| {
                if elem == kind {
                    let x = (idx % w) as i32;
                    let y = (idx / w % h) as i32;
                    let z = (idx / (w * h)) as i32;
                    Some((x - cx, y - cy, z - cz))
                } else {
                    None
                }
            })
    }

    /// Iterate over hit positions relative to origin
    pub fn hit_offsets(&self) -> impl Iterator<Item = SelOffset> + '_ {
        self.offsets_of(SelElement::Hit)
    }

    /// Iterate over miss positions relative to origin
    pub fn miss_offsets(&self) -> impl Iterator<Item = SelOffset> + '_ {
        self.offsets_of(SelElement::Miss)
    }

    /// Largest shifts of hits away from the origin, `(xp, yp, xn, yn)`
    ///
    /// `xp` is the largest distance of a hit to the left of the origin,
    /// `xn` to the right; `yp` above and `yn` below. All zero when there
    /// are no hits.
    pub fn find_max_translations(&self) -> (u32, u32, u32, u32) {
        let mut t = (0u32, 0u32, 0u32, 0u32);
        for (dx, dy, _) in self.hit_offsets() {
            t.0 = t.0.max((-dx).max(0) as u32);
            t.1 = t.1.max((-dy).max(0) as u32);
            t.2 = t.2.max(dx.max(0) as u32);
            t.3 = t.3.max(dy.max(0) as u32);
        }
        t
    }

    /// Largest shifts of hits in front of and behind the origin, `(zp, zn)`
    pub fn find_max_translations_z(&self) -> (u32, u32) {
        self.hit_offsets().fold((0, 0), |(zp, zn), (_, _, dz)| {
            (zp.max((-dz).max(0) as u32), zn.max(dz.max(0) as u32))
        })
    }
}
