//! Morphological sequence operations
//!
//! This module provides functionality to execute sequences of morphological
//! operations specified as strings. This allows for flexible composition of
//! morphological transformations.
//!
//! # Sequence String Format
//!
//! Operations are separated by `+` and whitespace is ignored.
//! Each operation begins with a case-insensitive character and takes a
//! brick size, `<w>.<h>` for a planar brick or `<w>.<h>.<d>` for a box:
//!
//! - `d<w>.<h>[.<d>]` - Dilation
//! - `e<w>.<h>[.<d>]` - Erosion
//! - `o<w>.<h>[.<d>]` - Opening
//! - `c<w>.<h>[.<d>]` - Closing
//! - `tw<w>.<h>[.<d>]` - White tophat (original - opening)
//! - `tb<w>.<h>[.<d>]` - Black tophat (closing - original)
//!
//! Box sizes with a depth other than 1 need a 3D array.
//!
//! # Examples
//!
//! ```
//! use rlebin_core::{RunLengthArray, RunLengthBinaryArray3D};
//! use rlebin_morph::sequence::{MorphSequence, morph_sequence};
//!
//! // Parse and validate a sequence
//! let seq = MorphSequence::parse("o5.5 + e3.3").unwrap();
//! assert_eq!(seq.ops().len(), 2);
//!
//! // Execute on a volume
//! let volume = RunLengthBinaryArray3D::new(20, 20, 8).unwrap();
//! let result = morph_sequence(&volume, "d3.3.3 + e3.3.3").unwrap();
//! assert!(result.is_empty());
//! ```

use crate::binary::{RunLengthMorph, bottom_hat, close, dilate, erode, open, top_hat};
use crate::sel::Sel;
use crate::{MorphError, MorphResult};
use tracing::debug;

/// A parsed morphological operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MorphOp {
    /// Dilation with a brick structuring element
    Dilate {
        /// Width of the brick SE
        width: u32,
        /// Height of the brick SE
        height: u32,
        /// Depth of the brick SE, 1 for the planar form
        depth: u32,
    },
    /// Erosion with a brick structuring element
    Erode { width: u32, height: u32, depth: u32 },
    /// Opening (erosion followed by dilation)
    Open { width: u32, height: u32, depth: u32 },
    /// Closing (dilation followed by erosion)
    Close { width: u32, height: u32, depth: u32 },
    /// Tophat transform
    Tophat {
        /// true for white tophat (original - opening), false for black (closing - original)
        white: bool,
        width: u32,
        height: u32,
        depth: u32,
    },
}

impl MorphOp {
    /// Get the width, height and depth of the operation's structuring element
    pub fn dimensions(&self) -> (u32, u32, u32) {
        match self {
            MorphOp::Dilate {
                width,
                height,
                depth,
            }
            | MorphOp::Erode {
                width,
                height,
                depth,
            }
            | MorphOp::Open {
                width,
                height,
                depth,
            }
            | MorphOp::Close {
                width,
                height,
                depth,
            }
            | MorphOp::Tophat {
                width,
                height,
                depth,
                ..
            } => (*width, *height, *depth),
        }
    }

    /// Check whether the operation needs a 3D array
    pub fn is_volumetric(&self) -> bool {
        self.dimensions().2 > 1
    }

    /// Brick structuring element for an array of dimensionality `ndim`
    fn sel(&self, ndim: usize) -> MorphResult<Sel> {
        let (w, h, d) = self.dimensions();
        match ndim {
            3 => Sel::create_brick_3d(w, h, d),
            _ if d > 1 => Err(MorphError::DimensionMismatch {
                array: ndim,
                sel: 3,
            }),
            _ => Sel::create_brick(w, h),
        }
    }
}

/// A parsed morphological sequence
#[derive(Debug, Clone)]
pub struct MorphSequence {
    /// The operations in the sequence
    ops: Vec<MorphOp>,
}

impl MorphSequence {
    /// Parse a sequence string into a MorphSequence
    ///
    /// # Arguments
    ///
    /// * `sequence` - The sequence string (e.g., "o5.5 + e3.3")
    ///
    /// # Returns
    ///
    /// A parsed MorphSequence, or an error if the sequence is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use rlebin_morph::sequence::MorphSequence;
    ///
    /// let seq = MorphSequence::parse("d3.3 + e5.5.3").unwrap();
    /// assert_eq!(seq.ops().len(), 2);
    /// assert!(seq.ops()[1].is_volumetric());
    /// ```
    pub fn parse(sequence: &str) -> MorphResult<Self> {
        if sequence.trim().is_empty() {
            return Err(MorphError::InvalidSequence("empty sequence".to_string()));
        }

        let parts: Vec<&str> = sequence.split('+').collect();
        let mut ops = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            let op_str = part.trim();
            if op_str.is_empty() {
                return Err(MorphError::InvalidSequence(format!(
                    "empty operation at position {}",
                    i + 1
                )));
            }

            let op = Self::parse_operation(op_str)?;
            ops.push(op);
        }

        Ok(MorphSequence { ops })
    }

    /// Parse a single operation string
    fn parse_operation(op_str: &str) -> MorphResult<MorphOp> {
        // Remove whitespace
        let op_str: String = op_str
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        let mut chars = op_str.chars();
        let Some(first_char) = chars.next() else {
            return Err(MorphError::InvalidSequence("empty operation".to_string()));
        };

        match first_char {
            'd' | 'e' | 'o' | 'c' => {
                let (width, height, depth) = Self::parse_dimensions(chars.as_str())?;
                let op = match first_char {
                    'd' => MorphOp::Dilate {
                        width,
                        height,
                        depth,
                    },
                    'e' => MorphOp::Erode {
                        width,
                        height,
                        depth,
                    },
                    'o' => MorphOp::Open {
                        width,
                        height,
                        depth,
                    },
                    _ => MorphOp::Close {
                        width,
                        height,
                        depth,
                    },
                };
                Ok(op)
            }
            't' => {
                // Tophat: tw<w>.<h> or tb<w>.<h>
                let white = match chars.next() {
                    Some('w') => true,
                    Some('b') => false,
                    other => {
                        return Err(MorphError::InvalidSequence(format!(
                            "invalid tophat type {:?} in '{}', expected 'w' or 'b'",
                            other, op_str
                        )));
                    }
                };

                let (width, height, depth) = Self::parse_dimensions(chars.as_str())?;
                Ok(MorphOp::Tophat {
                    white,
                    width,
                    height,
                    depth,
                })
            }
            'r' | 'x' | 'b' => {
                // Rank reduction, expansion, and border change the array size
                Err(MorphError::UnsupportedOperation(format!(
                    "operation '{}' is not supported on run-length arrays",
                    first_char
                )))
            }
            _ => Err(MorphError::InvalidSequence(format!(
                "unknown operation '{}' in '{}'",
                first_char, op_str
            ))),
        }
    }

    /// Parse dimensions from "3.5" -> (3, 5, 1) or "3.5.7" -> (3, 5, 7)
    fn parse_dimensions(dim_str: &str) -> MorphResult<(u32, u32, u32)> {
        let parts: Vec<&str> = dim_str.split('.').collect();

        if !matches!(parts.len(), 2 | 3) {
            return Err(MorphError::InvalidSequence(format!(
                "invalid dimensions format '{}', expected 'width.height' or 'width.height.depth'",
                dim_str
            )));
        }

        let mut dims = [1u32; 3];
        for (axis, part) in parts.iter().enumerate() {
            dims[axis] = part.parse().map_err(|_| {
                MorphError::InvalidSequence(format!("invalid size '{}' in '{}'", part, dim_str))
            })?;
        }

        if dims.contains(&0) {
            return Err(MorphError::InvalidSequence(format!(
                "dimensions must be > 0, got {}x{}x{}",
                dims[0], dims[1], dims[2]
            )));
        }

        Ok((dims[0], dims[1], dims[2]))
    }

    /// Get the operations in this sequence
    pub fn ops(&self) -> &[MorphOp] {
        &self.ops
    }

    /// Check that every operation can run on an array of dimensionality
    /// `ndim`
    pub fn verify(&self, ndim: usize) -> MorphResult<()> {
        if !matches!(ndim, 2 | 3) {
            return Err(MorphError::InvalidParameters(format!(
                "sequences run on 2D or 3D arrays, got {}D",
                ndim
            )));
        }
        if ndim == 2 && self.ops.iter().any(MorphOp::is_volumetric) {
            return Err(MorphError::DimensionMismatch { array: 2, sel: 3 });
        }
        Ok(())
    }

    /// Get the number of operations in the sequence
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply every operation in order
    pub fn apply<A: RunLengthMorph>(&self, array: &A) -> MorphResult<A> {
        self.verify(A::NDIM)?;

        let mut result = array.clone();
        for (i, op) in self.ops.iter().enumerate() {
            result = execute_op(&result, op)?;
            debug!(
                step = i + 1,
                op = ?op,
                runs = result.run_count(),
                "morph sequence"
            );
        }
        Ok(result)
    }
}

/// Execute a morphological sequence on a run-length array
///
/// # Arguments
///
/// * `array` - A 2D or 3D run-length array
/// * `sequence` - A sequence string (e.g., "o5.5 + e3.3")
///
/// # Returns
///
/// A new array with all operations applied, or an error. The sequence is
/// parsed and checked against the array's dimensionality before any
/// operation runs.
pub fn morph_sequence<A: RunLengthMorph>(array: &A, sequence: &str) -> MorphResult<A> {
    MorphSequence::parse(sequence)?.apply(array)
}

fn execute_op<A: RunLengthMorph>(array: &A, op: &MorphOp) -> MorphResult<A> {
    if op.dimensions() == (1, 1, 1) && !matches!(op, MorphOp::Tophat { .. }) {
        return Ok(array.clone());
    }
    let sel = op.sel(A::NDIM)?;
    match op {
        MorphOp::Dilate { .. } => dilate(array, &sel),
        MorphOp::Erode { .. } => erode(array, &sel),
        MorphOp::Open { .. } => open(array, &sel),
        MorphOp::Close { .. } => close(array, &sel),
        MorphOp::Tophat { white: true, .. } => top_hat(array, &sel),
        MorphOp::Tophat { white: false, .. } => bottom_hat(array, &sel),
    }
}
