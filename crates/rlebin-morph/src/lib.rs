//! rlebin-morph - Morphology on run-length encoded binary arrays
//!
//! This crate provides morphological operations that work directly on the
//! runs of [`rlebin_core`] arrays, in 2D and 3D:
//!
//! - Structuring elements (SEL) for defining operation neighborhoods
//! - Row decomposition of structuring elements into horizontal spans
//! - Binary morphology: dilation, erosion, opening, closing
//! - Hit-miss transform for pattern detection
//! - Morphological gradient, top-hat, bottom-hat and boundary extraction
//! - Morphological sequence operations for chaining multiple operations
//!
//! # Examples
//!
//! ```
//! use rlebin_core::{RunLengthArray, RunLengthBinaryArray2D};
//! use rlebin_morph::{Sel, close, open};
//!
//! let mask = RunLengthBinaryArray2D::from_fn(40, 20, |x, y| x % 10 < 8 && y > 4).unwrap();
//! let sel = Sel::create_brick(5, 3).unwrap();
//!
//! let closed = close(&mask, &sel).unwrap();
//! assert!(closed.pixel_count() >= mask.pixel_count());
//! let opened = open(&mask, &sel).unwrap();
//! assert!(opened.pixel_count() <= mask.pixel_count());
//! ```

pub mod binary;
pub mod decompose;
mod error;
pub mod sel;
pub mod sequence;

pub use decompose::{SelDecomposition, SelLine};
pub use error::{MorphError, MorphResult};
pub use sel::{Sel, SelElement, SelOffset};

// Re-export commonly used binary morphology functions
pub use binary::{
    BoundaryCondition, BoundaryType, RowKey, RunLengthMorph, bottom_hat, close, close_brick,
    close_safe, dilate, dilate_brick, dilate_with_progress, erode, erode_brick, erode_with,
    erode_with_progress, extract_boundary, gradient, hit_miss_transform, open, open_brick,
    top_hat,
};

// Re-export sequence functions
pub use sequence::{MorphOp, MorphSequence, morph_sequence};
