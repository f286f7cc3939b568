//! rlebin - Run-length encoded binary image engine
//!
//! Binary images and volumes stored as sorted runs of set pixels per
//! scanline, with set algebra and morphology that work on the runs
//! directly.
//!
//! # Overview
//!
//! - 2D and 3D run-length arrays with point queries and row access
//! - Complement, AND, OR, XOR, AND-NOT and user-defined truth tables
//! - Dilation, erosion, opening, closing and friends with arbitrary 2D/3D
//!   structuring elements
//! - Thresholding scalar grids straight into runs
//! - A plain-text serialization of the runs
//!
//! # Example
//!
//! ```
//! use rlebin::morph::{Sel, dilate};
//! use rlebin::{LogicalOp, RunLengthArray, RunLengthBinaryArray2D, ScalarGrid, threshold_at_least};
//!
//! let grid = ScalarGrid::from_fn(&[32, 16], |p| (p[0] + p[1]) as f64).unwrap();
//! let mask: RunLengthBinaryArray2D = threshold_at_least(&grid, 30.0).unwrap();
//! let grown = dilate(&mask, &Sel::create_square(3).unwrap()).unwrap();
//! let rim = LogicalOp::AND_NOT.process(&grown, &mask).unwrap();
//! assert!(rim.pixel_count() > 0);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use rlebin_core::*;

// Re-export the morphology crate as a module to avoid name conflicts
pub use rlebin_morph as morph;
