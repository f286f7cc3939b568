//! rlebin-core - Run-length encoded binary arrays
//!
//! This crate provides the sparse binary image representation and the
//! operations that work directly on it:
//!
//! - [`Run`] / [`BinaryRow`] / [`RowBuilder`] - Canonical interval sets for one scanline
//! - [`RunLengthBinaryArray2D`] / [`RunLengthBinaryArray3D`] - Images and volumes of rows
//! - [`BinaryArray`] / [`RunLengthArray`] - Storage-independent and row-oriented views
//! - [`DenseBinaryArray`] - Bit-packed dense backend
//! - [`ScalarArray`] / [`ScalarGrid`] - Scalar sources for thresholding
//! - [`LogicalOp`] / [`complement`] - Set algebra
//! - Thresholding straight into runs, text serialization, progress reporting

pub mod array;
pub mod dense;
pub mod error;
pub mod logic;
pub mod progress;
pub mod rle;
pub mod row;
pub mod run;
pub mod scalar;
pub mod serial;
pub mod threshold;

pub use array::{BinaryArray, MAX_DIMENSION, RunLengthArray, RunLengthRef};
pub use dense::DenseBinaryArray;
pub use error::{Error, Result};
pub use logic::{LogicalOp, complement, complement_any, complement_with_progress};
pub use progress::{NoProgress, ProgressObserver, ProgressTracker};
pub use rle::{RunLengthBinaryArray2D, RunLengthBinaryArray3D};
pub use row::{BinaryRow, RowBuilder};
pub use run::Run;
pub use scalar::{ScalarArray, ScalarGrid};
pub use threshold::{
    threshold_at_least, threshold_between, threshold_plane, threshold_volume,
    threshold_volume_at_least,
};
