//! Run-length encoded binary arrays

mod plane;
mod volume;

pub use plane::RunLengthBinaryArray2D;
pub use volume::RunLengthBinaryArray3D;
