//! Serialization regression test
//!
//! Tests that the text format round-trips run lists exactly through bytes
//! and files, and that writing is deterministic.
//!
//! Run with:
//! ```
//! cargo test -p rlebin-core --test serial_reg
//! ```

use rlebin_core::{RunLengthArray, RunLengthBinaryArray2D, RunLengthBinaryArray3D};
use rlebin_test::{RegParams, fixtures};

#[test]
fn serial_reg_plane() {
    let mut rp = RegParams::new("serial_plane");

    let plane = fixtures::random_blobs(41, 120, 70, 25, 20).unwrap();
    let bytes = plane.write_to_bytes().unwrap();
    let restored = RunLengthBinaryArray2D::read_from_bytes(&bytes).unwrap();
    rp.compare_values(1.0, (restored == plane) as u8 as f64, 0.0);
    rp.compare_values(plane.run_count() as f64, restored.run_count() as f64, 0.0);

    // Writing twice gives the same bytes
    rp.compare_strings(&bytes, &restored.write_to_bytes().unwrap());

    // One line per stored row after the two header lines
    let text = String::from_utf8(bytes.clone()).unwrap();
    let lines = text.lines().filter(|l| !l.is_empty()).count();
    rp.compare_values((plane.stored_row_count() + 2) as f64, lines as f64, 0.0);

    assert!(rp.cleanup(), "serial_reg plane tests failed");
}

#[test]
fn serial_reg_volume_file() {
    let mut rp = RegParams::new("serial_volume");

    let volume = fixtures::random_volume(42, 33, 12, 6, 0.3).unwrap();
    let path = std::env::temp_dir().join(format!("serial_reg_{}.rle", std::process::id()));
    volume.write_to_file(&path).unwrap();
    let restored = RunLengthBinaryArray3D::read_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    rp.compare_values(1.0, (restored == volume) as u8 as f64, 0.0);
    rp.compare_arrays(&volume, &restored);

    // A volume file is not a plane file
    let bytes = volume.write_to_bytes().unwrap();
    rp.compare_values(1.0, RunLengthBinaryArray2D::read_from_bytes(&bytes).is_err() as u8 as f64, 0.0);

    // Truncated input
    let cut = &bytes[..bytes.len() / 2];
    rp.compare_values(1.0, RunLengthBinaryArray3D::read_from_bytes(cut).is_err() as u8 as f64, 0.0);

    assert!(rp.cleanup(), "serial_reg volume tests failed");
}
