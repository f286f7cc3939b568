//! Set algebra regression test
//!
//! Tests the logical operators on run-length arrays against per-position
//! evaluation, the two-rectangle scenario, complement involution and the
//! dense fallback.
//!
//! Run with:
//! ```
//! cargo test -p rlebin-core --test logic_reg
//! ```

use rlebin_core::{
    BinaryArray, LogicalOp, RunLengthArray, RunLengthBinaryArray2D, complement, complement_any,
};
use rlebin_test::{RegParams, fixtures, init_tracing_for_tests, reference};

fn rect(w: u32, h: u32, x0: i32, x1: i32, y0: i32, y1: i32) -> RunLengthBinaryArray2D {
    RunLengthBinaryArray2D::from_fn(w, h, |x, y| (x0..=x1).contains(&x) && (y0..=y1).contains(&y))
        .unwrap()
}

// ==========================================================================
// Test 1: Two touching rectangles
// ==========================================================================

#[test]
fn logic_reg_rectangles() {
    let mut rp = RegParams::new("logic_rects");

    let a = rect(8, 5, 1, 4, 1, 3);
    let b = rect(8, 5, 3, 6, 1, 3);

    let and = LogicalOp::AND.process(&a, &b).unwrap();
    let or = LogicalOp::OR.process(&a, &b).unwrap();
    rp.compare_values(3.0, and.stored_row_count() as f64, 0.0);
    for y in 1..=3 {
        let and_run = and.row(y).unwrap().first().unwrap();
        rp.compare_values(3.0, and_run.start() as f64, 0.0);
        rp.compare_values(4.0, and_run.end() as f64, 0.0);
        let or_run = or.row(y).unwrap().first().unwrap();
        rp.compare_values(1.0, or_run.start() as f64, 0.0);
        rp.compare_values(6.0, or_run.end() as f64, 0.0);
        rp.compare_values(1.0, or.row(y).unwrap().run_count() as f64, 0.0);
    }
    rp.compare_values(0.0, and.row(0).is_some() as u8 as f64, 0.0);

    let xor = LogicalOp::XOR.process(&a, &b).unwrap();
    rp.compare_values(12.0, xor.pixel_count() as f64, 0.0);

    assert!(rp.cleanup(), "logic_reg rectangle tests failed");
}

// ==========================================================================
// Test 2: Every 2-input truth table against per-position evaluation
// ==========================================================================

#[test]
fn logic_reg_truth_tables() {
    init_tracing_for_tests();
    let mut rp = RegParams::new("logic_tables");

    let a = fixtures::random_plane(21, 45, 17, 0.4).unwrap();
    let b = fixtures::random_plane(22, 45, 17, 0.5).unwrap();

    for table in 0u8..16 {
        let op = LogicalOp::from_table("table", table);
        let out = op.process(&a, &b).unwrap();
        let expected = reference::combine(&a, &b, |x, y| op.apply(x, y)).unwrap();
        rp.compare_arrays(&expected, &out);
        let canonical = out.rows().all(|(_, row)| row.is_canonical() && !row.is_empty());
        rp.compare_values(1.0, canonical as u8 as f64, 0.0);
    }

    // Volumes go through the same row engine
    let va = fixtures::random_volume(5, 12, 9, 4, 0.3).unwrap();
    let vb = fixtures::random_volume(6, 12, 9, 4, 0.3).unwrap();
    let nand = LogicalOp::from_fn("nand", |x, y| !(x && y));
    let out = nand.process(&va, &vb).unwrap();
    let expected = reference::combine(&va, &vb, |x, y| !(x && y)).unwrap();
    rp.compare_arrays(&expected, &out);

    assert!(rp.cleanup(), "logic_reg truth table tests failed");
}

// ==========================================================================
// Test 3: Complement
// ==========================================================================

#[test]
fn logic_reg_complement() {
    let mut rp = RegParams::new("logic_complement");

    let a = fixtures::random_blobs(8, 50, 30, 6, 10).unwrap();
    let inverse = complement(&a).unwrap();
    rp.compare_values(
        (50 * 30) as f64,
        (a.pixel_count() + inverse.pixel_count()) as f64,
        0.0,
    );
    rp.compare_arrays(&reference::complement(&a).unwrap(), &inverse);
    rp.compare_values(1.0, (complement(&inverse).unwrap() == a) as u8 as f64, 0.0);

    let v = fixtures::random_volume(9, 10, 10, 3, 0.5).unwrap();
    let back = complement(&complement(&v).unwrap()).unwrap();
    rp.compare_values(1.0, (back == v) as u8 as f64, 0.0);

    assert!(rp.cleanup(), "logic_reg complement tests failed");
}

// ==========================================================================
// Test 4: Mixed storage
// ==========================================================================

#[test]
fn logic_reg_mixed_storage() {
    init_tracing_for_tests();
    let mut rp = RegParams::new("logic_mixed");

    let rle = fixtures::random_plane(31, 40, 12, 0.5).unwrap();
    let dense = fixtures::random_dense(32, &[40, 12], 0.5).unwrap();

    let out = LogicalOp::AND_NOT.process_any(&rle, &dense).unwrap();
    let expected = reference::combine(&rle, &dense, |x, y| x && !y).unwrap();
    rp.compare_arrays(&expected, out.as_ref());

    let other = fixtures::random_plane(33, 40, 12, 0.5).unwrap();
    let fast = LogicalOp::OR.process_any(&rle, &other).unwrap();
    rp.compare_values(1.0, fast.as_run_length().is_some() as u8 as f64, 0.0);

    let inv = complement_any(&dense).unwrap();
    rp.compare_arrays(&reference::complement(&dense).unwrap(), inv.as_ref());

    // Shape mismatches are rejected before any work
    let small = fixtures::random_dense(34, &[39, 12], 0.5).unwrap();
    rp.compare_values(1.0, LogicalOp::OR.process_any(&rle, &small).is_err() as u8 as f64, 0.0);

    assert!(rp.cleanup(), "logic_reg mixed storage tests failed");
}
