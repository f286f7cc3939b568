//! Binary morphology regression test
//!
//! Tests dilation and erosion on run-length arrays against dense
//! brute-force evaluation, in 2D and 3D, plus the algebraic properties the
//! two operators must satisfy.
//!
//! Run with:
//! ```
//! cargo test -p rlebin-morph --test binmorph1_reg
//! ```

use rlebin_core::{BinaryArray, RunLengthArray, RunLengthBinaryArray2D, complement};
use rlebin_morph::{BoundaryCondition, Sel, dilate, erode, erode_with};
use rlebin_test::{RegParams, fixtures, init_tracing_for_tests, reference};

// Brick sel dimensions
const WIDTH: u32 = 21;
const HEIGHT: u32 = 15;

fn offsets(sel: &Sel) -> Vec<reference::Offset> {
    sel.hit_offsets().map(|(dx, dy, dz)| [dx, dy, dz]).collect()
}

fn test_sels() -> Vec<Sel> {
    vec![
        Sel::create_brick(WIDTH, HEIGHT).unwrap(),
        Sel::create_brick(4, 2).unwrap(),
        Sel::create_cross(5).unwrap(),
        Sel::create_disk(3).unwrap(),
        Sel::from_string("x..x\n.xx.\nx...", 1, 1).unwrap(),
        Sel::from_offsets(&[(3, -2), (-4, 1)]).unwrap(),
    ]
}

// ==========================================================================
// Test 1: Dilation scenario and identity
// ==========================================================================

#[test]
fn binmorph1_reg_scenarios() {
    let mut rp = RegParams::new("binmorph1_scenarios");

    let mut line = RunLengthBinaryArray2D::new(20, 1).unwrap();
    for x in 5..=9 {
        line.set(x, 0, true).unwrap();
    }
    let sel = Sel::from_offsets(&[(-1, 0), (0, 0), (1, 0)]).unwrap();
    let out = dilate(&line, &sel).unwrap();
    let run = out.row(0).unwrap().first().unwrap();
    rp.compare_values(4.0, run.start() as f64, 0.0);
    rp.compare_values(10.0, run.end() as f64, 0.0);
    rp.compare_values(1.0, out.run_count() as f64, 0.0);

    // The single-offset element at the origin is the identity
    let identity = Sel::from_offsets(&[(0, 0)]).unwrap();
    let a = fixtures::random_plane(1, 50, 30, 0.35).unwrap();
    rp.compare_values(1.0, (dilate(&a, &identity).unwrap() == a) as u8 as f64, 0.0);
    rp.compare_values(1.0, (erode(&a, &identity).unwrap() == a) as u8 as f64, 0.0);

    assert!(rp.cleanup(), "binmorph1 scenario tests failed");
}

// ==========================================================================
// Test 2: 2D dilation and erosion against the dense reference
// ==========================================================================

#[test]
fn binmorph1_reg_reference_2d() {
    init_tracing_for_tests();
    let mut rp = RegParams::new("binmorph1_reference_2d");

    let sources = [
        fixtures::random_plane(7, 61, 37, 0.3).unwrap(),
        fixtures::random_blobs(8, 61, 37, 12, 14).unwrap(),
    ];
    for source in &sources {
        for sel in test_sels() {
            let hits = offsets(&sel);

            let dilated = dilate(source, &sel).unwrap();
            rp.compare_arrays(&reference::dilate(source, &hits).unwrap(), &dilated);

            let eroded = erode(source, &sel).unwrap();
            rp.compare_arrays(&reference::erode(source, &hits, false).unwrap(), &eroded);

            let strict = erode_with(source, &sel, BoundaryCondition::Asymmetric).unwrap();
            rp.compare_arrays(&reference::erode(source, &hits, true).unwrap(), &strict);
        }
    }

    assert!(rp.cleanup(), "binmorph1 2D reference tests failed");
}

// ==========================================================================
// Test 3: 3D dilation and erosion against the dense reference
// ==========================================================================

#[test]
fn binmorph1_reg_reference_3d() {
    let mut rp = RegParams::new("binmorph1_reference_3d");

    let source = fixtures::random_volume(9, 17, 13, 9, 0.25).unwrap();
    let sels = [
        Sel::create_sphere(2).unwrap(),
        Sel::create_brick_3d(3, 1, 4).unwrap(),
        Sel::from_offsets_3d(&[(0, 0, 0), (2, -1, 1), (-1, 0, -3)]).unwrap(),
    ];
    for sel in &sels {
        let hits = offsets(sel);
        let dilated = dilate(&source, sel).unwrap();
        rp.compare_arrays(&reference::dilate(&source, &hits).unwrap(), &dilated);
        let eroded = erode(&source, sel).unwrap();
        rp.compare_arrays(&reference::erode(&source, &hits, false).unwrap(), &eroded);
        let strict = erode_with(&source, sel, BoundaryCondition::Asymmetric).unwrap();
        rp.compare_arrays(&reference::erode(&source, &hits, true).unwrap(), &strict);
    }

    // A planar element acts on each plane independently
    let flat = Sel::create_brick_3d(5, 3, 1).unwrap();
    let planar = Sel::create_brick(5, 3).unwrap();
    let dilated = dilate(&source, &flat).unwrap();
    for z in 0..9 {
        let expected = dilate(&source.slice(z).unwrap(), &planar).unwrap();
        rp.compare_values(1.0, (dilated.slice(z).unwrap() == expected) as u8 as f64, 0.0);
    }

    assert!(rp.cleanup(), "binmorph1 3D reference tests failed");
}

// ==========================================================================
// Test 4: Duality and monotonicity
// ==========================================================================

#[test]
fn binmorph1_reg_properties() {
    let mut rp = RegParams::new("binmorph1_properties");

    let a = fixtures::random_blobs(10, 70, 45, 15, 12).unwrap();
    for sel in test_sels() {
        // erode(A) == !dilate(!A, reflect(SE))
        let eroded = erode(&a, &sel).unwrap();
        let dual = complement(&dilate(&complement(&a).unwrap(), &sel.reflect()).unwrap()).unwrap();
        rp.compare_values(1.0, (eroded == dual) as u8 as f64, 0.0);

        // A ⊆ B implies dilate(A) ⊆ dilate(B)
        let b = rlebin_core::LogicalOp::OR
            .process(&a, &fixtures::random_plane(11, 70, 45, 0.05).unwrap())
            .unwrap();
        let da = dilate(&a, &sel).unwrap();
        let db = dilate(&b, &sel).unwrap();
        let escaped = rlebin_core::LogicalOp::AND_NOT.process(&da, &db).unwrap();
        rp.compare_values(0.0, escaped.pixel_count() as f64, 0.0);
    }

    // Dilation by an element containing the origin is extensive
    let grown = dilate(&a, &Sel::create_brick(WIDTH, HEIGHT).unwrap()).unwrap();
    rp.compare_values(1.0, (grown.pixel_count() >= a.pixel_count()) as u8 as f64, 0.0);
    rp.compare_values(
        1.0,
        a.rows().all(|(y, row)| row.runs().all(|r| grown.get(r.start(), y).unwrap())) as u8 as f64,
        0.0,
    );
    rp.display_array("grown", &grown);
    rp.compare_values(70.0 * 45.0, (grown.count_true() + complement(&grown).unwrap().count_true()) as f64, 0.0);

    assert!(rp.cleanup(), "binmorph1 property tests failed");
}

// ==========================================================================
// Test 5: Dilation of content touching the left and right borders
// ==========================================================================

fn check_border_dilation(rp: &mut RegParams, source: &RunLengthBinaryArray2D, sel: &Sel) {
    let out = dilate(source, sel).unwrap();
    let w = out.width() as i32;
    let in_bounds = out
        .rows()
        .all(|(_, row)| row.runs().all(|r| r.start() >= 0 && r.end() < w));
    rp.compare_values(1.0, in_bounds as u8 as f64, 0.0);

    let expected = reference::dilate(source, &offsets(sel)).unwrap();
    rp.compare_arrays(&expected, &out);
    rp.compare_values(expected.count_true() as f64, out.pixel_count() as f64, 0.0);
    let rebuilt = RunLengthBinaryArray2D::from_fn(out.width(), out.height(), |x, y| {
        expected.get_boolean(&[x, y]).unwrap_or(false)
    })
    .unwrap();
    rp.compare_values(1.0, (rebuilt == out) as u8 as f64, 0.0);

    let bytes = out.write_to_bytes().unwrap();
    let back = RunLengthBinaryArray2D::read_from_bytes(&bytes).unwrap();
    rp.compare_values(1.0, (back == out) as u8 as f64, 0.0);
}

#[test]
fn binmorph1_reg_borders() {
    let mut rp = RegParams::new("binmorph1_borders");

    // Single pixel on the left edge, horizontal line of 3
    let mut left = RunLengthBinaryArray2D::new(10, 3).unwrap();
    left.set(0, 1, true).unwrap();
    let horizontal = Sel::create_horizontal(3).unwrap();
    let out = dilate(&left, &horizontal).unwrap();
    rp.compare_values(2.0, out.pixel_count() as f64, 0.0);
    check_border_dilation(&mut rp, &left, &horizontal);

    // Single-column plane: every run is clipped on both sides
    let column = RunLengthBinaryArray2D::from_fn(1, 5, |_, y| y == 2).unwrap();
    let square = Sel::create_brick(3, 3).unwrap();
    let out = dilate(&column, &square).unwrap();
    rp.compare_values(3.0, out.pixel_count() as f64, 0.0);
    let full = RunLengthBinaryArray2D::from_fn(1, 5, |_, _| true).unwrap();
    rp.compare_values(5.0, dilate(&full, &square).unwrap().pixel_count() as f64, 0.0);
    check_border_dilation(&mut rp, &column, &square);
    check_border_dilation(&mut rp, &full, &square);

    // Content on both edges with assorted elements
    let edges = RunLengthBinaryArray2D::from_fn(17, 9, |x, y| x == 0 || x == 16 || (x + y) % 7 == 0).unwrap();
    for sel in test_sels() {
        check_border_dilation(&mut rp, &edges, &sel);
    }

    assert!(rp.cleanup(), "binmorph1 border tests failed");
}
