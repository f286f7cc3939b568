//! Binary morphology regression test - compound operations
//!
//! Tests opening, closing, the hats, gradient, boundary extraction,
//! hit-miss and the brick shortcuts against compositions of the dense
//! reference operators.
//!
//! Run with:
//! ```
//! cargo test -p rlebin-morph --test binmorph2_reg
//! ```

use rlebin_core::{LogicalOp, RunLengthArray, RunLengthBinaryArray2D};
use rlebin_morph::{
    BoundaryType, Sel, bottom_hat, close, close_brick, close_safe, dilate, dilate_brick, erode,
    erode_brick, extract_boundary, gradient, hit_miss_transform, open, open_brick, top_hat,
};
use rlebin_test::{RegParams, fixtures, init_tracing_for_tests, reference};

fn hits(sel: &Sel) -> Vec<reference::Offset> {
    sel.hit_offsets().map(|(dx, dy, dz)| [dx, dy, dz]).collect()
}

fn misses(sel: &Sel) -> Vec<reference::Offset> {
    sel.miss_offsets().map(|(dx, dy, dz)| [dx, dy, dz]).collect()
}

/// True when every foreground pixel of `inner` is set in `outer`.
fn is_subset<A: RunLengthArray>(inner: &A, outer: &A) -> bool {
    LogicalOp::AND_NOT
        .process(inner, outer)
        .map(|rest| rest.is_empty())
        .unwrap_or(false)
}

// ==========================================================================
// Test 1: Opening and closing
// ==========================================================================

#[test]
fn binmorph2_reg_open_close() {
    init_tracing_for_tests();
    let mut rp = RegParams::new("binmorph2_open_close");

    let a = fixtures::random_blobs(41, 64, 40, 14, 11).unwrap();
    let noisy = LogicalOp::XOR
        .process(&a, &fixtures::random_plane(42, 64, 40, 0.08).unwrap())
        .unwrap();

    let sels = [
        Sel::create_brick(5, 3).unwrap(),
        Sel::create_disk(2).unwrap(),
        Sel::create_diamond(2).unwrap(),
        Sel::from_offsets(&[(0, 0), (3, 1), (-2, 2)]).unwrap(),
    ];
    for sel in &sels {
        let h = hits(sel);
        let opened = open(&noisy, sel).unwrap();
        let closed = close(&noisy, sel).unwrap();

        let ref_open = reference::dilate(&reference::erode(&noisy, &h, false).unwrap(), &h).unwrap();
        let ref_close = reference::erode(&reference::dilate(&noisy, &h).unwrap(), &h, false).unwrap();
        rp.compare_arrays(&ref_open, &opened);
        rp.compare_arrays(&ref_close, &closed);

        // Opening is anti-extensive, closing extensive
        rp.compare_values(1.0, is_subset(&opened, &noisy) as u8 as f64, 0.0);
        rp.compare_values(1.0, is_subset(&noisy, &closed) as u8 as f64, 0.0);

        // Both are idempotent
        rp.compare_values(1.0, (open(&opened, sel).unwrap() == opened) as u8 as f64, 0.0);
        rp.compare_values(1.0, (close(&closed, sel).unwrap() == closed) as u8 as f64, 0.0);
    }

    // Volumes
    let v = fixtures::random_volume(43, 14, 12, 8, 0.45).unwrap();
    let ball = Sel::create_sphere(1).unwrap();
    let h = hits(&ball);
    let ref_open = reference::dilate(&reference::erode(&v, &h, false).unwrap(), &h).unwrap();
    rp.compare_arrays(&ref_open, &open(&v, &ball).unwrap());
    let ref_close = reference::erode(&reference::dilate(&v, &h).unwrap(), &h, false).unwrap();
    rp.compare_arrays(&ref_close, &close(&v, &ball).unwrap());

    assert!(rp.cleanup(), "binmorph2 open/close tests failed");
}

// ==========================================================================
// Test 2: Closing with a background frame
// ==========================================================================

/// Closing of `a` as if the plane continued with background forever.
fn unbounded_close(a: &RunLengthBinaryArray2D, h: &[reference::Offset]) -> Vec<bool> {
    let (w, hgt) = (a.width() as i32, a.height() as i32);
    let set = |x: i32, y: i32| x >= 0 && y >= 0 && x < w && y < hgt && a.get_unchecked(x, y);
    let mut out = Vec::with_capacity((w * hgt) as usize);
    for y in 0..hgt {
        for x in 0..w {
            let value = h.iter().all(|o| {
                let (px, py) = (x + o[0], y + o[1]);
                h.iter().any(|b| set(px - b[0], py - b[1]))
            });
            out.push(value);
        }
    }
    out
}

#[test]
fn binmorph2_reg_close_safe() {
    let mut rp = RegParams::new("binmorph2_close_safe");

    let a = fixtures::random_blobs(44, 36, 22, 10, 8).unwrap();
    for sel in [Sel::create_disk(2).unwrap(), Sel::create_brick(7, 1).unwrap()] {
        let safe = close_safe(&a, &sel).unwrap();
        let expected = unbounded_close(&a, &hits(&sel));
        let mut mismatches = 0;
        for y in 0..22 {
            for x in 0..36 {
                if safe.get(x, y).unwrap() != expected[(y * 36 + x) as usize] {
                    mismatches += 1;
                }
            }
        }
        rp.compare_values(0.0, mismatches as f64, 0.0);

        // The frame only ever removes border foreground that closing adds
        rp.compare_values(1.0, is_subset(&a, &safe) as u8 as f64, 0.0);
        rp.compare_values(1.0, is_subset(&safe, &close(&a, &sel).unwrap()) as u8 as f64, 0.0);
    }

    assert!(rp.cleanup(), "binmorph2 close_safe tests failed");
}

// ==========================================================================
// Test 3: Gradient, hats and boundaries
// ==========================================================================

#[test]
fn binmorph2_reg_derived() {
    let mut rp = RegParams::new("binmorph2_derived");

    let a = fixtures::random_blobs(45, 50, 34, 12, 10).unwrap();
    let sel = Sel::create_brick(3, 5).unwrap();
    let h = hits(&sel);

    let dil = reference::dilate(&a, &h).unwrap();
    let ero = reference::erode(&a, &h, false).unwrap();
    let expected = reference::combine(&dil, &ero, |d, e| d && !e).unwrap();
    rp.compare_arrays(&expected, &gradient(&a, &sel).unwrap());

    let opened = open(&a, &sel).unwrap();
    let expected = reference::combine(&a, &opened, |x, o| x && !o).unwrap();
    rp.compare_arrays(&expected, &top_hat(&a, &sel).unwrap());

    let closed = close(&a, &sel).unwrap();
    let expected = reference::combine(&closed, &a, |c, x| c && !x).unwrap();
    rp.compare_arrays(&expected, &bottom_hat(&a, &sel).unwrap());

    // Boundaries use the 8-connected neighborhood
    let square = hits(&Sel::create_brick(3, 3).unwrap());
    let inner = extract_boundary(&a, BoundaryType::Inner).unwrap();
    let ero = reference::erode(&a, &square, false).unwrap();
    rp.compare_arrays(&reference::combine(&a, &ero, |x, e| x && !e).unwrap(), &inner);
    let outer = extract_boundary(&a, BoundaryType::Outer).unwrap();
    let dil = reference::dilate(&a, &square).unwrap();
    rp.compare_arrays(&reference::combine(&dil, &a, |d, x| d && !x).unwrap(), &outer);
    rp.display_array("inner", &inner);

    // The two boundaries never overlap
    let overlap = LogicalOp::AND.process(&inner, &outer).unwrap();
    rp.compare_values(0.0, overlap.pixel_count() as f64, 0.0);

    // 26-connected in 3D
    let v = fixtures::random_volume(46, 10, 9, 6, 0.6).unwrap();
    let cube = hits(&Sel::create_brick_3d(3, 3, 3).unwrap());
    let ero = reference::erode(&v, &cube, false).unwrap();
    let inner = extract_boundary(&v, BoundaryType::Inner).unwrap();
    rp.compare_arrays(&reference::combine(&v, &ero, |x, e| x && !e).unwrap(), &inner);

    assert!(rp.cleanup(), "binmorph2 derived tests failed");
}

// ==========================================================================
// Test 4: Hit-miss transform
// ==========================================================================

#[test]
fn binmorph2_reg_hit_miss() {
    init_tracing_for_tests();
    let mut rp = RegParams::new("binmorph2_hit_miss");

    let a = fixtures::random_plane(47, 48, 30, 0.45).unwrap();
    let sels = [
        // Isolated pixel
        Sel::from_string("ooo\noxo\nooo", 1, 1).unwrap(),
        // Upper-left corner
        Sel::from_string("oo.\noxx\n.xx", 1, 1).unwrap(),
        // Horizontal end of line
        Sel::from_string("xxo", 1, 0).unwrap(),
        // Misses only: background with an empty neighbor below
        Sel::from_string("o\n.\no", 0, 1).unwrap(),
    ];
    for sel in &sels {
        let out = hit_miss_transform(&a, sel).unwrap();
        let expected = reference::hit_miss(&a, &hits(sel), &misses(sel)).unwrap();
        rp.compare_arrays(&expected, &out);
    }

    // Rotated corner detectors find all four corners of a rectangle
    let rect = RunLengthBinaryArray2D::from_fn(20, 16, |x, y| (4..=13).contains(&x) && (3..=9).contains(&y))
        .unwrap();
    let corner = Sel::from_string("oo.\noxx\n.xx", 1, 1).unwrap();
    let mut found = 0;
    for rotation in 0..4 {
        found += hit_miss_transform(&rect, &corner.rotate_orth(rotation)).unwrap().pixel_count();
    }
    rp.compare_values(4.0, found as f64, 0.0);

    // Hits outside the array never match
    let edge = RunLengthBinaryArray2D::from_fn(6, 3, |_, _| true).unwrap();
    let reach = Sel::from_offsets(&[(0, 0), (1, 0)]).unwrap();
    let out = hit_miss_transform(&edge, &reach).unwrap();
    rp.compare_values(15.0, out.pixel_count() as f64, 0.0);
    rp.compare_values(0.0, out.get(5, 1).unwrap() as u8 as f64, 0.0);

    // An element with no hits or misses is rejected
    let blank = Sel::create_brick(3, 3).map(|mut s| {
        for y in 0..3 {
            for x in 0..3 {
                s.set_element(x, y, rlebin_morph::SelElement::DontCare);
            }
        }
        s
    });
    rp.compare_values(1.0, hit_miss_transform(&a, &blank.unwrap()).is_err() as u8 as f64, 0.0);

    assert!(rp.cleanup(), "binmorph2 hit-miss tests failed");
}

// ==========================================================================
// Test 5: Brick shortcuts
// ==========================================================================

#[test]
fn binmorph2_reg_bricks() {
    let mut rp = RegParams::new("binmorph2_bricks");

    let a = fixtures::random_blobs(48, 55, 33, 11, 9).unwrap();
    let sel = Sel::create_brick(7, 3).unwrap();
    rp.compare_values(1.0, (dilate_brick(&a, 7, 3).unwrap() == dilate(&a, &sel).unwrap()) as u8 as f64, 0.0);
    rp.compare_values(1.0, (erode_brick(&a, 7, 3).unwrap() == erode(&a, &sel).unwrap()) as u8 as f64, 0.0);
    rp.compare_values(1.0, (open_brick(&a, 7, 3).unwrap() == open(&a, &sel).unwrap()) as u8 as f64, 0.0);
    rp.compare_values(1.0, (close_brick(&a, 7, 3).unwrap() == close(&a, &sel).unwrap()) as u8 as f64, 0.0);

    // 1x1 is the identity, 0 is rejected
    rp.compare_values(1.0, (dilate_brick(&a, 1, 1).unwrap() == a) as u8 as f64, 0.0);
    rp.compare_values(1.0, erode_brick(&a, 0, 3).is_err() as u8 as f64, 0.0);

    // Volumes get a planar brick
    let v = fixtures::random_volume(49, 12, 10, 5, 0.3).unwrap();
    let flat = Sel::create_brick_3d(3, 5, 1).unwrap();
    rp.compare_values(1.0, (dilate_brick(&v, 3, 5).unwrap() == dilate(&v, &flat).unwrap()) as u8 as f64, 0.0);
    rp.compare_values(1.0, (open_brick(&v, 3, 5).unwrap() == open(&v, &flat).unwrap()) as u8 as f64, 0.0);

    assert!(rp.cleanup(), "binmorph2 brick tests failed");
}
