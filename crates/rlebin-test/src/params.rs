//! Regression test parameters and operations

use rlebin_core::BinaryArray;
use rlebin_core::array::for_each_position;

/// Widest array rendered in display mode.
const MAX_DISPLAY_WIDTH: u32 = 120;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare results (default)
    #[default]
    Compare,
    /// Compare, and print renderings of arrays
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("REGTEST_MODE").unwrap_or_default())
    }

    /// Parse mode from a string; anything unrecognized means compare
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// This structure tracks the state of a regression test, including
/// the test name, current index, mode, and success status.
pub struct RegParams {
    /// Name of the test (e.g., "binmorph1")
    pub test_name: String,
    /// Current test index (incremented before each test)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is taken from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        Self::with_mode(test_name, RegTestMode::from_env())
    }

    /// Create new regression test parameters with an explicit mode
    pub fn with_mode(test_name: &str, mode: RegTestMode) -> Self {
        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Compare two floating-point values
    ///
    /// Returns `true` if values match within `delta`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg);
            false
        } else {
            true
        }
    }

    /// Compare two binary arrays position by position
    ///
    /// The arrays may use different storage. Returns `true` if they have the
    /// same shape, content and `count_true()`.
    pub fn compare_arrays(&mut self, expected: &dyn BinaryArray, actual: &dyn BinaryArray) -> bool {
        self.index += 1;

        if expected.dims() != actual.dims() {
            let msg = format!(
                "Failure in {}_reg: array comparison for index {} - shape mismatch {:?} vs {:?}",
                self.test_name,
                self.index,
                expected.dims(),
                actual.dims()
            );
            self.fail(msg);
            return false;
        }

        let mut mismatch: Option<Vec<i32>> = None;
        let mut differing = 0u64;
        for_each_position(expected.dims(), |pos| {
            let a = expected.get_boolean(pos).unwrap_or(false);
            let b = actual.get_boolean(pos).unwrap_or(false);
            if a != b {
                differing += 1;
                if mismatch.is_none() {
                    mismatch = Some(pos.to_vec());
                }
            }
        });

        match mismatch {
            None => {
                // Storage outside the shape still counts toward the total
                let (e, a) = (expected.count_true(), actual.count_true());
                if e != a {
                    let msg = format!(
                        "Failure in {}_reg: array comparison for index {} - set counts differ: {} vs {}",
                        self.test_name, self.index, e, a
                    );
                    self.fail(msg);
                    return false;
                }
                true
            }
            Some(pos) => {
                let msg = format!(
                    "Failure in {}_reg: array comparison for index {} - {} positions differ, first at {:?}",
                    self.test_name, self.index, differing, pos
                );
                self.fail(msg);
                if self.display() {
                    eprintln!("expected:\n{}", render_ascii(expected));
                    eprintln!("actual:\n{}", render_ascii(actual));
                }
                false
            }
        }
    }

    /// Compare two byte strings
    ///
    /// Returns `true` if data is identical.
    pub fn compare_strings(&mut self, data1: &[u8], data2: &[u8]) -> bool {
        self.index += 1;

        if data1 != data2 {
            let msg = format!(
                "Failure in {}_reg: string comparison for index {}\n\
                 sizes: {} vs {}",
                self.test_name,
                self.index,
                data1.len(),
                data2.len()
            );
            self.fail(msg);
            false
        } else {
            true
        }
    }

    /// Print an ASCII rendering of `array` in display mode
    pub fn display_array(&self, label: &str, array: &dyn BinaryArray) {
        if self.display() {
            eprintln!("{}_reg: {}\n{}", self.test_name, label, render_ascii(array));
        }
    }

    /// Clean up and report results
    ///
    /// Returns `true` if all tests passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

/// Render a 2D or 3D array as rows of `#` and `.`; 3D planes are separated
/// by a `z = n` line.
pub fn render_ascii(array: &dyn BinaryArray) -> String {
    let dims = array.dims();
    if !matches!(dims.len(), 2 | 3) || dims[0] > MAX_DISPLAY_WIDTH {
        return format!("<{:?} array not rendered>", dims);
    }
    let depth = dims.get(2).copied().unwrap_or(1);
    let mut out = String::new();
    for z in 0..depth as i32 {
        if dims.len() == 3 {
            out.push_str(&format!("z = {z}\n"));
        }
        for y in 0..dims[1] as i32 {
            for x in 0..dims[0] as i32 {
                let pos = [x, y, z];
                let set = array.get_boolean(&pos[..dims.len()]).unwrap_or(false);
                out.push(if set { '#' } else { '.' });
            }
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlebin_core::{DenseBinaryArray, RunLengthBinaryArray2D};

    #[test]
    fn test_mode_parse() {
        assert_eq!(RegTestMode::parse("display"), RegTestMode::Display);
        assert_eq!(RegTestMode::parse(" DISPLAY "), RegTestMode::Display);
        assert_eq!(RegTestMode::parse(""), RegTestMode::Compare);
        assert_eq!(RegTestMode::parse("generate"), RegTestMode::Compare);
    }

    #[test]
    fn test_compare_values_success() {
        let mut rp = RegParams::with_mode("test", RegTestMode::Compare);
        assert!(rp.compare_values(100.0, 100.0, 0.0));
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
        assert_eq!(rp.index(), 2);
    }

    #[test]
    fn test_compare_values_failure() {
        let mut rp = RegParams::with_mode("test", RegTestMode::Compare);
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(!rp.is_success());
        assert_eq!(rp.failures().len(), 1);
    }

    #[test]
    fn test_compare_arrays_across_storage() {
        let mut rp = RegParams::with_mode("test", RegTestMode::Compare);
        let rle = RunLengthBinaryArray2D::from_fn(9, 4, |x, y| x > y).unwrap();
        let dense = rle.to_dense();
        assert!(rp.compare_arrays(&rle, &dense));

        let mut other = DenseBinaryArray::new(&[9, 4]).unwrap();
        other.set_boolean(&[0, 0], true).unwrap();
        assert!(!rp.compare_arrays(&rle, &other));
        let wrong_shape = DenseBinaryArray::new(&[9, 5]).unwrap();
        assert!(!rp.compare_arrays(&rle, &wrong_shape));
        assert!(!rp.cleanup());
    }

    /// Dense array reporting extra set positions beyond its shape.
    struct Overcounted(DenseBinaryArray, u64);

    impl BinaryArray for Overcounted {
        fn dims(&self) -> &[u32] {
            self.0.dims()
        }
        fn get_boolean(&self, pos: &[i32]) -> rlebin_core::Result<bool> {
            self.0.get_boolean(pos)
        }
        fn set_boolean(&mut self, pos: &[i32], state: bool) -> rlebin_core::Result<()> {
            self.0.set_boolean(pos, state)
        }
        fn count_true(&self) -> u64 {
            self.0.count_true() + self.1
        }
    }

    #[test]
    fn test_compare_arrays_checks_set_count() {
        let mut rp = RegParams::with_mode("test", RegTestMode::Compare);
        let rle = RunLengthBinaryArray2D::from_fn(6, 3, |x, _| x == 0).unwrap();
        let same = Overcounted(rle.to_dense(), 0);
        assert!(rp.compare_arrays(&rle, &same));
        let hidden = Overcounted(rle.to_dense(), 1);
        assert!(!rp.compare_arrays(&rle, &hidden));
        assert_eq!(rp.failures().len(), 1);
    }

    #[test]
    fn test_render_ascii() {
        let rle = RunLengthBinaryArray2D::from_fn(4, 2, |x, y| x == y).unwrap();
        assert_eq!(render_ascii(&rle), "#...\n.#..\n");
    }
}
