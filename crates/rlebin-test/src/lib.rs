//! rlebin-test - Regression test framework for rlebin
//!
//! This crate provides a regression test framework modeled on the
//! classic regutils approach, supporting two modes:
//!
//! - **Compare**: Compare computed results with expected values (default)
//! - **Display**: Additionally print ASCII renderings of arrays for
//!   visual inspection
//!
//! It also carries deterministic random fixtures and dense brute-force
//! reference operators that the run-length implementations are checked
//! against.
//!
//! # Usage
//!
//! ```ignore
//! use rlebin_test::RegParams;
//!
//! let mut rp = RegParams::new("binmorph1");
//! rp.compare_values(4452.0, count as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"

mod error;
pub mod fixtures;
mod params;
pub mod reference;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode, render_ascii};

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a `tracing` subscriber that prints debug events through the
/// test harness' captured output.
///
/// Safe to call from every test; only the first call has an effect.
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        // Another subscriber may already be installed by the test binary
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}
