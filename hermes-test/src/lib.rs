//! Helpers for testing the profiling pipeline.
//!
//! When writing tests, keep the following points in mind:
//!
//!  - In every test, call [`setup`]. This will set up the logger so that all console output is
//!    captured by the test runner. All logs emitted with [`hermes_log`] will show up for test
//!    failures or when run with `--nocapture`.
//!
//! # Example
//!
//! ```no_run
//! #[test]
//! fn my_test() {
//!     hermes_test::setup();
//!
//!     hermes_log::debug!("hello, world!");
//! }
//! ```

/// Setup the test environment.
///
///  - Initializes logs: The logger captures logs from the workspace crates.
pub fn setup() {
    hermes_log::init_test!();
}
