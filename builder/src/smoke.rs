//! Smoke test of a built library.
//!
//! The `test/` directory holds a small C++ program and Makefile linking
//! against the extracted archive. Running it proves the merged library is
//! self-contained.

use crate::error::Result;
use crate::process::ProcessRunner;
use camino::Utf8Path;

/// Directory holding the smoke-test Makefile, relative to the invocation.
pub const TEST_DIR: &str = "test";

/// Build and run the smoke program for `arch`, then clean up.
///
/// # Errors
///
/// Returns the first failing `make` invocation; cleanup is skipped after a
/// failed run.
pub fn run(runner: &ProcessRunner<'_>, cwd: &Utf8Path, arch: &str) -> Result<()> {
    let arch_var = format!("ARCH={arch}");
    runner.run(cwd, "make", &["run", "-C", TEST_DIR, arch_var.as_str()])?;
    runner.run(cwd, "make", &["clean", "-C", TEST_DIR])
}
