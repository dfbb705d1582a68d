//! depot_tools bootstrap and WebRTC checkout synchronisation.
//!
//! depot_tools is cloned once into the build root and updated on later runs.
//! The WebRTC checkout is fetched once per target and then moved to the
//! pinned commit before `gclient sync` brings its dependencies in line.

use crate::config::BuildConfig;
use crate::error::{BuilderError, Result};
use crate::platform::PlatformStrategy;
use crate::process::ProcessRunner;
use crate::remote::deps::WebrtcCommit;
use crate::workspace::WorkspaceLayout;
use camino::Utf8PathBuf;
use log::info;

/// Repository the Chromium tooling is cloned from.
pub const DEPOT_TOOLS_URL: &str =
    "https://chromium.googlesource.com/chromium/tools/depot_tools.git";

/// Branch depot_tools is kept on.
const DEPOT_TOOLS_BRANCH: &str = "main";

/// Clone depot_tools into the build root, or update an existing clone.
///
/// Returns the depot_tools directory, which callers add to the search path.
///
/// # Errors
///
/// Returns [`BuilderError::Filesystem`] if the root cannot be created, or
/// the first failing git command.
pub fn bootstrap_depot_tools(
    runner: &ProcessRunner<'_>,
    layout: &WorkspaceLayout,
) -> Result<Utf8PathBuf> {
    let root = layout.root();
    let depot_tools = root.join("depot_tools");

    if depot_tools.is_dir() {
        info!("updating depot_tools");
        runner.run(&depot_tools, "git", &["checkout", DEPOT_TOOLS_BRANCH])?;
        runner.run(&depot_tools, "git", &["pull"])?;
    } else {
        info!("cloning depot_tools");
        std::fs::create_dir_all(root).map_err(|e| BuilderError::filesystem(root, e))?;
        runner.run(root, "git", &["clone", DEPOT_TOOLS_URL])?;
    }
    Ok(depot_tools)
}

/// Bring the target's checkout to `commit`.
///
/// A missing checkout is fetched first. The strategy then gets a chance to
/// install platform prerequisites before dependencies are synced.
///
/// # Errors
///
/// Returns the first failing command or filesystem error.
pub fn sync_source(
    runner: &ProcessRunner<'_>,
    layout: &WorkspaceLayout,
    strategy: &dyn PlatformStrategy,
    config: &BuildConfig,
    commit: &WebrtcCommit,
) -> Result<()> {
    let work = layout.work_dir();
    if !layout.is_bootstrapped() {
        info!("fetching a new webrtc checkout into {work}");
        std::fs::create_dir_all(work).map_err(|e| BuilderError::filesystem(work, e))?;
        runner.run(work, "fetch", &["--nohooks", "webrtc"])?;
    }

    let src = layout.src_dir();
    runner.run(&src, "git", &["fetch", "origin"])?;
    runner.run(&src, "git", &["checkout", commit.as_str()])?;
    strategy.prepare_source(runner, &src, config)?;
    runner.run(&src, "gclient", &["sync", "-D"])
}
