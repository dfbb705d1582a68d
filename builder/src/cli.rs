//! CLI argument definitions for the libwebrtc builder.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use log::LevelFilter;

/// Architecture the smoke test targets unless told otherwise.
pub const DEFAULT_TEST_ARCH: &str = "amd64";

/// Default build root, relative to the current directory.
pub const DEFAULT_ROOT: &str = "opt";

/// Default directory holding `<os>_<arch>.yml` configurations.
pub const DEFAULT_CONFIG_DIR: &str = "configs";

/// Build a redistributable static libwebrtc.
#[derive(Parser, Debug)]
#[command(name = "libwebrtc-builder")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build a redistributable static libwebrtc.\n\n",
    "The builder resolves the WebRTC revision pinned by the current stable ",
    "Chrome release, builds it with depot_tools, merges the result into a ",
    "single libwebrtc.a and packages it with its public headers.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Build for the host architecture:\n",
    "    $ libwebrtc-builder build\n\n",
    "  Build a debug library for arm64 with a custom configuration:\n",
    "    $ libwebrtc-builder build --is-debug --arch arm64 --config my.yml\n\n",
    "  Run the smoke test against a built library:\n",
    "    $ libwebrtc-builder test --arch amd64",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build and package libwebrtc.
    Build(BuildArgs),

    /// Run the smoke test program against a built library.
    Test(TestArgs),
}

/// Arguments for the build command.
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Build with debug settings.
    #[arg(long)]
    pub is_debug: bool,

    /// Target architecture [default: host architecture].
    #[arg(long, value_name = "ARCH", default_value_t = host_arch())]
    pub arch: String,

    /// Build configuration [default: configs/<os>_<arch>.yml].
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Directory holding depot_tools and the per-target work directories.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_ROOT)]
    pub root: Utf8PathBuf,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl BuildArgs {
    /// Log level implied by `-v`/`-q`.
    #[must_use]
    pub const fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Arguments for the test command.
#[derive(Parser, Debug, Clone)]
pub struct TestArgs {
    /// Architecture of the library under test.
    #[arg(long, value_name = "ARCH", default_value = DEFAULT_TEST_ARCH)]
    pub arch: String,
}

/// Translate a Rust architecture name to the one used in configuration and
/// archive names.
#[must_use]
pub fn normalize_arch(arch: &str) -> &str {
    match arch {
        "x86" => "i386",
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        other => other,
    }
}

/// The host architecture, normalised.
#[must_use]
pub fn host_arch() -> String {
    normalize_arch(std::env::consts::ARCH).to_owned()
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
