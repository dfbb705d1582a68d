//! Per-platform build configuration.
//!
//! A configuration file describes everything about a build that depends on
//! the target rather than on the run: which channel-feed platform to follow,
//! which gn arguments and ninja targets to use, where the link plan lives,
//! and which headers to ship. Files live at `configs/<os>_<arch>.yml` by
//! default; TOML is accepted as well.
//!
//! Keys use snake case. The lower-case run-together spellings written by
//! earlier releases of this tool (`chromeosstr`, `gnopts`, ...) are accepted
//! as aliases.

use crate::error::{BuilderError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

/// Build configuration loaded once per run and read-only thereafter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Platform identifier used to query the Chrome channel feed.
    #[serde(alias = "chromeosstr")]
    pub chrome_os: String,
    /// Options passed to `install-build-deps.sh` (Linux only).
    #[serde(default, alias = "builddepsopts")]
    pub build_deps_opts: Vec<String>,
    /// Sysroot architecture to install and build against, if any.
    #[serde(default, alias = "sysrootarch")]
    pub sysroot_arch: Option<String>,
    /// gn arguments, each `key=value`.
    #[serde(default, alias = "gnopts")]
    pub gn_opts: Vec<String>,
    /// Ninja targets, built in order.
    #[serde(alias = "buildtargets")]
    pub build_targets: Vec<String>,
    /// Link plan file, relative to the build output directory.
    #[serde(alias = "ninjafile")]
    pub ninja_file: String,
    /// Substring identifying the link line of the library target.
    #[serde(alias = "ninjatarget")]
    pub ninja_target: String,
    /// Substrings of linked files to leave out of the merged library.
    #[serde(default, alias = "excludefiles")]
    pub exclude_files: Vec<String>,
    /// Directories whose top-level headers are shipped.
    #[serde(default)]
    pub headers: Vec<String>,
    /// Directory patterns whose headers are shipped recursively.
    #[serde(default, alias = "headerswithsubdir")]
    pub headers_with_subdir: Vec<String>,
}

impl BuildConfig {
    /// Check the fields every build depends on.
    ///
    /// # Errors
    ///
    /// Returns a description of the first missing field.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let required = [
            ("chrome_os", self.chrome_os.as_str()),
            ("ninja_file", self.ninja_file.as_str()),
            ("ninja_target", self.ninja_target.as_str()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(format!("{name} must not be empty"));
        }
        if self.build_targets.is_empty() {
            return Err("build_targets must list at least one target".to_owned());
        }
        Ok(())
    }
}

/// Default configuration path for a target: `configs/<os>_<arch>.yml`.
#[must_use]
pub fn default_config_path(config_dir: &Utf8Path, os: &str, arch: &str) -> Utf8PathBuf {
    config_dir.join(format!("{os}_{arch}.yml"))
}

/// Load and validate the configuration at `path`.
///
/// The format is chosen from the extension: `.yml`/`.yaml` or `.toml`.
///
/// # Errors
///
/// Returns [`BuilderError::ConfigNotFound`] if the file does not exist and
/// [`BuilderError::InvalidConfig`] if it cannot be parsed or validated.
pub fn load(path: &Utf8Path) -> Result<BuildConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BuilderError::ConfigNotFound {
            path: path.to_owned(),
        },
        _ => BuilderError::filesystem(path, e),
    })?;
    let config = parse(path, &contents)?;
    config
        .validate()
        .map_err(|reason| invalid(path, reason))?;
    Ok(config)
}

/// Parse configuration text in the format implied by `path`.
///
/// # Errors
///
/// Returns [`BuilderError::InvalidConfig`] on an unknown extension or a
/// parse error.
pub fn parse(path: &Utf8Path, contents: &str) -> Result<BuildConfig> {
    match path.extension() {
        Some("yml" | "yaml") => {
            serde_yaml::from_str(contents).map_err(|e| invalid(path, e.to_string()))
        }
        Some("toml") => toml::from_str(contents).map_err(|e| invalid(path, e.to_string())),
        other => Err(invalid(
            path,
            format!("unsupported config format {}", other.unwrap_or("(none)")),
        )),
    }
}

fn invalid(path: &Utf8Path, reason: String) -> BuilderError {
    BuilderError::InvalidConfig {
        path: path.to_owned(),
        reason,
    }
}
