//! Platform-specific build strategies.
//!
//! The target OS decides three things: whether the checkout needs system
//! packages installed, how the linked artifacts are fused into one static
//! library, and which archive format is shipped. Each OS implements
//! [`PlatformStrategy`]; the strategy is chosen once, from [`TargetOs`], when
//! a session is created.

mod linux;
mod macos;

pub use linux::LinuxPlatform;
pub use macos::MacosPlatform;

use crate::archive::{self, ArchiveFormat, ArchiveName, PackageOutput};
use crate::config::BuildConfig;
use crate::error::{BuilderError, Result};
use crate::link::LinkArtifacts;
use crate::process::ProcessRunner;
use crate::workspace::WorkspaceLayout;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::str::FromStr;

/// File name of the merged library inside `lib/`.
pub const MERGED_LIBRARY: &str = "libwebrtc.a";

/// File name of the temporary archive holding loose object files.
pub const OBJECTS_ARCHIVE: &str = "libmywebrtc.a";

/// Operating systems the builder produces libraries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOs {
    /// Linux, merged with `ar -M` and shipped as `.tar.gz`.
    Linux,
    /// macOS, merged with `libtool` and shipped as `.zip`.
    Macos,
}

impl TargetOs {
    /// The OS name used in paths and archive names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
        }
    }

    /// The OS this builder is running on.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::UnsupportedPlatform`] on any other host.
    pub fn host() -> Result<Self> {
        std::env::consts::OS.parse()
    }

    /// The build strategy for this OS.
    #[must_use]
    pub fn strategy(self) -> Box<dyn PlatformStrategy> {
        match self {
            Self::Linux => Box::new(LinuxPlatform),
            Self::Macos => Box::new(MacosPlatform),
        }
    }
}

impl FromStr for TargetOs {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::Macos),
            other => Err(BuilderError::UnsupportedPlatform {
                os: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What differs between target operating systems.
pub trait PlatformStrategy {
    /// The OS this strategy builds for.
    fn os(&self) -> TargetOs;

    /// The distribution archive format.
    fn archive_format(&self) -> ArchiveFormat;

    /// Returns `true` for linked files this OS never ships, regardless of
    /// the configured exclusions.
    fn always_excludes(&self, _token: &str) -> bool {
        false
    }

    /// Prepare a freshly checked-out source tree before `gclient sync`.
    ///
    /// # Errors
    ///
    /// Returns the first failing command.
    fn prepare_source(
        &self,
        _runner: &ProcessRunner<'_>,
        _src_dir: &Utf8Path,
        _config: &BuildConfig,
    ) -> Result<()> {
        Ok(())
    }

    /// Fuse the linked artifacts into `lib/libwebrtc.a` and return its path.
    ///
    /// # Errors
    ///
    /// Returns the first failing archiver command or filesystem error.
    fn merge_artifacts(
        &self,
        runner: &ProcessRunner<'_>,
        layout: &WorkspaceLayout,
        artifacts: &LinkArtifacts,
    ) -> Result<Utf8PathBuf>;

    /// Package `members` of the work directory under a versioned name.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Packaging`] if the archive cannot be written.
    fn package(
        &self,
        layout: &WorkspaceLayout,
        version: &str,
        arch: &str,
        members: &[&str],
    ) -> Result<PackageOutput> {
        let name = ArchiveName::new(version, self.os().as_str(), arch, self.archive_format());
        archive::package(layout.work_dir(), members, &name)
    }
}

/// Archive loose object files into `tmp/libmywebrtc.a`.
///
/// Returns `None` without running anything when there are no objects.
pub(crate) fn consolidate_objects(
    runner: &ProcessRunner<'_>,
    layout: &WorkspaceLayout,
    objects: &[Utf8PathBuf],
) -> Result<Option<Utf8PathBuf>> {
    if objects.is_empty() {
        return Ok(None);
    }
    let objects_archive = layout.tmp_dir().join(OBJECTS_ARCHIVE);
    let mut args = vec!["cr".to_owned(), objects_archive.to_string()];
    args.extend(objects.iter().map(ToString::to_string));
    runner.run(layout.work_dir(), "ar", &args)?;
    Ok(Some(objects_archive))
}

/// Remove a previous merged library so the new one is not appended to it.
pub(crate) fn remove_stale_library(path: &Utf8Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuilderError::filesystem(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::linux("linux", TargetOs::Linux, ArchiveFormat::TarGz)]
    #[case::macos("macos", TargetOs::Macos, ArchiveFormat::Zip)]
    fn os_name_selects_strategy(
        #[case] name: &str,
        #[case] os: TargetOs,
        #[case] format: ArchiveFormat,
    ) {
        let parsed: TargetOs = name.parse().expect("known OS");
        assert_eq!(parsed, os);
        let strategy = parsed.strategy();
        assert_eq!(strategy.os(), os);
        assert_eq!(strategy.archive_format(), format);
        assert_eq!(parsed.to_string(), name);
    }

    #[test]
    fn unknown_os_is_unsupported() {
        let err = "windows".parse::<TargetOs>().expect_err("unsupported");
        assert!(matches!(err, BuilderError::UnsupportedPlatform { os } if os == "windows"));
    }
}
