//! Per-run build state.

use crate::error::{BuilderError, Result};
use crate::platform::{PlatformStrategy, TargetOs};
use crate::process::SearchPath;
use crate::remote::chrome::ChromeRelease;
use crate::remote::deps::WebrtcCommit;
use crate::workspace::WorkspaceLayout;
use camino::Utf8Path;

/// The revision a build is pinned to, once fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRevision {
    /// Chrome release version.
    pub version: String,
    /// Chromium commit of the release.
    pub chrome_commit: String,
    /// WebRTC commit pinned by the Chromium commit.
    pub webrtc_commit: WebrtcCommit,
}

/// Everything one run knows about its target and progress.
///
/// Remote facts start out unknown and are filled in by the resolution
/// stages; [`BuildSession::resolved`] refuses to hand out a partial
/// revision.
pub struct BuildSession {
    os: TargetOs,
    arch: String,
    debug: bool,
    layout: WorkspaceLayout,
    strategy: Box<dyn PlatformStrategy>,
    /// Tool directories applied to every command.
    pub search_path: SearchPath,
    /// Stable Chrome release, once resolved.
    pub chrome_release: Option<ChromeRelease>,
    /// WebRTC pin, once resolved.
    pub webrtc_commit: Option<WebrtcCommit>,
}

impl BuildSession {
    /// Start a session for `os`/`arch` with all state under `root`.
    #[must_use]
    pub fn new(root: &Utf8Path, os: TargetOs, arch: &str, debug: bool) -> Self {
        Self {
            os,
            arch: arch.to_owned(),
            debug,
            layout: WorkspaceLayout::new(root, os.as_str(), arch),
            strategy: os.strategy(),
            search_path: SearchPath::new(),
            chrome_release: None,
            webrtc_commit: None,
        }
    }

    /// Target OS.
    #[must_use]
    pub const fn os(&self) -> TargetOs {
        self.os
    }

    /// Target architecture.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Whether a debug build was requested.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Directory layout of this target.
    #[must_use]
    pub const fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Platform strategy selected for the target OS.
    #[must_use]
    pub fn strategy(&self) -> &dyn PlatformStrategy {
        self.strategy.as_ref()
    }

    /// The fully resolved revision.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::UnresolvedRevision`] naming the first fact
    /// that is absent or empty.
    pub fn resolved(&self) -> Result<ResolvedRevision> {
        let release = self
            .chrome_release
            .as_ref()
            .ok_or(BuilderError::UnresolvedRevision { missing: "chrome release" })?;
        if release.version.is_empty() {
            return Err(BuilderError::UnresolvedRevision { missing: "chrome version" });
        }
        if release.commit.is_empty() {
            return Err(BuilderError::UnresolvedRevision { missing: "chrome commit" });
        }
        let webrtc_commit = self
            .webrtc_commit
            .clone()
            .filter(|commit| !commit.as_str().is_empty())
            .ok_or(BuilderError::UnresolvedRevision { missing: "webrtc commit" })?;

        Ok(ResolvedRevision {
            version: release.version.clone(),
            chrome_commit: release.commit.clone(),
            webrtc_commit,
        })
    }
}
