//! WebRTC pin extraction from a Chromium `DEPS` manifest.

use crate::error::{BuilderError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Matches the `webrtc_git` dependency line and captures its pinned hash.
const WEBRTC_PIN_PATTERN: &str = r"webrtc_git.*src\.git.*@.*'([a-f0-9]+)'";

/// The WebRTC commit pinned by a Chromium revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebrtcCommit(String);

impl WebrtcCommit {
    /// Wrap a known commit hash.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Get the commit hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WebrtcCommit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn webrtc_pin_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[expect(clippy::expect_used, reason = "the pattern is a checked constant")]
        Regex::new(WEBRTC_PIN_PATTERN).expect("WebRTC pin pattern is valid")
    })
}

/// Scan `manifest` line by line for the WebRTC pin; the first match wins.
///
/// # Errors
///
/// Returns [`BuilderError::WebrtcCommitNotFound`] when no line matches.
pub fn find_webrtc_commit(manifest: &str, chrome_commit: &str) -> Result<WebrtcCommit> {
    manifest
        .lines()
        .find_map(|line| webrtc_pin_pattern().captures(line))
        .and_then(|captures| captures.get(1))
        .map(|hash| WebrtcCommit(hash.as_str().to_owned()))
        .ok_or_else(|| BuilderError::WebrtcCommitNotFound {
            chrome_commit: chrome_commit.to_owned(),
        })
}
