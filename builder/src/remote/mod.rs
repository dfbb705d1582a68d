//! Resolution of the revision to build.
//!
//! The builder follows Chrome: it asks the channel feed for the current
//! stable release of the configured platform, then reads that release's
//! Chromium `DEPS` file to find the WebRTC commit it pins.
//!
//! - [`fetch`] - HTTP download abstraction
//! - [`chrome`] - Channel feed decoding and stable lookup
//! - [`deps`] - WebRTC pin extraction

pub mod chrome;
pub mod deps;
pub mod fetch;

use crate::error::{BuilderError, Result};
use chrome::{ChromeRelease, find_stable_release, parse_platform_records};
use deps::{WebrtcCommit, find_webrtc_commit};
use fetch::HttpFetcher;
use log::debug;

/// Channel feed listing per-OS release versions.
pub const CHROME_INFO_URL: &str = "https://omahaproxy.appspot.com/all.json";

/// Chromium `DEPS` file URL; `{commit}` is replaced by the Chromium commit.
pub const WEBRTC_INFO_URL: &str =
    "https://raw.githubusercontent.com/chromium/chromium/{commit}/DEPS";

/// Looks up the Chrome release and WebRTC pin for a platform.
pub struct RemoteInfoResolver<'a> {
    fetcher: &'a dyn HttpFetcher,
    chrome_info_url: String,
    webrtc_info_url: String,
}

impl<'a> RemoteInfoResolver<'a> {
    /// Create a resolver against the public endpoints.
    #[must_use]
    pub fn new(fetcher: &'a dyn HttpFetcher) -> Self {
        Self::with_endpoints(fetcher, CHROME_INFO_URL, WEBRTC_INFO_URL)
    }

    /// Create a resolver against custom endpoints.
    ///
    /// `webrtc_info_url` must contain a `{commit}` placeholder.
    #[must_use]
    pub fn with_endpoints(
        fetcher: &'a dyn HttpFetcher,
        chrome_info_url: &str,
        webrtc_info_url: &str,
    ) -> Self {
        Self {
            fetcher,
            chrome_info_url: chrome_info_url.to_owned(),
            webrtc_info_url: webrtc_info_url.to_owned(),
        }
    }

    /// Resolve the current stable Chrome release for `platform`.
    ///
    /// # Errors
    ///
    /// Returns a fetch error, [`BuilderError::InvalidRemoteData`] for an
    /// undecodable feed or an empty version or commit, or
    /// [`BuilderError::RemoteInfoNotFound`] if the platform has no stable
    /// release.
    pub fn chrome_release(&self, platform: &str) -> Result<ChromeRelease> {
        let body = self.fetcher.fetch_text(&self.chrome_info_url)?;
        let records = parse_platform_records(&self.chrome_info_url, &body)?;
        debug!("channel feed lists {} platform(s)", records.len());

        let release = find_stable_release(&records, platform)?;
        if release.version.is_empty() || release.commit.is_empty() {
            return Err(BuilderError::InvalidRemoteData {
                url: self.chrome_info_url.clone(),
                reason: format!("stable entry for {platform} has an empty version or commit"),
            });
        }
        Ok(release)
    }

    /// Resolve the WebRTC commit pinned by Chromium `chrome_commit`.
    ///
    /// # Errors
    ///
    /// Returns a fetch error or [`BuilderError::WebrtcCommitNotFound`].
    pub fn webrtc_commit(&self, chrome_commit: &str) -> Result<WebrtcCommit> {
        let url = self.deps_url(chrome_commit);
        let manifest = self.fetcher.fetch_text(&url)?;
        find_webrtc_commit(&manifest, chrome_commit)
    }

    /// URL of the `DEPS` file for `chrome_commit`.
    #[must_use]
    pub fn deps_url(&self, chrome_commit: &str) -> String {
        self.webrtc_info_url.replace("{commit}", chrome_commit)
    }
}
