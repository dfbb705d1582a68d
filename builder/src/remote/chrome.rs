//! Chrome release channel lookup.
//!
//! The channel feed is a JSON list of per-OS records, each carrying the
//! current version and branch commit of every release channel.

use crate::error::{BuilderError, Result};
use serde::{Deserialize, Deserializer};

/// The only channel the builder tracks.
pub const STABLE_CHANNEL: &str = "stable";

/// One OS entry of the channel feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlatformRecord {
    /// Platform identifier, such as `linux` or `mac`.
    pub os: String,
    /// Channel records in feed order.
    #[serde(default)]
    pub versions: Vec<ChannelRecord>,
}

/// One release channel of a platform.
///
/// Missing or `null` fields decode as empty strings so that a sparse entry
/// for one platform never prevents lookups for another.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelRecord {
    /// Chromium commit the channel's release branch was cut from.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub branch_commit: String,
    /// Channel name (`stable`, `beta`, `dev`, `canary`, ...).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub channel: String,
    /// Version string currently shipped on the channel.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub current_version: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The Chrome release a build is pinned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeRelease {
    /// Released version, e.g. `100.0.4896.60`.
    pub version: String,
    /// Chromium commit of the release branch.
    pub commit: String,
}

/// Decode the channel feed fetched from `url`.
///
/// # Errors
///
/// Returns [`BuilderError::InvalidRemoteData`] if the body is not a list of
/// platform records.
pub fn parse_platform_records(url: &str, body: &str) -> Result<Vec<PlatformRecord>> {
    serde_json::from_str(body).map_err(|e| BuilderError::InvalidRemoteData {
        url: url.to_owned(),
        reason: e.to_string(),
    })
}

/// Find the stable release for `platform`.
///
/// Records are searched in feed order and the first `stable` entry of a
/// record whose OS matches wins. Other channels are never used as a fallback.
///
/// # Errors
///
/// Returns [`BuilderError::RemoteInfoNotFound`] if no matching record has a
/// stable entry.
pub fn find_stable_release(records: &[PlatformRecord], platform: &str) -> Result<ChromeRelease> {
    records
        .iter()
        .filter(|record| record.os == platform)
        .flat_map(|record| record.versions.iter())
        .find(|entry| entry.channel == STABLE_CHANNEL)
        .map(|entry| ChromeRelease {
            version: entry.current_version.clone(),
            commit: entry.branch_commit.clone(),
        })
        .ok_or_else(|| BuilderError::RemoteInfoNotFound {
            platform: platform.to_owned(),
        })
}
