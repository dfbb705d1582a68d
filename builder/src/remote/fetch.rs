//! HTTP retrieval of remote release metadata.
//!
//! Provides a trait-based abstraction over plain-text downloads so that the
//! resolver can be exercised without network access.

use crate::error::BuilderError;
use std::sync::OnceLock;
use std::time::Duration;

/// Network timeout applied to each metadata request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Trait for downloading text documents.
#[cfg_attr(test, mockall::automock)]
pub trait HttpFetcher {
    /// Download `url` and return its body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out, or does not answer
    /// with a success status.
    fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Errors arising from metadata downloads.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("request to {url} failed: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested document was not found (HTTP 404).
    #[error("remote resource not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },
}

impl From<FetchError> for BuilderError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::HttpError { url, reason } => Self::Http { url, reason },
            FetchError::NotFound { url } => Self::NotFound { url },
        }
    }
}

/// HTTP-based fetcher using `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqFetcher;

impl HttpFetcher for UreqFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        response
            .into_body()
            .read_to_string()
            .map_err(|e| FetchError::HttpError {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(FETCH_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`FetchError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> FetchError {
    match err {
        ureq::Error::StatusCode(404) => FetchError::NotFound {
            url: url.to_owned(),
        },
        other => FetchError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_ureq_error_maps_404_to_not_found() {
        let err = ureq::Error::StatusCode(404);
        let mapped = map_ureq_error("https://example.test/all.json", &err);
        assert!(matches!(mapped, FetchError::NotFound { .. }));
    }

    #[test]
    fn map_ureq_error_maps_other_status_to_http_error() {
        let err = ureq::Error::StatusCode(503);
        let mapped = map_ureq_error("https://example.test/all.json", &err);
        assert!(matches!(mapped, FetchError::HttpError { .. }));
    }

    #[test]
    fn fetch_error_converts_with_url_preserved() {
        let err: BuilderError = FetchError::NotFound {
            url: "https://example.test/DEPS".to_owned(),
        }
        .into();
        assert!(matches!(err, BuilderError::NotFound { url } if url.ends_with("/DEPS")));
    }
}
