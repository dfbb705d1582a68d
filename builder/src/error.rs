//! Error types for the libwebrtc builder.
//!
//! Every stage of the pipeline reports failures through [`BuilderError`].
//! Nothing is retried locally; the error names the stage input that failed
//! (a path, a URL, a command) so that the operator can fix it and re-run.

use camino::Utf8PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that can occur while building and packaging libwebrtc.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// An I/O operation failed outside any more specific context.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A filesystem operation on a known path failed.
    #[error("filesystem operation failed for {path}")]
    Filesystem {
        /// The path being created, removed, read, or written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An external command could not be started.
    #[error("failed to start {program}")]
    CommandSpawn {
        /// The program that could not be spawned.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Input could not be written to an external command.
    #[error("failed to write input to {program} ({status})")]
    CommandInput {
        /// The program whose stdin was being written.
        program: String,
        /// The exit status it reported once waited for.
        status: ExitStatus,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An external command exited unsuccessfully.
    #[error("{program} failed in {cwd} ({status})")]
    CommandFailed {
        /// The program that failed.
        program: String,
        /// The working directory it ran in.
        cwd: Utf8PathBuf,
        /// The exit status it reported.
        status: ExitStatus,
    },

    /// An HTTP request failed or returned a non-success status.
    #[error("request to {url} failed: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// An HTTP request returned 404.
    #[error("remote resource not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// A remote document could not be decoded.
    #[error("invalid data from {url}: {reason}")]
    InvalidRemoteData {
        /// The URL the document came from.
        url: String,
        /// Description of the decode failure.
        reason: String,
    },

    /// No stable Chrome release was published for the platform.
    #[error("remote info not found for platform {platform}")]
    RemoteInfoNotFound {
        /// The platform identifier that was looked up.
        platform: String,
    },

    /// The Chromium DEPS file does not pin a WebRTC commit.
    #[error("webrtc commit not found in DEPS of chromium {chrome_commit}")]
    WebrtcCommitNotFound {
        /// The Chromium commit whose DEPS file was scanned.
        chrome_commit: String,
    },

    /// A stage needed a remote fact that had not been resolved yet.
    #[error("revision not resolved: {missing} is missing")]
    UnresolvedRevision {
        /// Name of the missing fact.
        missing: &'static str,
    },

    /// The ninja link plan for the library target does not exist.
    #[error("link plan not found at {path}")]
    LinkPlanMissing {
        /// Where the link plan was expected.
        path: Utf8PathBuf,
    },

    /// A configured header directory or pattern has no match in the checkout.
    #[error("header directory not found at {path}")]
    HeaderSourceMissing {
        /// The missing directory or unmatched pattern.
        path: Utf8PathBuf,
    },

    /// A header search pattern is not a valid glob.
    #[error("invalid header pattern {pattern}: {reason}")]
    InvalidHeaderPattern {
        /// The offending pattern.
        pattern: String,
        /// Description of the glob error.
        reason: String,
    },

    /// The build-info template refers to a value the builder does not have.
    #[error("unknown template key {key}")]
    TemplateUnknownKey {
        /// The unrecognised placeholder name.
        key: String,
    },

    /// The configuration file does not exist.
    #[error("configuration not found at {path}")]
    ConfigNotFound {
        /// Path where the configuration was expected.
        path: Utf8PathBuf,
    },

    /// The configuration file could not be parsed or failed validation.
    #[error("invalid configuration at {path}: {reason}")]
    InvalidConfig {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// The builder does not know how to produce libraries for this OS.
    #[error("unsupported target OS {os}; expected linux or macos")]
    UnsupportedPlatform {
        /// The requested OS name.
        os: String,
    },

    /// Writing the distribution archive failed.
    #[error("packaging {path} failed: {reason}")]
    Packaging {
        /// The archive being written.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },
}

impl BuilderError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn filesystem(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using [`BuilderError`].
pub type Result<T> = std::result::Result<T, BuilderError>;
