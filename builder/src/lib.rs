//! libwebrtc builder library.
//!
//! This crate resolves the WebRTC revision pinned by the current stable
//! Chrome release, drives depot_tools to build it, merges the result into a
//! single static library and packages it with its public headers. It is used
//! by the `libwebrtc-builder` CLI binary and can be driven programmatically
//! with stub executors and fetchers for testing.
//!
//! # Modules
//!
//! - [`archive`] - Distribution archive naming, packaging and checksums
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Per-platform build configuration
//! - [`error`] - Semantic error types
//! - [`headers`] - Public header collection
//! - [`invoker`] - gn and ninja invocation
//! - [`link`] - Link plan scanning and artifact classification
//! - [`logging`] - Stderr logger for the `log` facade
//! - [`pipeline`] - Stage-by-stage build orchestration
//! - [`platform`] - Linux and macOS build strategies
//! - [`process`] - External process invocation
//! - [`remote`] - Chrome release and WebRTC pin resolution
//! - [`report`] - Build-info report rendering
//! - [`session`] - Per-run build state
//! - [`smoke`] - Smoke test of a built library
//! - [`sync`] - depot_tools bootstrap and checkout synchronisation
//! - [`workspace`] - On-disk layout of a build

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod headers;
pub mod invoker;
pub mod link;
pub mod logging;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod remote;
pub mod report;
pub mod session;
pub mod smoke;
pub mod sync;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
