//! Shared test utilities for the builder crate.

use crate::error::Result;
use crate::process::{CommandExecutor, Invocation};
use crate::remote::fetch::{FetchError, HttpFetcher};
use std::cell::RefCell;
use std::collections::HashMap;
use std::process::ExitStatus;

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

type Effect = Box<dyn Fn(&Invocation)>;

/// A `CommandExecutor` that records invocations instead of spawning them.
///
/// Every call succeeds unless its program matches the configured failing
/// program. Effects registered with [`RecordingExecutor::with_effect`] run
/// for matching programs, letting tests simulate the files a real tool
/// would leave behind.
#[derive(Default)]
pub struct RecordingExecutor {
    calls: RefCell<Vec<Invocation>>,
    failing: Option<String>,
    effects: Vec<(String, Effect)>,
}

impl RecordingExecutor {
    /// Creates an executor on which every command succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor on which `program` exits with status 1.
    #[must_use]
    pub fn failing_on(program: &str) -> Self {
        Self {
            failing: Some(program.to_owned()),
            ..Self::default()
        }
    }

    /// Runs `effect` whenever `program` is invoked, before reporting success.
    #[must_use]
    pub fn with_effect(mut self, program: &str, effect: impl Fn(&Invocation) + 'static) -> Self {
        self.effects.push((program.to_owned(), Box::new(effect)));
        self
    }

    /// Returns a copy of every recorded invocation, in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Returns the recorded command lines as `program arg arg...` strings.
    #[must_use]
    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|call| {
                std::iter::once(call.program.as_str())
                    .chain(call.args.iter().map(String::as_str))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, invocation: &Invocation) -> Result<ExitStatus> {
        self.calls.borrow_mut().push(invocation.clone());

        if self.failing.as_deref() == Some(invocation.program.as_str()) {
            return Ok(exit_status(1));
        }

        for (program, effect) in &self.effects {
            if *program == invocation.program {
                effect(invocation);
            }
        }
        Ok(exit_status(0))
    }
}

/// An `HttpFetcher` serving fixed bodies keyed by URL.
///
/// Unknown URLs answer with [`FetchError::NotFound`].
#[derive(Debug, Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, String>,
    requested: RefCell<Vec<String>>,
}

impl StaticFetcher {
    /// Creates a fetcher with no documents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `url`.
    #[must_use]
    pub fn with_document(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_owned(), body.to_owned());
        self
    }

    /// Returns the URLs requested so far, in order.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl HttpFetcher for StaticFetcher {
    fn fetch_text(&self, url: &str) -> std::result::Result<String, FetchError> {
        self.requested.borrow_mut().push(url.to_owned());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                url: url.to_owned(),
            })
    }
}
