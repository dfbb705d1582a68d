//! External process invocation.
//!
//! Every tool the pipeline drives (git, depot_tools, gn, ninja, ar, libtool,
//! make) is run through [`ProcessRunner`]. Output is streamed to the
//! builder's own stdout and stderr rather than captured, and a non-zero exit
//! aborts the run. The depot_tools directory is threaded into each invocation
//! as an explicit [`SearchPath`] instead of being written into the process
//! environment.

use crate::error::{BuilderError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::process::{Command, ExitStatus, Stdio};

/// Directories searched for executables before the inherited `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<Utf8PathBuf>,
}

impl SearchPath {
    /// Create an empty search path (only the inherited `PATH` applies).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of this search path with `dir` searched first.
    #[must_use]
    pub fn prepended(&self, dir: impl Into<Utf8PathBuf>) -> Self {
        let mut dirs = Vec::with_capacity(self.dirs.len() + 1);
        dirs.push(dir.into());
        dirs.extend(self.dirs.iter().cloned());
        Self { dirs }
    }

    /// Directories in search order.
    #[must_use]
    pub fn dirs(&self) -> &[Utf8PathBuf] {
        &self.dirs
    }

    /// Returns `true` when no directories have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Build a `PATH` value with these directories ahead of `inherited`.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory contains the platform path separator.
    pub fn to_env_value(&self, inherited: Option<OsString>) -> Result<OsString> {
        let inherited_dirs = inherited
            .map(|value| std::env::split_paths(&value).collect::<Vec<_>>())
            .unwrap_or_default();
        let all = self
            .dirs
            .iter()
            .map(|dir| dir.as_std_path().to_path_buf())
            .chain(inherited_dirs);
        std::env::join_paths(all).map_err(|e| BuilderError::Io(std::io::Error::other(e)))
    }

    /// Find `program` in one of the search directories.
    ///
    /// Only bare program names are looked up; anything containing a path
    /// separator is returned as `None`.
    #[must_use]
    pub fn locate(&self, program: &str) -> Option<Utf8PathBuf> {
        if program.contains('/') {
            return None;
        }
        self.dirs
            .iter()
            .map(|dir| dir.join(program))
            .find(|candidate| candidate.is_file())
    }
}

/// A single external command: program, arguments, directory, and input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Working directory for the command.
    pub cwd: Utf8PathBuf,
    /// Text written to the command's stdin, if any.
    pub stdin: Option<String>,
    /// Extra executable search directories.
    pub search_path: SearchPath,
}

impl Invocation {
    /// Returns `true` if the invocation runs `program` with exactly `args`.
    #[must_use]
    pub fn matches(&self, program: &str, args: &[&str]) -> bool {
        self.program == program && self.args.iter().map(String::as_str).eq(args.iter().copied())
    }

    /// Resolve the program path the way the child should see it.
    ///
    /// Bare names are looked up in the search path first; relative paths
    /// such as `./build/install-build-deps.sh` are anchored at `cwd`.
    #[must_use]
    pub fn resolved_program(&self) -> Utf8PathBuf {
        if let Some(found) = self.search_path.locate(&self.program) {
            return found;
        }
        let program = Utf8Path::new(&self.program);
        if program.is_relative() && self.program.contains('/') {
            self.cwd.join(program)
        } else {
            program.to_owned()
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}$ {}", self.cwd, self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs the invocation to completion and returns its exit status.
    ///
    /// # Errors
    ///
    /// Returns any I/O error encountered while spawning the command or
    /// feeding its stdin.
    fn execute(&self, invocation: &Invocation) -> Result<ExitStatus>;
}

/// Executes commands on the host system with inherited stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, invocation: &Invocation) -> Result<ExitStatus> {
        let mut cmd = Command::new(invocation.resolved_program().as_std_path());
        cmd.args(&invocation.args)
            .current_dir(invocation.cwd.as_std_path())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if !invocation.search_path.is_empty() {
            let path = invocation
                .search_path
                .to_env_value(std::env::var_os("PATH"))?;
            cmd.env("PATH", path);
        }

        let spawn_error = |source| BuilderError::CommandSpawn {
            program: invocation.program.clone(),
            source,
        };

        let Some(input) = invocation.stdin.as_deref() else {
            return cmd.status().map_err(spawn_error);
        };

        cmd.stdin(Stdio::piped());
        let mut child = cmd.spawn().map_err(spawn_error)?;
        // Dropping the handle closes the pipe so the child sees EOF.
        let written = child
            .stdin
            .take()
            .map_or(Ok(()), |mut stdin| stdin.write_all(input.as_bytes()));
        let status = child.wait().map_err(spawn_error)?;
        match written {
            Err(source) if status.success() => Err(BuilderError::CommandInput {
                program: invocation.program.clone(),
                status,
                source,
            }),
            _ => Ok(status),
        }
    }
}

/// Runs commands through an executor, failing on non-zero exit.
pub struct ProcessRunner<'a> {
    executor: &'a dyn CommandExecutor,
    search_path: &'a SearchPath,
}

impl<'a> ProcessRunner<'a> {
    /// Create a runner that applies `search_path` to every invocation.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, search_path: &'a SearchPath) -> Self {
        Self {
            executor,
            search_path,
        }
    }

    /// Run `program` with `args` in `cwd`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::CommandFailed`] on a non-zero exit, or the
    /// executor's error if the command could not be run at all.
    pub fn run<S: AsRef<str>>(&self, cwd: &Utf8Path, program: &str, args: &[S]) -> Result<()> {
        self.execute(self.invocation(cwd, program, args, None))
    }

    /// Run `program` with `args` in `cwd`, writing `input` to its stdin.
    ///
    /// # Errors
    ///
    /// As for [`ProcessRunner::run`].
    pub fn run_with_stdin<S: AsRef<str>>(
        &self,
        cwd: &Utf8Path,
        input: &str,
        program: &str,
        args: &[S],
    ) -> Result<()> {
        self.execute(self.invocation(cwd, program, args, Some(input.to_owned())))
    }

    fn invocation<S: AsRef<str>>(
        &self,
        cwd: &Utf8Path,
        program: &str,
        args: &[S],
        stdin: Option<String>,
    ) -> Invocation {
        Invocation {
            program: program.to_owned(),
            args: args.iter().map(|arg| arg.as_ref().to_owned()).collect(),
            cwd: cwd.to_owned(),
            stdin,
            search_path: self.search_path.clone(),
        }
    }

    fn execute(&self, invocation: Invocation) -> Result<()> {
        info!("{invocation}");
        let status = self.executor.execute(&invocation)?;
        if status.success() {
            Ok(())
        } else {
            Err(BuilderError::CommandFailed {
                program: invocation.program,
                cwd: invocation.cwd,
                status,
            })
        }
    }
}
