//! libwebrtc builder CLI entrypoint.
//!
//! `build` resolves, builds and packages libwebrtc for the host OS; `test`
//! runs the smoke program against a built library.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use libwebrtc_builder::cli::{BuildArgs, Cli, Command, DEFAULT_CONFIG_DIR, TestArgs};
use libwebrtc_builder::config::{self, default_config_path};
use libwebrtc_builder::error::{BuilderError, Result};
use libwebrtc_builder::logging;
use libwebrtc_builder::pipeline::Pipeline;
use libwebrtc_builder::platform::TargetOs;
use libwebrtc_builder::process::{ProcessRunner, SearchPath, SystemCommandExecutor};
use libwebrtc_builder::remote::fetch::UreqFetcher;
use libwebrtc_builder::session::BuildSession;
use libwebrtc_builder::smoke;
use log::{LevelFilter, info};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let level = match &cli.command {
        Command::Build(args) => args.log_level(),
        Command::Test(_) => LevelFilter::Info,
    };
    if logging::init(level).is_err() {
        write_stderr_line(&mut stderr, "logger already installed");
    }

    let run_result = match &cli.command {
        Command::Build(args) => run_build(args, &mut stderr),
        Command::Test(args) => run_test(args),
    };
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run_build(args: &BuildArgs, stderr: &mut dyn Write) -> Result<()> {
    let os = TargetOs::host()?;
    let config_path = args.config.clone().unwrap_or_else(|| {
        default_config_path(Utf8Path::new(DEFAULT_CONFIG_DIR), os.as_str(), &args.arch)
    });
    info!("using configuration {config_path}");
    let config = config::load(&config_path)?;

    let root = absolute(&args.root)?;
    let mut session = BuildSession::new(&root, os, &args.arch, args.is_debug);
    let executor = SystemCommandExecutor;
    let fetcher = UreqFetcher;

    let outcome = Pipeline::new(&config, &executor, &fetcher).run(&mut session)?;
    write_stderr_line(stderr, format!("Built {}", outcome.archive_path));
    write_stderr_line(stderr, format!("Checksum {}", outcome.checksum_path));
    Ok(())
}

fn run_test(args: &TestArgs) -> Result<()> {
    let cwd = current_dir()?;
    let executor = SystemCommandExecutor;
    let search_path = SearchPath::new();
    smoke::run(&ProcessRunner::new(&executor, &search_path), &cwd, &args.arch)
}

/// Anchor a relative root at the current directory so that commands run
/// from nested directories still see the same paths.
fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }
    Ok(current_dir()?.join(path))
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|e| BuilderError::Io(e.into_io_error()))
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = BuilderError::RemoteInfoNotFound {
            platform: "linux".to_owned(),
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.contains("remote info not found for platform linux"));
    }

    #[test]
    fn absolute_keeps_absolute_paths() {
        let path = Utf8Path::new("/srv/opt");
        assert_eq!(absolute(path).expect("absolute"), path);
    }

    #[test]
    fn absolute_anchors_relative_paths() {
        let resolved = absolute(Utf8Path::new("opt")).expect("absolute");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("opt"));
    }
}
