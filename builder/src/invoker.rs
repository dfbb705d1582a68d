//! gn and ninja invocation.
//!
//! gn generates `out/Default` from the configured arguments plus the debug
//! and sysroot switches; ninja then builds each configured target in turn.

use crate::config::BuildConfig;
use crate::error::Result;
use crate::process::ProcessRunner;
use crate::workspace::{OUT_DIR, WorkspaceLayout};
use log::info;

/// The full gn argument string for a build.
///
/// Configured options come first, followed by `is_debug` and `use_sysroot`.
/// A sysroot is used exactly when the configuration names a sysroot
/// architecture.
#[must_use]
pub fn gn_args(config: &BuildConfig, debug: bool) -> String {
    let mut args = config.gn_opts.clone();
    args.push(format!("is_debug={debug}"));
    args.push(format!("use_sysroot={}", config.sysroot_arch.is_some()));
    args.join(" ")
}

/// Generate the build directory and build every configured target.
///
/// # Errors
///
/// Returns the first failing command; later targets are not attempted.
pub fn build(
    runner: &ProcessRunner<'_>,
    layout: &WorkspaceLayout,
    config: &BuildConfig,
    debug: bool,
) -> Result<()> {
    let src = layout.src_dir();
    let args = format!("--args={}", gn_args(config, debug));
    runner.run(&src, "gn", &["gen", OUT_DIR, args.as_str()])?;

    for target in &config.build_targets {
        info!("building {target}");
        runner.run(&src, "ninja", &["-C", OUT_DIR, target.as_str()])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuilderError;
    use crate::process::SearchPath;
    use crate::test_utils::RecordingExecutor;
    use camino::Utf8Path;
    use rstest::rstest;

    fn config() -> BuildConfig {
        BuildConfig {
            gn_opts: vec![
                "is_component_build=false".to_owned(),
                "rtc_include_tests=false".to_owned(),
            ],
            build_targets: vec!["webrtc".to_owned(), "builtin_audio_decoder_factory".to_owned()],
            ..BuildConfig::default()
        }
    }

    #[rstest]
    #[case::release_no_sysroot(false, None, "is_debug=false use_sysroot=false")]
    #[case::debug_with_sysroot(true, Some("amd64"), "is_debug=true use_sysroot=true")]
    fn gn_args_append_debug_and_sysroot(
        #[case] debug: bool,
        #[case] sysroot: Option<&str>,
        #[case] suffix: &str,
    ) {
        let config = BuildConfig {
            sysroot_arch: sysroot.map(str::to_owned),
            ..config()
        };
        assert_eq!(
            gn_args(&config, debug),
            format!("is_component_build=false rtc_include_tests=false {suffix}")
        );
    }

    #[test]
    fn gn_args_without_options() {
        assert_eq!(
            gn_args(&BuildConfig::default(), false),
            "is_debug=false use_sysroot=false"
        );
    }

    #[test]
    fn build_generates_then_builds_each_target_in_order() {
        let executor = RecordingExecutor::new();
        let search_path = SearchPath::new();
        let runner = ProcessRunner::new(&executor, &search_path);
        let layout = WorkspaceLayout::new(Utf8Path::new("/opt"), "linux", "amd64");

        build(&runner, &layout, &config(), false).expect("build succeeds");

        assert_eq!(
            executor.command_lines(),
            [
                "gn gen out/Default --args=is_component_build=false rtc_include_tests=false \
                 is_debug=false use_sysroot=false",
                "ninja -C out/Default webrtc",
                "ninja -C out/Default builtin_audio_decoder_factory",
            ]
        );
        let src = layout.src_dir();
        assert!(executor.invocations().iter().all(|call| call.cwd == src));
    }

    #[test]
    fn failing_target_stops_the_build() {
        let executor = RecordingExecutor::failing_on("ninja");
        let search_path = SearchPath::new();
        let runner = ProcessRunner::new(&executor, &search_path);
        let layout = WorkspaceLayout::new(Utf8Path::new("/opt"), "linux", "amd64");

        let err = build(&runner, &layout, &config(), false).expect_err("ninja fails");

        assert!(matches!(err, BuilderError::CommandFailed { program, .. } if program == "ninja"));
        assert_eq!(executor.command_lines().len(), 2);
    }
}
