//! Tests for builder CLI parsing and default behaviours.

use super::*;
use rstest::rstest;

fn build_args(args: &[&str]) -> BuildArgs {
    let cli = Cli::parse_from(std::iter::once("libwebrtc-builder").chain(args.iter().copied()));
    match cli.command {
        Command::Build(args) => args,
        Command::Test(_) => panic!("expected Build command"),
    }
}

#[test]
fn build_parses_defaults() {
    let args = build_args(&["build"]);
    assert!(!args.is_debug);
    assert_eq!(args.arch, host_arch());
    assert!(args.config.is_none());
    assert_eq!(args.root, Utf8PathBuf::from("opt"));
    assert_eq!(args.log_level(), LevelFilter::Info);
}

#[test]
fn build_parses_every_option() {
    let args = build_args(&[
        "build",
        "--is-debug",
        "--arch",
        "arm64",
        "--config",
        "my.toml",
        "--root",
        "/srv/webrtc",
    ]);
    assert!(args.is_debug);
    assert_eq!(args.arch, "arm64");
    assert_eq!(args.config, Some(Utf8PathBuf::from("my.toml")));
    assert_eq!(args.root, Utf8PathBuf::from("/srv/webrtc"));
}

#[rstest]
#[case::quiet(&["build", "-q"], LevelFilter::Warn)]
#[case::verbose(&["build", "-v"], LevelFilter::Debug)]
#[case::very_verbose(&["build", "-vv"], LevelFilter::Trace)]
fn verbosity_flags_set_log_level(#[case] args: &[&str], #[case] level: LevelFilter) {
    assert_eq!(build_args(args).log_level(), level);
}

#[test]
fn quiet_conflicts_with_verbose() {
    let result = Cli::try_parse_from(["libwebrtc-builder", "build", "-q", "-v"]);
    assert!(result.is_err());
}

#[test]
fn test_defaults_to_amd64() {
    let cli = Cli::parse_from(["libwebrtc-builder", "test"]);
    assert!(matches!(cli.command, Command::Test(args) if args.arch == DEFAULT_TEST_ARCH));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["libwebrtc-builder"]).is_err());
}

#[rstest]
#[case::x86("x86", "i386")]
#[case::x86_64("x86_64", "amd64")]
#[case::aarch64("aarch64", "arm64")]
#[case::other("riscv64", "riscv64")]
fn architectures_are_normalised(#[case] rust_arch: &str, #[case] expected: &str) {
    assert_eq!(normalize_arch(rust_arch), expected);
}
