//! Public header collection.
//!
//! Headers are copied out of the checkout into `include/`, keeping their
//! path relative to `src/` so that `#include "api/peer_connection.h"` style
//! includes resolve against the shipped tree.

use crate::config::BuildConfig;
use crate::error::{BuilderError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use std::fs;
use walkdir::WalkDir;

const HEADER_EXTENSION: &str = "h";

/// Copy the configured headers from `src_dir` into `include_dir`.
///
/// Returns the number of headers copied.
///
/// # Errors
///
/// Returns [`BuilderError::HeaderSourceMissing`] for a shallow header
/// directory that does not exist or a recursive pattern that matches
/// nothing, [`BuilderError::InvalidHeaderPattern`] for a malformed recursive
/// pattern, or a filesystem error.
pub fn collect(
    config: &BuildConfig,
    src_dir: &Utf8Path,
    include_dir: &Utf8Path,
) -> Result<usize> {
    let mut copied = 0;
    for dir in &config.headers {
        copied += copy_shallow(src_dir, include_dir, dir)?;
    }
    for pattern in &config.headers_with_subdir {
        copied += copy_recursive(src_dir, include_dir, pattern)?;
    }
    Ok(copied)
}

fn copy_shallow(src_dir: &Utf8Path, include_dir: &Utf8Path, dir: &str) -> Result<usize> {
    let source = src_dir.join(dir);
    if !source.is_dir() {
        return Err(BuilderError::HeaderSourceMissing { path: source });
    }
    let dest = include_dir.join(dir);
    fs::create_dir_all(&dest).map_err(|e| BuilderError::filesystem(&dest, e))?;

    let entries = source
        .read_dir_utf8()
        .map_err(|e| BuilderError::filesystem(&source, e))?;
    let mut copied = 0;
    for entry in entries {
        let entry = entry.map_err(|e| BuilderError::filesystem(&source, e))?;
        let path = entry.path();
        if path.is_file() && path.extension() == Some(HEADER_EXTENSION) {
            copy_file(path, &dest.join(entry.file_name()))?;
            copied += 1;
        }
    }
    debug!("copied {copied} header(s) from {source}");
    Ok(copied)
}

fn copy_recursive(src_dir: &Utf8Path, include_dir: &Utf8Path, pattern: &str) -> Result<usize> {
    let invalid = |reason: String| BuilderError::InvalidHeaderPattern {
        pattern: pattern.to_owned(),
        reason,
    };
    // The checkout root is literal text; only the configured part is a glob.
    let rooted = Utf8PathBuf::from(glob::Pattern::escape(src_dir.as_str())).join(pattern);
    let matches = glob::glob(rooted.as_str()).map_err(|e| invalid(e.to_string()))?;

    let mut copied = 0;
    let mut matched_any = false;
    for matched in matches {
        matched_any = true;
        let matched = matched.map_err(|e| invalid(e.to_string()))?;
        for entry in WalkDir::new(&matched).sort_by_file_name() {
            let entry = entry.map_err(|e| invalid(e.to_string()))?;
            let Some(path) = Utf8Path::from_path(entry.path()) else {
                warn!("skipping non UTF-8 path {}", entry.path().display());
                continue;
            };
            if !entry.file_type().is_file() || path.extension() != Some(HEADER_EXTENSION) {
                continue;
            }
            let Ok(relative) = path.strip_prefix(src_dir) else {
                continue;
            };
            copy_file(path, &include_dir.join(relative))?;
            copied += 1;
        }
    }
    if !matched_any {
        return Err(BuilderError::HeaderSourceMissing {
            path: src_dir.join(pattern),
        });
    }
    debug!("copied {copied} header(s) for {pattern}");
    Ok(copied)
}

fn copy_file(from: &Utf8Path, to: &Utf8Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| BuilderError::filesystem(parent, e))?;
    }
    fs::copy(from, to).map_err(|e| BuilderError::filesystem(from, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Tree {
        _guard: TempDir,
        src: Utf8PathBuf,
        include: Utf8PathBuf,
    }

    fn touch(path: &Utf8Path) {
        fs::create_dir_all(path.parent().expect("parent")).expect("parent dirs");
        fs::write(path, b"#pragma once\n").expect("write file");
    }

    /// Paths of every file below `include_dir`, relative to it and sorted.
    fn list(include_dir: &Utf8Path) -> Vec<Utf8PathBuf> {
        WalkDir::new(include_dir)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| entry.expect("walk include dir"))
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let path = Utf8Path::from_path(entry.path()).expect("utf8 path");
                path.strip_prefix(include_dir).expect("below include dir").to_owned()
            })
            .collect()
    }

    #[fixture]
    fn tree() -> Tree {
        tree_under("")
    }

    fn tree_under(parent: &str) -> Tree {
        let guard = TempDir::new().expect("temp dir");
        let base = Utf8PathBuf::try_from(guard.path().to_path_buf()).expect("utf8 temp dir");
        let root = base.join(parent);
        let src = root.join("src");
        for file in [
            "api/peer_connection_interface.h",
            "api/scoped_refptr.h",
            "api/BUILD.gn",
            "api/audio/audio_frame.h",
            "rtc_base/thread.h",
            "rtc_base/numerics/safe_conversions.h",
            "rtc_base/thread.cc",
            "third_party/abseil-cpp/absl/types/optional.h",
            "third_party/abseil-cpp/absl/base/config.h",
        ] {
            touch(&src.join(file));
        }
        Tree {
            _guard: guard,
            include: root.join("include"),
            src,
        }
    }

    fn config(headers: &[&str], with_subdir: &[&str]) -> BuildConfig {
        BuildConfig {
            headers: headers.iter().map(|&s| s.to_owned()).collect(),
            headers_with_subdir: with_subdir.iter().map(|&s| s.to_owned()).collect(),
            ..BuildConfig::default()
        }
    }

    #[rstest]
    fn shallow_copy_skips_subdirectories_and_other_files(tree: Tree) {
        let copied = collect(&config(&["api"], &[]), &tree.src, &tree.include).expect("collect");

        assert_eq!(copied, 2);
        assert_eq!(
            list(&tree.include),
            [
                Utf8PathBuf::from("api/peer_connection_interface.h"),
                Utf8PathBuf::from("api/scoped_refptr.h"),
            ]
        );
    }

    #[rstest]
    fn recursive_copy_preserves_relative_paths(tree: Tree) {
        let copied =
            collect(&config(&[], &["rtc_base"]), &tree.src, &tree.include).expect("collect");

        assert_eq!(copied, 2);
        assert!(tree.include.join("rtc_base/numerics/safe_conversions.h").is_file());
        assert!(tree.include.join("rtc_base/thread.h").is_file());
        assert!(!tree.include.join("rtc_base/thread.cc").exists());
    }

    #[rstest]
    #[case::brackets("ci[1]")]
    #[case::wildcard("build*")]
    #[case::question_mark("run?")]
    fn glob_characters_in_root_are_literal(#[case] parent: &str) {
        let tree = tree_under(parent);
        let copied =
            collect(&config(&[], &["rtc_base"]), &tree.src, &tree.include).expect("collect");

        assert_eq!(copied, 2);
        assert_eq!(
            list(&tree.include),
            [
                Utf8PathBuf::from("rtc_base/numerics/safe_conversions.h"),
                Utf8PathBuf::from("rtc_base/thread.h"),
            ]
        );
    }

    #[rstest]
    fn recursive_pattern_expands_globs(tree: Tree) {
        let copied = collect(
            &config(&[], &["third_party/abseil-cpp/absl/*"]),
            &tree.src,
            &tree.include,
        )
        .expect("collect");

        assert_eq!(copied, 2);
        assert!(tree.include.join("third_party/abseil-cpp/absl/types/optional.h").is_file());
        assert!(tree.include.join("third_party/abseil-cpp/absl/base/config.h").is_file());
    }

    #[rstest]
    #[case::missing_directory("modules/rtp_rtcp/include")]
    #[case::glob_without_match("sdk/objc/*")]
    fn unmatched_recursive_pattern_is_fatal(tree: Tree, #[case] pattern: &str) {
        let err = collect(&config(&[], &[pattern]), &tree.src, &tree.include)
            .expect_err("pattern matches nothing");
        assert!(
            matches!(
                &err,
                BuilderError::HeaderSourceMissing { path } if *path == tree.src.join(pattern)
            ),
            "unexpected error {err:?}"
        );
    }

    #[rstest]
    fn missing_shallow_directory_is_fatal(tree: Tree) {
        let err =
            collect(&config(&["media"], &[]), &tree.src, &tree.include).expect_err("missing");
        assert!(matches!(
            err,
            BuilderError::HeaderSourceMissing { path } if path == tree.src.join("media")
        ));
    }

    #[rstest]
    fn malformed_pattern_is_rejected(tree: Tree) {
        let err = collect(&config(&[], &["api/[audio"]), &tree.src, &tree.include)
            .expect_err("bad glob");
        assert!(matches!(
            err,
            BuilderError::InvalidHeaderPattern { pattern, .. } if pattern == "api/[audio"
        ));
    }
}
