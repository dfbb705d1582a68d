//! On-disk layout of a build.
//!
//! All state lives under a root directory (`opt/` by default). Each target
//! gets its own work directory `<root>/<os>_<arch>` holding the gclient
//! checkout in `src/` plus the per-run outputs `include/`, `lib/` and `tmp/`.
//! The checkout survives between runs so that re-running only fetches what
//! changed; the outputs are recreated every run so stale files never reach
//! an archive.

use crate::error::{BuilderError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// Build output directory, relative to the checkout.
pub const OUT_DIR: &str = "out/Default";

/// Paths used by one target's build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    root: Utf8PathBuf,
    work: Utf8PathBuf,
}

impl WorkspaceLayout {
    /// Compute the layout for `os`/`arch` under `root`.
    #[must_use]
    pub fn new(root: &Utf8Path, os: &str, arch: &str) -> Self {
        Self {
            root: root.to_owned(),
            work: root.join(format!("{os}_{arch}")),
        }
    }

    /// Root shared by every target (holds `depot_tools/`).
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Per-target work directory.
    #[must_use]
    pub fn work_dir(&self) -> &Utf8Path {
        &self.work
    }

    /// Scratch directory for intermediate archives.
    #[must_use]
    pub fn tmp_dir(&self) -> Utf8PathBuf {
        self.work.join("tmp")
    }

    /// Output directory for collected headers.
    #[must_use]
    pub fn include_dir(&self) -> Utf8PathBuf {
        self.work.join("include")
    }

    /// Output directory for the merged library.
    #[must_use]
    pub fn lib_dir(&self) -> Utf8PathBuf {
        self.work.join("lib")
    }

    /// The gclient checkout.
    #[must_use]
    pub fn src_dir(&self) -> Utf8PathBuf {
        self.work.join("src")
    }

    /// The gn/ninja output directory inside the checkout.
    #[must_use]
    pub fn out_dir(&self) -> Utf8PathBuf {
        self.src_dir().join(OUT_DIR)
    }

    /// The marker `fetch` leaves behind once a checkout has been bootstrapped.
    #[must_use]
    pub fn gclient_marker(&self) -> Utf8PathBuf {
        self.work.join(".gclient")
    }

    /// Returns `true` if this target's checkout has been bootstrapped.
    #[must_use]
    pub fn is_bootstrapped(&self) -> bool {
        self.gclient_marker().exists()
    }

    /// Recreate `include/`, `lib/` and `tmp/` empty. `src/` is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Filesystem`] naming the directory that could
    /// not be removed or created.
    pub fn prepare(&self) -> Result<()> {
        for dir in [self.include_dir(), self.lib_dir(), self.tmp_dir()] {
            recreate_dir(&dir)?;
        }
        Ok(())
    }
}

/// Remove `dir` if present, then create it (and its parents) empty.
fn recreate_dir(dir: &Utf8Path) -> Result<()> {
    if dir.exists() {
        debug!("removing {dir}");
        fs::remove_dir_all(dir).map_err(|e| BuilderError::filesystem(dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| BuilderError::filesystem(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn root() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf8 temp dir");
        (dir, path)
    }

    fn is_empty_dir(path: &Utf8Path) -> bool {
        fs::read_dir(path).expect("readable dir").next().is_none()
    }

    #[test]
    fn layout_paths_follow_os_and_arch() {
        let layout = WorkspaceLayout::new(Utf8Path::new("/repo/opt"), "linux", "amd64");
        assert_eq!(layout.work_dir(), Utf8Path::new("/repo/opt/linux_amd64"));
        assert_eq!(layout.tmp_dir(), Utf8PathBuf::from("/repo/opt/linux_amd64/tmp"));
        assert_eq!(
            layout.out_dir(),
            Utf8PathBuf::from("/repo/opt/linux_amd64/src/out/Default")
        );
        assert_eq!(
            layout.gclient_marker(),
            Utf8PathBuf::from("/repo/opt/linux_amd64/.gclient")
        );
    }

    #[rstest]
    fn prepare_is_idempotent_and_clears_outputs(root: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = root;
        let layout = WorkspaceLayout::new(&root, "linux", "amd64");

        for _ in 0..2 {
            fs::create_dir_all(layout.include_dir().join("api")).expect("stale include");
            fs::write(layout.include_dir().join("api/old.h"), b"").expect("stale header");
            fs::create_dir_all(layout.lib_dir()).expect("lib dir");
            fs::write(layout.lib_dir().join("libwebrtc.a"), b"stale").expect("stale lib");

            layout.prepare().expect("prepare succeeds");

            assert!(is_empty_dir(&layout.include_dir()));
            assert!(is_empty_dir(&layout.lib_dir()));
            assert!(is_empty_dir(&layout.tmp_dir()));
        }
    }

    #[rstest]
    fn prepare_keeps_the_checkout(root: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = root;
        let layout = WorkspaceLayout::new(&root, "macos", "arm64");
        fs::create_dir_all(layout.src_dir()).expect("src dir");
        fs::write(layout.src_dir().join("DEPS"), b"deps").expect("checkout file");
        fs::write(layout.gclient_marker(), b"solutions = []").expect("marker");

        layout.prepare().expect("prepare succeeds");

        assert!(layout.src_dir().join("DEPS").is_file());
        assert!(layout.is_bootstrapped());
    }
}
