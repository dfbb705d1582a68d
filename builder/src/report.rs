//! Build-info report rendering.
//!
//! The report ships inside the archive and records exactly which revision
//! the library was built from. The template uses `{{ Name }}` placeholders;
//! whitespace inside the braces is optional.

use crate::error::{BuilderError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the report inside the work directory and the archive.
pub const BUILD_INFO_FILENAME: &str = "libwebrtc_buildinfo.txt";

/// The template embedded into the binary.
pub const BUILD_INFO_TEMPLATE: &str = include_str!("../../templates/buildinfo.template");

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Values available to the report template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Target OS (`linux`, `macos`).
    pub target_os: String,
    /// Target architecture.
    pub target_arch: String,
    /// Whether this is a debug build.
    pub is_debug: bool,
    /// Chrome release version.
    pub chrome_version: String,
    /// Chromium commit of the release.
    pub chrome_commit: String,
    /// WebRTC commit pinned by that Chromium commit.
    pub webrtc_commit: String,
    /// File name of the distribution archive.
    pub archive_name: String,
}

impl BuildInfo {
    fn lookup(&self, key: &str) -> Option<String> {
        let value = match key {
            "TargetOS" => self.target_os.clone(),
            "TargetArch" => self.target_arch.clone(),
            "IsDebug" => self.is_debug.to_string(),
            "ChromeVersion" => self.chrome_version.clone(),
            "ChromeCommitID" => self.chrome_commit.clone(),
            "WebrtcCommitID" => self.webrtc_commit.clone(),
            "ArchiveName" => self.archive_name.clone(),
            _ => return None,
        };
        Some(value)
    }
}

/// Substitute every placeholder in `template`.
///
/// An opening `{{` without a matching `}}` is kept as literal text.
///
/// # Errors
///
/// Returns [`BuilderError::TemplateUnknownKey`] for a placeholder naming a
/// value [`BuildInfo`] does not have.
pub fn render(template: &str, info: &BuildInfo) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let after_open = rest.get(start + OPEN.len()..).unwrap_or_default();
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        out.push_str(rest.get(..start).unwrap_or_default());

        let key = after_open.get(..end).unwrap_or_default().trim();
        let value = info
            .lookup(key)
            .ok_or_else(|| BuilderError::TemplateUnknownKey { key: key.to_owned() })?;
        out.push_str(&value);

        rest = after_open.get(end + CLOSE.len()..).unwrap_or_default();
    }
    out.push_str(rest);
    Ok(out)
}

/// Render the embedded template into `<work_dir>/libwebrtc_buildinfo.txt`.
///
/// # Errors
///
/// Returns a rendering error or [`BuilderError::Filesystem`] if the report
/// cannot be written.
pub fn write_report(work_dir: &Utf8Path, info: &BuildInfo) -> Result<Utf8PathBuf> {
    let contents = render(BUILD_INFO_TEMPLATE, info)?;
    let path = work_dir.join(BUILD_INFO_FILENAME);
    fs::write(&path, contents).map_err(|e| BuilderError::filesystem(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn info() -> BuildInfo {
        BuildInfo {
            target_os: "linux".to_owned(),
            target_arch: "amd64".to_owned(),
            is_debug: false,
            chrome_version: "100.0.1".to_owned(),
            chrome_commit: "abc123".to_owned(),
            webrtc_commit: "def456".to_owned(),
            archive_name: "libwebrtc-100.0.1-linux-amd64.tar.gz".to_owned(),
        }
    }

    #[rstest]
    #[case::spaced("{{ ChromeVersion }}", "100.0.1")]
    #[case::tight("{{WebrtcCommitID}}", "def456")]
    #[case::bool("debug={{ IsDebug }}", "debug=false")]
    #[case::several("{{TargetOS}}_{{ TargetArch }}", "linux_amd64")]
    #[case::unclosed("{{ TargetOS", "{{ TargetOS")]
    #[case::plain("no placeholders", "no placeholders")]
    fn placeholders_are_substituted(
        info: BuildInfo,
        #[case] template: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(render(template, &info).expect("render"), expected);
    }

    #[rstest]
    fn unknown_key_is_an_error(info: BuildInfo) {
        let err = render("built at {{ GeneratedAt }}", &info).expect_err("unknown key");
        assert!(matches!(err, BuilderError::TemplateUnknownKey { key } if key == "GeneratedAt"));
    }

    #[rstest]
    fn embedded_template_renders_every_value(info: BuildInfo) {
        let report = render(BUILD_INFO_TEMPLATE, &info).expect("render");
        let archive = "libwebrtc-100.0.1-linux-amd64.tar.gz";
        for value in ["linux", "amd64", "100.0.1", "abc123", "def456", archive] {
            assert!(report.contains(value), "report lacks {value}:\n{report}");
        }
        assert!(!report.contains(OPEN));
    }

    #[rstest]
    fn report_is_written_to_work_dir(info: BuildInfo) {
        let dir = TempDir::new().expect("temp dir");
        let work = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf8 temp dir");

        let path = write_report(&work, &info).expect("write report");

        assert_eq!(path, work.join(BUILD_INFO_FILENAME));
        let written = fs::read_to_string(&path).expect("read report");
        assert_eq!(written, render(BUILD_INFO_TEMPLATE, &info).expect("render"));
    }
}
