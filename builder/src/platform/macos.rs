//! macOS: no system packages, merge via `libtool -static`.

use super::{MERGED_LIBRARY, PlatformStrategy, TargetOs, consolidate_objects};
use crate::archive::ArchiveFormat;
use crate::error::Result;
use crate::link::LinkArtifacts;
use crate::process::ProcessRunner;
use crate::workspace::WorkspaceLayout;
use camino::Utf8PathBuf;

/// Objective-C wrapper libraries are never part of the C++ distribution.
const OBJC_SUFFIX: &str = "_objc.a";

/// Strategy for macOS targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacosPlatform;

impl PlatformStrategy for MacosPlatform {
    fn os(&self) -> TargetOs {
        TargetOs::Macos
    }

    fn archive_format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn always_excludes(&self, token: &str) -> bool {
        token.ends_with(OBJC_SUFFIX)
    }

    fn merge_artifacts(
        &self,
        runner: &ProcessRunner<'_>,
        layout: &WorkspaceLayout,
        artifacts: &LinkArtifacts,
    ) -> Result<Utf8PathBuf> {
        let objects_archive = consolidate_objects(runner, layout, &artifacts.objects)?;
        let output = layout.lib_dir().join(MERGED_LIBRARY);

        let mut args = vec!["-static".to_owned(), "-o".to_owned(), output.to_string()];
        args.extend(
            artifacts
                .archives
                .iter()
                .chain(objects_archive.as_ref())
                .map(ToString::to_string),
        );
        runner.run(layout.work_dir(), "libtool", &args)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::SearchPath;
    use crate::test_utils::RecordingExecutor;
    use camino::Utf8Path;
    use rstest::rstest;

    #[rstest]
    #[case::objc("obj/sdk/libbase_objc.a", true)]
    #[case::plain("obj/pc/libpc.a", false)]
    #[case::objc_object("obj/sdk/foo_objc.o", false)]
    fn objc_archives_are_always_excluded(#[case] token: &str, #[case] excluded: bool) {
        assert_eq!(MacosPlatform.always_excludes(token), excluded);
    }

    #[test]
    fn merge_passes_archives_then_objects_to_libtool() {
        let executor = RecordingExecutor::new();
        let search_path = SearchPath::new();
        let runner = ProcessRunner::new(&executor, &search_path);
        let layout = WorkspaceLayout::new(Utf8Path::new("/opt"), "macos", "arm64");
        let artifacts = LinkArtifacts {
            objects: vec![Utf8PathBuf::from("src/out/Default/obj/x.o")],
            archives: vec![Utf8PathBuf::from("src/out/Default/obj/libpc.a")],
        };

        let output = MacosPlatform
            .merge_artifacts(&runner, &layout, &artifacts)
            .expect("merge succeeds");

        assert_eq!(output, Utf8PathBuf::from("/opt/macos_arm64/lib/libwebrtc.a"));
        assert_eq!(
            executor.command_lines(),
            [
                "ar cr /opt/macos_arm64/tmp/libmywebrtc.a src/out/Default/obj/x.o",
                "libtool -static -o /opt/macos_arm64/lib/libwebrtc.a \
                 src/out/Default/obj/libpc.a /opt/macos_arm64/tmp/libmywebrtc.a",
            ]
        );
    }

    #[test]
    fn merge_without_objects_skips_ar() {
        let executor = RecordingExecutor::new();
        let search_path = SearchPath::new();
        let runner = ProcessRunner::new(&executor, &search_path);
        let layout = WorkspaceLayout::new(Utf8Path::new("/opt"), "macos", "arm64");
        let artifacts = LinkArtifacts {
            objects: Vec::new(),
            archives: vec![Utf8PathBuf::from("src/out/Default/obj/libpc.a")],
        };

        MacosPlatform
            .merge_artifacts(&runner, &layout, &artifacts)
            .expect("merge succeeds");

        let calls = executor.invocations();
        assert_eq!(calls.len(), 1);
        assert!(calls.iter().all(|call| call.program == "libtool"));
    }
}
