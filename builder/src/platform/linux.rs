//! Linux: system packages via `install-build-deps.sh`, merge via `ar -M`.

use super::{MERGED_LIBRARY, PlatformStrategy, TargetOs, consolidate_objects, remove_stale_library};
use crate::archive::ArchiveFormat;
use crate::config::BuildConfig;
use crate::error::Result;
use crate::link::LinkArtifacts;
use crate::process::ProcessRunner;
use crate::workspace::WorkspaceLayout;
use camino::{Utf8Path, Utf8PathBuf};

const INSTALL_BUILD_DEPS: &str = "./build/install-build-deps.sh";
const INSTALL_SYSROOT: &str = "./build/linux/sysroot_scripts/install-sysroot.py";

/// Strategy for Linux targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxPlatform;

impl PlatformStrategy for LinuxPlatform {
    fn os(&self) -> TargetOs {
        TargetOs::Linux
    }

    fn archive_format(&self) -> ArchiveFormat {
        ArchiveFormat::TarGz
    }

    fn prepare_source(
        &self,
        runner: &ProcessRunner<'_>,
        src_dir: &Utf8Path,
        config: &BuildConfig,
    ) -> Result<()> {
        let mut deps_args = config.build_deps_opts.clone();
        deps_args.push("--no-prompt".to_owned());
        runner.run(src_dir, INSTALL_BUILD_DEPS, &deps_args)?;

        if let Some(arch) = &config.sysroot_arch {
            runner.run(src_dir, INSTALL_SYSROOT, &[format!("--arch={arch}")])?;
        }
        Ok(())
    }

    fn merge_artifacts(
        &self,
        runner: &ProcessRunner<'_>,
        layout: &WorkspaceLayout,
        artifacts: &LinkArtifacts,
    ) -> Result<Utf8PathBuf> {
        let objects_archive = consolidate_objects(runner, layout, &artifacts.objects)?;
        let output = layout.lib_dir().join(MERGED_LIBRARY);
        remove_stale_library(&output)?;

        let script = mri_script(&output, &artifacts.archives, objects_archive.as_deref());
        runner.run_with_stdin(layout.work_dir(), &script, "ar", &["-M"])?;
        Ok(output)
    }
}

/// Build the `ar -M` script that merges `archives` (and the consolidated
/// objects archive, last) into `output`.
#[must_use]
pub fn mri_script(
    output: &Utf8Path,
    archives: &[Utf8PathBuf],
    objects_archive: Option<&Utf8Path>,
) -> String {
    let mut script = format!("create {output}\n");
    for lib in archives.iter().map(Utf8PathBuf::as_path).chain(objects_archive) {
        script.push_str(&format!("addlib {lib}\n"));
    }
    script.push_str("save\nend");
    script
}
