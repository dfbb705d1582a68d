//! Stage-by-stage build orchestration.
//!
//! A run walks [`Stage::ALL`] in order. Each stage reads what earlier stages
//! left in the [`BuildSession`] and the first failure ends the run; there are
//! no retries and nothing is rolled back, so a rerun resumes from an
//! existing checkout.

use crate::archive::{ArchiveName, PackageOutput};
use crate::config::BuildConfig;
use crate::error::{BuilderError, Result};
use crate::headers;
use crate::invoker;
use crate::link::LinkPlan;
use crate::process::{CommandExecutor, ProcessRunner};
use crate::remote::RemoteInfoResolver;
use crate::remote::fetch::HttpFetcher;
use crate::report::{self, BUILD_INFO_FILENAME, BuildInfo};
use crate::session::{BuildSession, ResolvedRevision};
use crate::sync;
use crate::workspace::OUT_DIR;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, error, info};
use std::fmt;

/// Files and directories of the work directory that are shipped.
pub const ARCHIVE_MEMBERS: [&str; 3] = ["include", "lib", BUILD_INFO_FILENAME];

/// One step of a build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Recreate the per-run output directories.
    PrepareWorkspace,
    /// Clone or update depot_tools and put it on the search path.
    BootstrapTools,
    /// Look up the current stable Chrome release.
    ResolveChromeRelease,
    /// Look up the WebRTC commit that release pins.
    ResolveWebrtcCommit,
    /// Fetch and sync the checkout at the pinned commit.
    SyncSource,
    /// Run gn and ninja.
    Build,
    /// Fuse the link closure into one static library.
    MergeArtifacts,
    /// Copy public headers.
    CollectHeaders,
    /// Render the build-info report.
    WriteReport,
    /// Write the distribution archive and its checksum.
    Package,
}

impl Stage {
    /// Every stage, in the order a run executes them.
    pub const ALL: [Self; 10] = [
        Self::PrepareWorkspace,
        Self::BootstrapTools,
        Self::ResolveChromeRelease,
        Self::ResolveWebrtcCommit,
        Self::SyncSource,
        Self::Build,
        Self::MergeArtifacts,
        Self::CollectHeaders,
        Self::WriteReport,
        Self::Package,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PrepareWorkspace => "prepare workspace",
            Self::BootstrapTools => "bootstrap depot_tools",
            Self::ResolveChromeRelease => "resolve chrome release",
            Self::ResolveWebrtcCommit => "resolve webrtc commit",
            Self::SyncSource => "sync source",
            Self::Build => "build",
            Self::MergeArtifacts => "merge artifacts",
            Self::CollectHeaders => "collect headers",
            Self::WriteReport => "write report",
            Self::Package => "package",
        };
        f.write_str(name)
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// The distribution archive.
    pub archive_path: Utf8PathBuf,
    /// Its `.sha256` file.
    pub checksum_path: Utf8PathBuf,
    /// The revision that was built.
    pub revision: ResolvedRevision,
}

/// Runs the build stages against a session.
pub struct Pipeline<'a> {
    config: &'a BuildConfig,
    executor: &'a dyn CommandExecutor,
    resolver: RemoteInfoResolver<'a>,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline querying the public release endpoints.
    #[must_use]
    pub fn new(
        config: &'a BuildConfig,
        executor: &'a dyn CommandExecutor,
        fetcher: &'a dyn HttpFetcher,
    ) -> Self {
        Self::with_resolver(config, executor, RemoteInfoResolver::new(fetcher))
    }

    /// Create a pipeline with a custom resolver.
    #[must_use]
    pub fn with_resolver(
        config: &'a BuildConfig,
        executor: &'a dyn CommandExecutor,
        resolver: RemoteInfoResolver<'a>,
    ) -> Self {
        Self {
            config,
            executor,
            resolver,
        }
    }

    /// Run every stage in order.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails.
    pub fn run(&self, session: &mut BuildSession) -> Result<BuildOutcome> {
        info!(
            "building libwebrtc for {}/{} (debug: {})",
            session.os(),
            session.arch(),
            session.debug()
        );
        let mut package = None;
        for stage in Stage::ALL {
            info!("==> {stage}");
            self.run_stage(stage, session, &mut package)
                .inspect_err(|e| error!("stage {stage} failed: {e}"))?;
        }

        let Some(package) = package else {
            return Err(BuilderError::Packaging {
                path: session.layout().work_dir().to_owned(),
                reason: "no archive was produced".to_owned(),
            });
        };
        Ok(BuildOutcome {
            archive_path: package.archive_path,
            checksum_path: package.checksum_path,
            revision: session.resolved()?,
        })
    }

    fn run_stage(
        &self,
        stage: Stage,
        session: &mut BuildSession,
        package: &mut Option<PackageOutput>,
    ) -> Result<()> {
        match stage {
            Stage::PrepareWorkspace => session.layout().prepare(),
            Stage::BootstrapTools => {
                let depot_tools = {
                    let runner = ProcessRunner::new(self.executor, &session.search_path);
                    sync::bootstrap_depot_tools(&runner, session.layout())?
                };
                session.search_path = session.search_path.prepended(depot_tools);
                Ok(())
            }
            Stage::ResolveChromeRelease => {
                let release = self.resolver.chrome_release(&self.config.chrome_os)?;
                info!("stable chrome {} at {}", release.version, release.commit);
                session.chrome_release = Some(release);
                Ok(())
            }
            Stage::ResolveWebrtcCommit => {
                let chrome_commit = session
                    .chrome_release
                    .as_ref()
                    .map(|release| release.commit.clone())
                    .ok_or(BuilderError::UnresolvedRevision {
                        missing: "chrome release",
                    })?;
                let commit = self.resolver.webrtc_commit(&chrome_commit)?;
                info!("webrtc commit {commit}");
                session.webrtc_commit = Some(commit);
                Ok(())
            }
            Stage::SyncSource => {
                let revision = session.resolved()?;
                let runner = ProcessRunner::new(self.executor, &session.search_path);
                sync::sync_source(
                    &runner,
                    session.layout(),
                    session.strategy(),
                    self.config,
                    &revision.webrtc_commit,
                )
            }
            Stage::Build => {
                session.resolved()?;
                let runner = ProcessRunner::new(self.executor, &session.search_path);
                invoker::build(&runner, session.layout(), self.config, session.debug())
            }
            Stage::MergeArtifacts => self.merge_artifacts(session),
            Stage::CollectHeaders => {
                let layout = session.layout();
                let count =
                    headers::collect(self.config, &layout.src_dir(), &layout.include_dir())?;
                info!("collected {count} header(s)");
                Ok(())
            }
            Stage::WriteReport => {
                let revision = session.resolved()?;
                let info = build_info(session, &revision);
                let path = report::write_report(session.layout().work_dir(), &info)?;
                debug!("wrote {path}");
                Ok(())
            }
            Stage::Package => {
                let revision = session.resolved()?;
                let output = session.strategy().package(
                    session.layout(),
                    &revision.version,
                    session.arch(),
                    &ARCHIVE_MEMBERS,
                )?;
                info!("wrote {}", output.archive_path);
                *package = Some(output);
                Ok(())
            }
        }
    }

    fn merge_artifacts(&self, session: &BuildSession) -> Result<()> {
        let layout = session.layout();
        let strategy = session.strategy();
        let plan = LinkPlan::read(
            &layout.out_dir().join(&self.config.ninja_file),
            &self.config.ninja_target,
        )?;

        let base = Utf8Path::new("src").join(OUT_DIR);
        let artifacts = plan.classify(&base, &self.config.exclude_files, |token| {
            strategy.always_excludes(token)
        });
        debug!(
            "link plan lists {} object(s) and {} archive(s)",
            artifacts.objects.len(),
            artifacts.archives.len()
        );

        let runner = ProcessRunner::new(self.executor, &session.search_path);
        let library = strategy.merge_artifacts(&runner, layout, &artifacts)?;
        info!("merged {library}");
        Ok(())
    }
}

fn build_info(session: &BuildSession, revision: &ResolvedRevision) -> BuildInfo {
    let archive_name = ArchiveName::new(
        &revision.version,
        session.os().as_str(),
        session.arch(),
        session.strategy().archive_format(),
    );
    BuildInfo {
        target_os: session.os().to_string(),
        target_arch: session.arch().to_owned(),
        is_debug: session.debug(),
        chrome_version: revision.version.clone(),
        chrome_commit: revision.chrome_commit.clone(),
        webrtc_commit: revision.webrtc_commit.to_string(),
        archive_name: archive_name.filename(),
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
