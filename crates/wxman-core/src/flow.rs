//! Installation Flow
//!
//! Models one run as a series of explicit state transitions:
//!
//! ```text
//! InstallRequest --[resolve]--> ResolvedArtifact --[fetch + verify]--> VerifiedArchive
//!     --[install]--> InstallResult --[self_check]--> Outcome
//! ```
//!
//! Each step consumes the previous step's output type, so an archive cannot
//! be installed before it is verified, and nothing is fetched for a platform
//! the resolver rejected.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use wxman_schema::{BINARY_NAME, PlatformKey, ReleaseTable};

use crate::io::download::Fetcher;
use crate::io::install::{self, InstallResult};
use crate::io::verify::{self, VerifiedArchive};
use crate::resolver::{self, ResolvedArtifact};
use crate::self_check::{self, SelfCheckReport};
use crate::{Error, NullReporter, Reporter};

/// Where the archive bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSource {
    /// Fetch from the URL in the release table.
    Remote,
    /// An archive already on disk (e.g. downloaded by the package manager).
    Local(PathBuf),
}

/// Everything a single run needs to know.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// `None` selects the latest published version.
    pub version: Option<String>,
    pub platform: PlatformKey,
    pub executable: String,
    pub dest_dir: PathBuf,
    pub source: ArchiveSource,
    /// `None` skips the post-install self-check.
    pub check_timeout: Option<Duration>,
}

impl InstallRequest {
    /// Request the default executable for `platform` into `dest_dir`.
    pub fn new(platform: PlatformKey, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            version: None,
            platform,
            executable: BINARY_NAME.to_string(),
            dest_dir: dest_dir.into(),
            source: ArchiveSource::Remote,
            check_timeout: Some(self_check::DEFAULT_TIMEOUT),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_source(mut self, source: ArchiveSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_check_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.check_timeout = timeout;
        self
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub resolved: ResolvedArtifact,
    pub installed: InstallResult,
    pub self_check: Option<SelfCheckReport>,
}

/// Drives the pipeline against a release table and a fetcher.
pub struct Installer<'a> {
    table: &'a ReleaseTable,
    fetcher: &'a dyn Fetcher,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for Installer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl<'a> Installer<'a> {
    pub fn new(table: &'a ReleaseTable, fetcher: &'a dyn Fetcher) -> Self {
        Self {
            table,
            fetcher,
            reporter: Arc::new(NullReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Step 1: pure table lookup, no I/O.
    pub fn resolve(
        &self,
        version: Option<&str>,
        platform: PlatformKey,
    ) -> Result<ResolvedArtifact, Error> {
        Ok(resolver::resolve(self.table, version, platform)?)
    }

    /// Step 2: fetch the complete archive and check its digest.
    pub async fn fetch_verified(
        &self,
        resolved: &ResolvedArtifact,
        source: &ArchiveSource,
    ) -> Result<VerifiedArchive, Error> {
        let archive = match source {
            ArchiveSource::Remote => {
                self.reporter.section("Fetching");
                let bytes = self.fetcher.fetch(&resolved.artifact.url).await?;
                verify::verify(bytes, resolved)?
            }
            ArchiveSource::Local(path) => {
                self.reporter
                    .info(&format!("Using local archive {}", path.display()));
                verify::verify_file(path, resolved)?
            }
        };
        self.reporter.verified(archive.digest().as_str());
        Ok(archive)
    }

    /// Step 3: extract and atomically place the executable.
    pub fn install(
        &self,
        archive: &VerifiedArchive,
        executable: &str,
        dest_dir: &Path,
    ) -> Result<InstallResult, Error> {
        self.reporter.section("Installing");
        self.reporter.installing(&dest_dir.join(executable));
        Ok(install::install(archive, executable, dest_dir)?)
    }

    /// Step 4: ask the installed binary for its version.
    pub fn self_check(
        &self,
        installed: &InstallResult,
        timeout: Duration,
    ) -> Result<SelfCheckReport, Error> {
        self.reporter.section("Checking");
        self_check::self_check(
            &installed.binary_path,
            &installed.installed_version,
            timeout,
        )
        .map_err(|source| Error::SelfCheck {
            installed: installed.clone(),
            source,
        })
    }

    /// Run every step in order, stopping at the first failure.
    pub async fn run(&self, request: &InstallRequest) -> Result<Outcome, Error> {
        let result = self.run_steps(request).await;
        match &result {
            Ok(outcome) => self.reporter.done(
                &outcome.installed.installed_version,
                &outcome.installed.binary_path.display().to_string(),
            ),
            Err(Error::SelfCheck { installed, source }) => self
                .reporter
                .failed(Some(&installed.installed_version), &source.to_string()),
            Err(e) => self.reporter.failed(None, &e.to_string()),
        }
        result
    }

    async fn run_steps(&self, request: &InstallRequest) -> Result<Outcome, Error> {
        let resolved = self.resolve(request.version.as_deref(), request.platform)?;
        tracing::info!(
            "Resolved wxman {} for {} to {}",
            resolved.version,
            resolved.platform,
            resolved.artifact.url
        );

        let archive = self.fetch_verified(&resolved, &request.source).await?;
        let installed = self.install(&archive, &request.executable, &request.dest_dir)?;

        let self_check = match request.check_timeout {
            Some(timeout) => Some(self.self_check(&installed, timeout)?),
            None => {
                self.reporter.warning("Skipping post-install self-check");
                None
            }
        };

        Ok(Outcome {
            resolved,
            installed,
            self_check,
        })
    }
}
