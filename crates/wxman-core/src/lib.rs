//! Core library for wxman-install.
//!
//! Resolves the host platform to a published release archive, fetches and
//! verifies it against the release table's digest, installs the `wxman`
//! executable atomically and runs the post-install self-check.

pub mod error;
pub mod flow;
pub mod formula;
pub mod io;
pub mod paths;
pub mod releases;
pub mod reporter;
pub mod resolver;
pub mod self_check;

pub use error::Error;
pub use flow::{ArchiveSource, InstallRequest, Installer, Outcome};
pub use io::download::{Fetcher, HttpFetcher, NetworkError};
pub use io::install::{InstallError, InstallResult};
pub use io::verify::{IntegrityError, VerifiedArchive};
pub use paths::*;
pub use reporter::{NullReporter, Reporter};
pub use resolver::{ResolveError, ResolvedArtifact, UnsupportedPlatformError, resolve};
pub use self_check::{SelfCheckError, SelfCheckReport};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("wxman-install/", env!("CARGO_PKG_VERSION"));
