//! Run-level error taxonomy.
//!
//! Each failure class maps to its own exit code so callers (the package
//! manager, CI) can tell them apart without parsing messages.

use thiserror::Error;

use crate::io::download::NetworkError;
use crate::io::install::{InstallError, InstallResult};
use crate::io::verify::{IntegrityError, VerifyFileError};
use crate::releases::TableError;
use crate::resolver::{ResolveError, UnsupportedPlatformError};
use crate::self_check::SelfCheckError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Resolve(ResolveError),

    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatformError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error("failed to read local archive: {0}")]
    Archive(std::io::Error),

    #[error(transparent)]
    Install(#[from] InstallError),

    /// The binary is on disk at `installed.binary_path`, but did not report
    /// the expected version.
    #[error("self-check failed for {}: {source}", .installed.binary_path.display())]
    SelfCheck {
        installed: InstallResult,
        source: SelfCheckError,
    },
}

impl From<ResolveError> for Error {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnsupportedPlatform(e) => Self::UnsupportedPlatform(e),
            other => Self::Resolve(other),
        }
    }
}

impl From<VerifyFileError> for Error {
    fn from(err: VerifyFileError) -> Self {
        match err {
            VerifyFileError::Io(e) => Self::Archive(e),
            VerifyFileError::Integrity(e) => Self::Integrity(e),
        }
    }
}

impl Error {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Table(_) | Self::Archive(_) => 1,
            Self::Resolve(_) => 2,
            Self::UnsupportedPlatform(_) => 3,
            Self::Network(_) => 4,
            Self::Integrity(_) => 5,
            Self::Install(_) => 6,
            Self::SelfCheck { .. } => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;
    use wxman_schema::{Arch, Os, PlatformKey, Sha256Digest};

    #[test]
    fn failure_classes_have_distinct_exit_codes() {
        let platform = PlatformKey::new(Os::Linux, Arch::Aarch64);
        let errors: Vec<Error> = vec![
            ResolveError::UnknownVersion(Version::new(9, 9, 9)).into(),
            ResolveError::UnsupportedPlatform(UnsupportedPlatformError::Declared {
                platform,
                version: Version::new(0, 1, 3),
                reason: "not built".into(),
            })
            .into(),
            NetworkError::Incomplete {
                url: "https://example.com".into(),
                expected: 10,
                received: 5,
            }
            .into(),
            IntegrityError {
                url: "https://example.com".into(),
                expected: Sha256Digest::compute(b"a"),
                actual: Sha256Digest::compute(b"b"),
            }
            .into(),
            InstallError::MissingExecutable("wxman".into()).into(),
            Error::SelfCheck {
                installed: InstallResult {
                    binary_path: "/tmp/wxman".into(),
                    installed_version: Version::new(0, 1, 3),
                },
                source: SelfCheckError::VersionMismatch {
                    expected: Version::new(0, 1, 3),
                    output: "wxman 0.1.2".into(),
                },
            },
        ];

        let mut codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        assert_eq!(codes, [2, 3, 4, 5, 6, 7]);
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn unsupported_platform_is_lifted_out_of_resolve() {
        let err: Error = ResolveError::UnsupportedPlatform(UnsupportedPlatformError::NotInTable {
            platform: PlatformKey::new(Os::Windows, Arch::X86_64),
            version: Version::new(0, 1, 3),
        })
        .into();
        assert!(matches!(err, Error::UnsupportedPlatform(_)));
    }
}
