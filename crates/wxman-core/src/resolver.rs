//! Platform-to-artifact resolution.
//!
//! Pure lookup over a [`ReleaseTable`]: the version selects a channel, then
//! the OS and architecture select an entry inside it. There is no fuzzy
//! matching and no fallback to another architecture's archive.

use semver::Version;
use serde::Serialize;
use thiserror::Error;
use wxman_schema::{ArtifactRef, PlatformEntry, PlatformKey, PlatformParseError, ReleaseTable};

/// The platform has no archive to install.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedPlatformError {
    /// The release explicitly declares this platform unsupported.
    #[error("{platform} is explicitly unsupported by wxman {version}: {reason}")]
    Declared {
        platform: PlatformKey,
        version: Version,
        reason: String,
    },

    /// The release does not mention this platform at all.
    #[error("no wxman {version} archive is published for {platform}")]
    NotInTable {
        platform: PlatformKey,
        version: Version,
    },

    /// Host introspection produced an OS or CPU outside the known set.
    #[error("unrecognized host platform: {0}")]
    UnrecognizedHost(#[from] PlatformParseError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid version '{input}': {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("wxman {0} is not a published release")]
    UnknownVersion(Version),

    #[error("the release table has no published versions")]
    NoReleases,

    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatformError),
}

/// Output of [`resolve`]: what to fetch, for which version and platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedArtifact {
    pub version: Version,
    pub platform: PlatformKey,
    pub artifact: ArtifactRef,
}

/// Parse a user-facing version string. A leading `v` is accepted.
pub fn parse_version(input: &str) -> Result<Version, ResolveError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::InvalidVersion {
            input: input.to_string(),
            reason: "version must not be empty".to_string(),
        });
    }
    Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed)).map_err(|e| {
        ResolveError::InvalidVersion {
            input: input.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Resolve `(version, platform)` to an archive.
///
/// `version = None` (or `"latest"`) selects the highest published version.
pub fn resolve(
    table: &ReleaseTable,
    version: Option<&str>,
    platform: PlatformKey,
) -> Result<ResolvedArtifact, ResolveError> {
    let channel = match version {
        None | Some("latest") => table.latest().ok_or(ResolveError::NoReleases)?,
        Some(v) => {
            let version = parse_version(v)?;
            table
                .channel(&version)
                .ok_or(ResolveError::UnknownVersion(version))?
        }
    };

    tracing::debug!("Resolving wxman {} for {}", channel.version, platform);

    match channel.get(platform) {
        Some(PlatformEntry::Artifact(artifact)) => Ok(ResolvedArtifact {
            version: channel.version.clone(),
            platform,
            artifact: artifact.clone(),
        }),
        Some(PlatformEntry::Unsupported { reason }) => {
            Err(UnsupportedPlatformError::Declared {
                platform,
                version: channel.version.clone(),
                reason: reason.clone(),
            }
            .into())
        }
        None => Err(UnsupportedPlatformError::NotInTable {
            platform,
            version: channel.version.clone(),
        }
        .into()),
    }
}

/// Resolve for the host this process runs on.
pub fn resolve_host(
    table: &ReleaseTable,
    version: Option<&str>,
) -> Result<ResolvedArtifact, ResolveError> {
    let platform = PlatformKey::current().map_err(UnsupportedPlatformError::from)?;
    resolve(table, version, platform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::releases;
    use wxman_schema::{Arch, Os};

    fn table() -> ReleaseTable {
        releases::builtin().unwrap()
    }

    #[test]
    fn supported_platforms_resolve_to_documented_archives() {
        let table = table();
        for (os, arch, suffix) in [
            (Os::Macos, Arch::Aarch64, "wxman-aarch64-apple-darwin.tar.gz"),
            (Os::Macos, Arch::X86_64, "wxman-x86_64-apple-darwin.tar.gz"),
            (Os::Linux, Arch::X86_64, "wxman-x86_64-unknown-linux-gnu.tar.gz"),
        ] {
            let resolved = resolve(&table, Some("0.1.3"), PlatformKey::new(os, arch)).unwrap();
            assert!(resolved.artifact.url.ends_with(suffix));
            assert_eq!(resolved.artifact.sha256.as_str().len(), 64);
            assert!(
                resolved
                    .artifact
                    .sha256
                    .as_str()
                    .chars()
                    .all(|c| c.is_ascii_hexdigit())
            );
        }
    }

    #[test]
    fn linux_aarch64_is_declared_unsupported() {
        let err = resolve(
            &table(),
            Some("0.1.3"),
            PlatformKey::new(Os::Linux, Arch::Aarch64),
        )
        .unwrap_err();

        match err {
            ResolveError::UnsupportedPlatform(UnsupportedPlatformError::Declared {
                reason, ..
            }) => assert!(reason.contains("aarch64")),
            other => panic!("expected declared-unsupported, got {other:?}"),
        }
    }

    #[test]
    fn missing_entry_is_a_distinct_error() {
        let err = resolve(
            &table(),
            Some("0.1.3"),
            PlatformKey::new(Os::Windows, Arch::X86_64),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnsupportedPlatform(UnsupportedPlatformError::NotInTable { .. })
        ));
        assert!(err.to_string().contains("no wxman 0.1.3 archive"));
    }

    #[test]
    fn latest_is_the_default() {
        let platform = PlatformKey::new(Os::Macos, Arch::X86_64);
        let implicit = resolve(&table(), None, platform).unwrap();
        let explicit = resolve(&table(), Some("latest"), platform).unwrap();
        assert_eq!(implicit, explicit);
    }

    #[test]
    fn version_errors() {
        let platform = PlatformKey::new(Os::Macos, Arch::X86_64);
        assert!(matches!(
            resolve(&table(), Some(""), platform),
            Err(ResolveError::InvalidVersion { .. })
        ));
        assert!(matches!(
            resolve(&table(), Some("9.9.9"), platform),
            Err(ResolveError::UnknownVersion(_))
        ));
        assert_eq!(
            resolve(&table(), Some("v0.1.3"), platform).unwrap().version,
            Version::new(0, 1, 3)
        );
    }
}
