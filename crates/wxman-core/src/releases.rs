//! Loading the release table from TOML.
//!
//! The built-in table ships inside the binary; an external file with the
//! same shape can replace it (`--releases` / `WXMAN_RELEASES`).

use std::path::Path;

use semver::Version;
use serde::Deserialize;
use thiserror::Error;
use wxman_schema::{
    ArtifactRef, PlatformKey, ReleaseChannel, ReleaseError, ReleaseTable, Sha256Digest,
};

/// Release table compiled into the binary.
pub const BUILTIN_RELEASES: &str = include_str!("../releases.toml");

#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to read release table {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse release table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] ReleaseError),

    #[error("release table is empty")]
    Empty,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    #[serde(default)]
    release: Vec<RawRelease>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRelease {
    version: String,
    #[serde(default)]
    artifact: Vec<RawArtifact>,
    #[serde(default)]
    unsupported: Vec<RawUnsupported>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArtifact {
    target: String,
    url: String,
    sha256: Sha256Digest,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUnsupported {
    target: String,
    reason: String,
}

/// Parse and validate a release table.
pub fn parse(source: &str) -> Result<ReleaseTable, TableError> {
    let raw: RawTable = toml::from_str(source)?;
    let mut table = ReleaseTable::new();

    for release in raw.release {
        let version =
            Version::parse(&release.version).map_err(|source| ReleaseError::Version {
                version: release.version.clone(),
                source,
            })?;
        let mut channel = ReleaseChannel::new(version);

        for artifact in release.artifact {
            let platform =
                PlatformKey::from_triple(&artifact.target).map_err(ReleaseError::from)?;
            channel.add_artifact(
                platform,
                ArtifactRef {
                    url: artifact.url,
                    sha256: artifact.sha256,
                },
            )?;
        }
        for unsupported in release.unsupported {
            let platform =
                PlatformKey::from_triple(&unsupported.target).map_err(ReleaseError::from)?;
            channel.add_unsupported(platform, unsupported.reason)?;
        }

        table.push(channel)?;
    }

    if table.is_empty() {
        return Err(TableError::Empty);
    }
    Ok(table)
}

/// The table compiled into this binary.
pub fn builtin() -> Result<ReleaseTable, TableError> {
    parse(BUILTIN_RELEASES)
}

/// Load an external table, or the built-in one when `path` is `None`.
pub fn load(path: Option<&Path>) -> Result<ReleaseTable, TableError> {
    let Some(path) = path else {
        return builtin();
    };
    tracing::debug!("Loading release table from {}", path.display());
    let source = std::fs::read_to_string(path).map_err(|source| TableError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse(&source)
}
