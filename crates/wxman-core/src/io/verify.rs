//! Digest verification.
//!
//! [`VerifiedArchive`] can only be built by [`verify`] or [`verify_file`], so
//! the installer cannot be handed bytes that skipped the digest check.

use std::io::Read;
use std::path::Path;

use bytes::Bytes;
use semver::Version;
use sha2::{Digest, Sha256};
use thiserror::Error;
use wxman_schema::{PlatformKey, Sha256Digest};

use crate::resolver::ResolvedArtifact;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("integrity check failed for {url}: expected sha256 {expected}, got {actual}")]
pub struct IntegrityError {
    pub url: String,
    pub expected: Sha256Digest,
    pub actual: Sha256Digest,
}

/// Archive bytes whose digest matched the release table.
#[derive(Debug, Clone)]
pub struct VerifiedArchive {
    bytes: Bytes,
    digest: Sha256Digest,
    version: Version,
    platform: PlatformKey,
}

impl VerifiedArchive {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn digest(&self) -> &Sha256Digest {
        &self.digest
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn platform(&self) -> PlatformKey {
        self.platform
    }
}

/// Hash the complete buffer and compare it to the resolved digest.
pub fn verify(
    bytes: Bytes,
    resolved: &ResolvedArtifact,
) -> Result<VerifiedArchive, IntegrityError> {
    let actual = Sha256Digest::compute(&bytes);
    check(actual, resolved)?;
    Ok(VerifiedArchive {
        bytes,
        digest: resolved.artifact.sha256.clone(),
        version: resolved.version.clone(),
        platform: resolved.platform,
    })
}

/// Verify an archive already on disk (e.g. fetched by the host package manager).
pub fn verify_file(
    path: &Path,
    resolved: &ResolvedArtifact,
) -> Result<VerifiedArchive, VerifyFileError> {
    let bytes = std::fs::read(path)?;
    Ok(verify(Bytes::from(bytes), resolved)?)
}

/// Streamed SHA256 of a file.
pub fn digest_file(path: &Path) -> std::io::Result<Sha256Digest> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let count = file.read(&mut buffer)?;
        if count == 0 {
            break;
        }
        hasher.update(&buffer[..count]);
    }
    Ok(Sha256Digest::from_hasher(hasher))
}

fn check(actual: Sha256Digest, resolved: &ResolvedArtifact) -> Result<(), IntegrityError> {
    let expected = &resolved.artifact.sha256;
    if expected.matches(actual.as_str()) {
        tracing::debug!("sha256 {actual} verified for {}", resolved.artifact.url);
        Ok(())
    } else {
        Err(IntegrityError {
            url: resolved.artifact.url.clone(),
            expected: expected.clone(),
            actual,
        })
    }
}

#[derive(Error, Debug)]
pub enum VerifyFileError {
    #[error("failed to read archive: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use wxman_schema::{Arch, ArtifactRef, Os};

    fn resolved_for(data: &[u8]) -> ResolvedArtifact {
        ResolvedArtifact {
            version: Version::new(0, 1, 3),
            platform: PlatformKey::new(Os::Macos, Arch::Aarch64),
            artifact: ArtifactRef {
                url: "https://example.com/v0.1.3/wxman-aarch64-apple-darwin.tar.gz".into(),
                sha256: Sha256Digest::compute(data),
            },
        }
    }

    #[test]
    fn matching_digest_verifies() {
        let data = b"a perfectly good archive".to_vec();
        let resolved = resolved_for(&data);
        let archive = verify(Bytes::from(data.clone()), &resolved).unwrap();
        assert_eq!(archive.bytes(), &data[..]);
        assert_eq!(archive.version(), &Version::new(0, 1, 3));
    }

    #[test]
    fn single_flipped_byte_fails() {
        let data = b"a perfectly good archive".to_vec();
        let resolved = resolved_for(&data);

        for i in 0..data.len() {
            let mut corrupt = data.clone();
            corrupt[i] ^= 0x01;
            let err = verify(Bytes::from(corrupt), &resolved).unwrap_err();
            assert_eq!(err.expected, resolved.artifact.sha256);
        }
    }

    #[test]
    fn truncated_buffer_fails() {
        let data = b"a perfectly good archive".to_vec();
        let resolved = resolved_for(&data);
        let partial = Bytes::copy_from_slice(&data[..data.len() - 1]);
        assert!(verify(partial, &resolved).is_err());
    }

    #[test]
    fn verify_file_streams_and_checks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wxman-aarch64-apple-darwin.tar.gz");
        std::fs::write(&path, b"on disk").unwrap();

        let good = resolved_for(b"on disk");
        assert!(verify_file(&path, &good).is_ok());

        let bad = resolved_for(b"something else");
        assert!(matches!(
            verify_file(&path, &bad),
            Err(VerifyFileError::Integrity(_))
        ));
    }
}
