//! Release channels: the versioned platform-to-artifact table.
//!
//! Each published version gets one [`ReleaseChannel`]. Channels are
//! append-only: once a digest is published it is a trust anchor for every
//! user pinned to that version, so loading rejects a table that lists the
//! same version twice instead of letting the later entry win.

use std::collections::BTreeMap;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::{BINARY_NAME, PlatformKey, PlatformParseError, Sha256Digest};

/// File name of the release archive for a platform: `wxman-<triple>.tar.gz`.
pub fn archive_name(key: PlatformKey) -> String {
    format!("{BINARY_NAME}-{}.tar.gz", key.target_triple())
}

/// Location and expected digest of one release archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Download URL. Always embeds the release version.
    pub url: String,
    /// Expected SHA256 of the bytes served at `url`.
    pub sha256: Sha256Digest,
}

impl ArtifactRef {
    /// File name component of the URL.
    pub fn file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or("")
    }
}

/// What a channel says about one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PlatformEntry {
    /// A prebuilt archive exists.
    Artifact(ArtifactRef),
    /// The platform is deliberately not built; `reason` is shown to the user.
    Unsupported {
        /// Human-readable explanation.
        reason: String,
    },
}

/// Errors raised while assembling a release table.
#[derive(thiserror::Error, Debug)]
pub enum ReleaseError {
    /// A release version is not valid semver.
    #[error("invalid release version '{version}': {source}")]
    Version {
        /// The rejected string.
        version: String,
        /// Parser error.
        source: semver::Error,
    },

    /// A target triple is not recognized.
    #[error(transparent)]
    Target(#[from] PlatformParseError),

    /// The same version appears twice.
    #[error("release {0} is listed more than once")]
    DuplicateVersion(Version),

    /// The same platform appears twice inside one release.
    #[error("release {version} lists {platform} more than once")]
    DuplicatePlatform {
        /// Release version.
        version: Version,
        /// Repeated platform.
        platform: PlatformKey,
    },

    /// An artifact URL breaks the naming convention.
    #[error("release {version} {platform}: {reason} (url: {url})")]
    BadUrl {
        /// Release version.
        version: Version,
        /// Platform of the entry.
        platform: PlatformKey,
        /// Offending URL.
        url: String,
        /// Which rule was broken.
        reason: &'static str,
    },
}

/// All platform entries for one published version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseChannel {
    /// Release version.
    pub version: Version,
    entries: BTreeMap<PlatformKey, PlatformEntry>,
}

impl ReleaseChannel {
    /// Create an empty channel.
    pub fn new(version: Version) -> Self {
        Self {
            version,
            entries: BTreeMap::new(),
        }
    }

    /// Add a downloadable artifact for `platform`.
    ///
    /// # Errors
    ///
    /// Rejects a duplicate platform, a non-http(s) URL, a URL that does not
    /// embed the version as a path segment (`v0.1.3` or
    /// `0.1.3`), or a URL whose file name is not
    /// [`archive_name(platform)`](archive_name).
    pub fn add_artifact(
        &mut self,
        platform: PlatformKey,
        artifact: ArtifactRef,
    ) -> Result<(), ReleaseError> {
        let bad = |reason| ReleaseError::BadUrl {
            version: self.version.clone(),
            platform,
            url: artifact.url.clone(),
            reason,
        };

        if !(artifact.url.starts_with("https://") || artifact.url.starts_with("http://")) {
            return Err(bad("must start with http(s)://"));
        }
        let version = self.version.to_string();
        let embeds_version = artifact
            .url
            .split('/')
            .any(|segment| segment.strip_prefix('v').unwrap_or(segment) == version);
        if !embeds_version {
            return Err(bad("must embed the release version"));
        }
        if artifact.file_name() != archive_name(platform) {
            return Err(bad("file name does not follow wxman-<triple>.tar.gz"));
        }

        self.insert(platform, PlatformEntry::Artifact(artifact))
    }

    /// Declare `platform` as deliberately unsupported.
    ///
    /// # Errors
    ///
    /// Rejects a duplicate platform.
    pub fn add_unsupported(
        &mut self,
        platform: PlatformKey,
        reason: impl Into<String>,
    ) -> Result<(), ReleaseError> {
        self.insert(
            platform,
            PlatformEntry::Unsupported {
                reason: reason.into(),
            },
        )
    }

    fn insert(&mut self, platform: PlatformKey, entry: PlatformEntry) -> Result<(), ReleaseError> {
        if self.entries.contains_key(&platform) {
            return Err(ReleaseError::DuplicatePlatform {
                version: self.version.clone(),
                platform,
            });
        }
        self.entries.insert(platform, entry);
        Ok(())
    }

    /// Entry for `platform`, if the channel mentions it at all.
    pub fn get(&self, platform: PlatformKey) -> Option<&PlatformEntry> {
        self.entries.get(&platform)
    }

    /// All entries in platform order.
    pub fn entries(&self) -> impl Iterator<Item = (PlatformKey, &PlatformEntry)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

/// Every published channel, in the order they were appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseTable {
    channels: Vec<ReleaseChannel>,
}

impl ReleaseTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a channel.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::DuplicateVersion`] if the version is already present.
    pub fn push(&mut self, channel: ReleaseChannel) -> Result<(), ReleaseError> {
        if self.channel(&channel.version).is_some() {
            return Err(ReleaseError::DuplicateVersion(channel.version));
        }
        self.channels.push(channel);
        Ok(())
    }

    /// Channel for an exact version.
    pub fn channel(&self, version: &Version) -> Option<&ReleaseChannel> {
        self.channels.iter().find(|c| &c.version == version)
    }

    /// Channel with the highest version.
    pub fn latest(&self) -> Option<&ReleaseChannel> {
        self.channels.iter().max_by(|a, b| a.version.cmp(&b.version))
    }

    /// Iterate channels in insertion order.
    pub fn channels(&self) -> impl Iterator<Item = &ReleaseChannel> {
        self.channels.iter()
    }

    /// Whether the table has no channels.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arch, Os};

    const MAC_ARM: PlatformKey = PlatformKey::new(Os::Macos, Arch::Aarch64);

    fn artifact(url: &str) -> ArtifactRef {
        ArtifactRef {
            url: url.to_string(),
            sha256: Sha256Digest::compute(url.as_bytes()),
        }
    }

    #[test]
    fn archive_names_follow_convention() {
        assert_eq!(archive_name(MAC_ARM), "wxman-aarch64-apple-darwin.tar.gz");
        assert_eq!(
            archive_name(PlatformKey::new(Os::Linux, Arch::X86_64)),
            "wxman-x86_64-unknown-linux-gnu.tar.gz"
        );
    }

    #[test]
    fn rejects_url_without_version() {
        let mut channel = ReleaseChannel::new(Version::new(0, 1, 3));
        let err = channel
            .add_artifact(
                MAC_ARM,
                artifact("https://example.com/latest/wxman-aarch64-apple-darwin.tar.gz"),
            )
            .unwrap_err();
        assert!(err.to_string().contains("embed the release version"));
    }

    #[test]
    fn version_must_be_a_whole_path_segment() {
        let mut channel = ReleaseChannel::new(Version::new(0, 1, 3));
        let err = channel
            .add_artifact(
                MAC_ARM,
                artifact("https://example.com/v0.1.30/wxman-aarch64-apple-darwin.tar.gz"),
            )
            .unwrap_err();
        assert!(err.to_string().contains("embed the release version"));

        channel
            .add_artifact(
                MAC_ARM,
                artifact("https://example.com/0.1.3/wxman-aarch64-apple-darwin.tar.gz"),
            )
            .unwrap();
    }

    #[test]
    fn rejects_mismatched_file_name() {
        let mut channel = ReleaseChannel::new(Version::new(0, 1, 3));
        let err = channel
            .add_artifact(
                MAC_ARM,
                artifact("https://example.com/v0.1.3/wxman-x86_64-apple-darwin.tar.gz"),
            )
            .unwrap_err();
        assert!(matches!(err, ReleaseError::BadUrl { .. }));
    }

    #[test]
    fn rejects_duplicate_platform_and_version() {
        let url = "https://example.com/v0.1.3/wxman-aarch64-apple-darwin.tar.gz";
        let mut channel = ReleaseChannel::new(Version::new(0, 1, 3));
        channel.add_artifact(MAC_ARM, artifact(url)).unwrap();
        assert!(matches!(
            channel.add_unsupported(MAC_ARM, "nope"),
            Err(ReleaseError::DuplicatePlatform { .. })
        ));

        let mut table = ReleaseTable::new();
        table.push(channel.clone()).unwrap();
        assert!(matches!(
            table.push(channel),
            Err(ReleaseError::DuplicateVersion(_))
        ));
    }

    #[test]
    fn latest_uses_semver_order() {
        let mut table = ReleaseTable::new();
        for v in ["0.1.10", "0.1.9", "0.1.2"] {
            table
                .push(ReleaseChannel::new(Version::parse(v).unwrap()))
                .unwrap();
        }
        assert_eq!(
            table.latest().unwrap().version,
            Version::parse("0.1.10").unwrap()
        );
    }
}
