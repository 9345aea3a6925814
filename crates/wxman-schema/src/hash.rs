//! SHA256 digests as validated, lowercase hex strings.

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

/// Error returned when a string is not a well-formed SHA256 digest.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The hex portion is not 64 characters long.
    #[error("invalid SHA256 digest: expected 64 hex characters, got {len} in '{input}'")]
    Length {
        /// Length of the hex portion.
        len: usize,
        /// The rejected input.
        input: String,
    },

    /// The hex portion contains characters outside `[0-9a-fA-F]`.
    #[error("invalid SHA256 digest: contains non-hex characters in '{0}'")]
    NonHex(String),
}

/// A validated SHA256 digest (64 hex characters)
///
/// Published digests are the trust anchors for release archives, so this
/// newtype validates at construction and at deserialization time. The hex
/// is normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Create a new `Sha256Digest`, validating the input.
    ///
    /// Accepts strings with or without a `sha256:` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError`] if the hex portion is not exactly 64 ASCII hex characters.
    pub fn new(s: impl Into<String>) -> Result<Self, DigestError> {
        let s = s.into();
        let hex = s.strip_prefix("sha256:").unwrap_or(&s);

        if hex.len() != 64 {
            return Err(DigestError::Length {
                len: hex.len(),
                input: s.clone(),
            });
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DigestError::NonHex(s.clone()));
        }

        Ok(Self(hex.to_lowercase()))
    }

    /// Compute the SHA256 digest of an in-memory buffer.
    pub fn compute(data: &[u8]) -> Self {
        Self::from_hasher(Sha256::new_with_prefix(data))
    }

    /// Finish a streaming hasher into a digest.
    pub fn from_hasher(hasher: Sha256) -> Self {
        Self(hex::encode(hasher.finalize()))
    }

    /// Case-insensitive comparison against an arbitrary hex string.
    ///
    /// This is integrity checking of public artifacts, not secret comparison,
    /// so no constant-time guarantee is made.
    pub fn matches(&self, hex: &str) -> bool {
        let hex = hex.strip_prefix("sha256:").unwrap_or(hex);
        self.0.eq_ignore_ascii_case(hex)
    }

    /// Get the digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::str::FromStr for Sha256Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("hello world")
    const HELLO: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn compute_matches_known_vector() {
        assert_eq!(Sha256Digest::compute(b"hello world").as_str(), HELLO);
    }

    #[test]
    fn new_normalizes_case_and_prefix() {
        let upper = format!("sha256:{}", HELLO.to_uppercase());
        let digest = Sha256Digest::new(upper).unwrap();
        assert_eq!(digest.as_str(), HELLO);
    }

    #[test]
    fn matches_is_case_insensitive() {
        let digest = Sha256Digest::compute(b"hello world");
        assert!(digest.matches(&HELLO.to_uppercase()));
        assert!(!digest.matches(&HELLO[..63]));
    }

    #[test]
    fn rejects_malformed() {
        assert!(matches!(
            Sha256Digest::new("abc"),
            Err(DigestError::Length { len: 3, .. })
        ));
        let bad = "z".repeat(64);
        assert!(matches!(Sha256Digest::new(bad), Err(DigestError::NonHex(_))));
    }
}
