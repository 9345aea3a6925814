//! Host platform identification.
//!
//! A [`PlatformKey`] pairs an [`Os`] with an [`Arch`] and is the lookup key
//! into a [`ReleaseChannel`](crate::ReleaseChannel). Keys are derived from
//! host introspection once per run and never persisted.
//!
//! # Example
//!
//! ```
//! use wxman_schema::{Arch, Os, PlatformKey};
//!
//! let key = PlatformKey::new(Os::Macos, Arch::Aarch64);
//! assert_eq!(key.target_triple(), "aarch64-apple-darwin");
//! ```

use serde::{Deserialize, Serialize};

/// Operating system family a release archive is built for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Apple macOS.
    Macos,
    /// GNU/Linux.
    Linux,
    /// Microsoft Windows. Recognized so it can be rejected by name.
    Windows,
}

impl Os {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Macos => "macos",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Os {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "macos" | "darwin" | "osx" => Ok(Self::Macos),
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            _ => Err(PlatformParseError::Os(s.to_string())),
        }
    }
}

/// CPU architecture a release archive is built for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// Intel/AMD 64-bit.
    X86_64,
    /// ARM 64-bit (Apple Silicon, Graviton, ...).
    Aarch64,
}

impl Arch {
    /// Rust-convention architecture name, as used in target triples.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Arch {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Ok(Self::X86_64),
            "aarch64" | "arm64" => Ok(Self::Aarch64),
            _ => Err(PlatformParseError::Arch(s.to_string())),
        }
    }
}

/// Errors produced when a platform name cannot be mapped onto the known enums.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformParseError {
    /// The operating system name is not one of the known families.
    #[error("unrecognized operating system: {0}")]
    Os(String),

    /// The CPU architecture name is not one of the known architectures.
    #[error("unrecognized CPU architecture: {0}")]
    Arch(String),

    /// The string is not one of the known target triples.
    #[error("unrecognized target triple: {0}")]
    Triple(String),
}

/// The `(OS, CPU architecture)` pair identifying which artifact a host needs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlatformKey {
    /// Operating system family.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

const TRIPLES: [(PlatformKey, &str); 6] = [
    (PlatformKey::new(Os::Macos, Arch::Aarch64), "aarch64-apple-darwin"),
    (PlatformKey::new(Os::Macos, Arch::X86_64), "x86_64-apple-darwin"),
    (PlatformKey::new(Os::Linux, Arch::X86_64), "x86_64-unknown-linux-gnu"),
    (PlatformKey::new(Os::Linux, Arch::Aarch64), "aarch64-unknown-linux-gnu"),
    (PlatformKey::new(Os::Windows, Arch::X86_64), "x86_64-pc-windows-msvc"),
    (PlatformKey::new(Os::Windows, Arch::Aarch64), "aarch64-pc-windows-msvc"),
];

impl PlatformKey {
    /// Build a key from its parts.
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Map raw `std::env::consts`-style names onto a key.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformParseError`] if either name is not recognized.
    pub fn from_names(os: &str, arch: &str) -> Result<Self, PlatformParseError> {
        Ok(Self::new(os.parse()?, arch.parse()?))
    }

    /// Introspect the host this process was compiled for.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformParseError`] on hosts outside the known OS/CPU sets
    /// (e.g. FreeBSD or riscv64).
    pub fn current() -> Result<Self, PlatformParseError> {
        Self::from_names(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Rust target triple for this key.
    pub fn target_triple(&self) -> &'static str {
        TRIPLES
            .iter()
            .find(|(key, _)| key == self)
            .map_or("unknown", |(_, triple)| triple)
    }

    /// Parse a target triple back into a key.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformParseError::Triple`] for triples outside the known set.
    pub fn from_triple(triple: &str) -> Result<Self, PlatformParseError> {
        TRIPLES
            .iter()
            .find(|(_, t)| *t == triple)
            .map(|(key, _)| *key)
            .ok_or_else(|| PlatformParseError::Triple(triple.to_string()))
    }
}

impl std::fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

impl std::str::FromStr for PlatformKey {
    type Err = PlatformParseError;

    /// Accepts either a target triple or `os/arch`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((os, arch)) => Self::from_names(os, arch),
            None => Self::from_triple(s),
        }
    }
}
