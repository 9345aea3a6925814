//! Shared types for the wxman distribution: platform keys, digests and the
//! release table that maps a platform to its prebuilt archive.

pub mod arch;
pub mod hash;
pub mod release;

// Re-exports
pub use arch::*;
pub use hash::*;
pub use release::*;

/// Name of the executable shipped inside every release archive.
pub const BINARY_NAME: &str = "wxman";

/// Flag the installed executable answers with its version string.
pub const VERSION_FLAG: &str = "--version";
