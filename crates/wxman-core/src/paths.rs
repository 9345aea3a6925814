use dirs::{executable_dir, home_dir};
use std::path::PathBuf;

/// Returns the directory the executable should be installed into, or None if
/// no candidate can be determined.
///
/// Order: `WXMAN_BIN_DIR`, `$HOMEBREW_PREFIX/bin`, the platform executable
/// directory, `~/.local/bin`.
pub fn try_bin_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("WXMAN_BIN_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Some(prefix) = std::env::var_os("HOMEBREW_PREFIX") {
        return Some(PathBuf::from(prefix).join("bin"));
    }
    executable_dir().or_else(|| home_dir().map(|h| h.join(".local").join("bin")))
}

