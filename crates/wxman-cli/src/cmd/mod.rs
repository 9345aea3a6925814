//! Command implementations and the lookups they share.

pub mod check;
pub mod completions;
pub mod formula;
pub mod install;
pub mod resolve;
pub mod targets;
pub mod verify;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wxman_core::{Error, ResolveError, UnsupportedPlatformError, releases, resolver};
use wxman_schema::{PlatformKey, ReleaseChannel, ReleaseTable};

/// The built-in table, or the one at `path`.
pub fn load_table(path: Option<&Path>) -> Result<ReleaseTable> {
    releases::load(path).map_err(|e| Error::from(e).into())
}

/// `--target` if given, otherwise the host.
pub fn target_platform(target: Option<&str>) -> Result<PlatformKey> {
    match target {
        Some(target) => target
            .parse::<PlatformKey>()
            .with_context(|| format!("invalid --target '{target}'")),
        None => PlatformKey::current()
            .map_err(|e| Error::from(UnsupportedPlatformError::from(e)).into()),
    }
}

/// `--bin-dir` if given, otherwise the default install directory.
pub fn bin_dir(arg: Option<&Path>) -> Result<PathBuf> {
    arg.map(Path::to_path_buf)
        .or_else(wxman_core::try_bin_dir)
        .context("cannot determine an install directory, pass --bin-dir")
}

/// The channel for `version`, or the latest one.
pub fn channel<'a>(table: &'a ReleaseTable, version: Option<&str>) -> Result<&'a ReleaseChannel> {
    let found = match version {
        None | Some("latest") => table.latest().ok_or(ResolveError::NoReleases),
        Some(v) => resolver::parse_version(v).and_then(|version| {
            table
                .channel(&version)
                .ok_or(ResolveError::UnknownVersion(version))
        }),
    };
    found.map_err(|e| Error::from(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_lookup() {
        let table = load_table(None).unwrap();
        assert_eq!(channel(&table, None).unwrap().version.to_string(), "0.1.3");
        assert_eq!(
            channel(&table, Some("v0.1.3")).unwrap().version.to_string(),
            "0.1.3"
        );

        let err = channel(&table, Some("9.9.9")).unwrap_err();
        let core = err.downcast_ref::<Error>().unwrap();
        assert_eq!(core.exit_code(), 2);
    }

    #[test]
    fn test_explicit_target_parses_triples() {
        let key = target_platform(Some("aarch64-unknown-linux-gnu")).unwrap();
        assert_eq!(key.target_triple(), "aarch64-unknown-linux-gnu");
        assert!(target_platform(Some("sparc-sun-solaris")).is_err());
    }
}
