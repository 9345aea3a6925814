//! Extracting the executable and placing it atomically.
//!
//! The archive is a gzip-compressed tar with the executable at its top
//! level. Other entries are tolerated and ignored. The executable is written
//! to a temporary file inside the destination directory and renamed over
//! the final path, so an interrupted install leaves either the previous
//! binary or nothing at the destination, never a partial file.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use semver::Version;
use serde::Serialize;
use thiserror::Error;

use crate::io::verify::VerifiedArchive;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("invalid executable name '{0}': must be a single path component")]
    InvalidName(String),

    #[error("failed to read archive: {0}")]
    Archive(#[source] io::Error),

    #[error("archive does not contain '{0}' at its top level")]
    MissingExecutable(String),

    #[error("archive entry '{0}' is not a regular file")]
    NotAFile(String),

    #[error("archive entry '{name}' is truncated: expected {expected} bytes, wrote {written}")]
    Truncated {
        name: String,
        expected: u64,
        written: u64,
    },

    #[error("failed to create install directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to move executable into place at {path}: {source}")]
    Rename { path: PathBuf, source: io::Error },
}

/// Where the executable ended up, and which release it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallResult {
    pub binary_path: PathBuf,
    pub installed_version: Version,
}

/// Install `executable_name` from a verified archive into `dest_dir`.
///
/// Re-running for the same archive replaces the existing binary in place.
pub fn install(
    archive: &VerifiedArchive,
    executable_name: &str,
    dest_dir: &Path,
) -> Result<InstallResult, InstallError> {
    let mut writer = |reader: &mut dyn Read, tmp: &mut fs::File| io::copy(reader, tmp);
    install_with(archive, executable_name, dest_dir, &mut writer)
}

/// Copies an archive entry into the staging file, returning bytes written.
type EntryWriter<'a> = dyn FnMut(&mut dyn Read, &mut fs::File) -> io::Result<u64> + 'a;

fn install_with(
    archive: &VerifiedArchive,
    executable_name: &str,
    dest_dir: &Path,
    write_entry: &mut EntryWriter<'_>,
) -> Result<InstallResult, InstallError> {
    if !is_plain_name(executable_name) {
        return Err(InstallError::InvalidName(executable_name.to_string()));
    }

    fs::create_dir_all(dest_dir).map_err(|source| InstallError::CreateDir {
        path: dest_dir.to_path_buf(),
        source,
    })?;

    let binary_path = dest_dir.join(executable_name);
    let write_err = |source| InstallError::Write {
        path: binary_path.clone(),
        source,
    };

    let mut tar = tar::Archive::new(GzDecoder::new(archive.bytes()));
    let entries = tar.entries().map_err(InstallError::Archive)?;

    for entry in entries {
        let mut entry = entry.map_err(InstallError::Archive)?;
        let path = entry.path().map_err(InstallError::Archive)?.into_owned();
        if !is_top_level(&path, executable_name) {
            tracing::trace!("Skipping archive entry {}", path.display());
            continue;
        }

        let kind = entry.header().entry_type();
        if !kind.is_file() {
            return Err(InstallError::NotAFile(executable_name.to_string()));
        }
        let expected = entry.size();

        // Staged next to the destination so the final rename stays on one filesystem.
        let mut staged = tempfile::Builder::new()
            .prefix(&format!(".{executable_name}."))
            .suffix(".partial")
            .tempfile_in(dest_dir)
            .map_err(write_err)?;

        let written = write_entry(&mut entry, staged.as_file_mut()).map_err(write_err)?;
        if written != expected {
            return Err(InstallError::Truncated {
                name: executable_name.to_string(),
                expected,
                written,
            });
        }

        let file = staged.as_file_mut();
        file.flush().map_err(write_err)?;
        set_executable(file).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;

        staged
            .persist(&binary_path)
            .map_err(|e| InstallError::Rename {
                path: binary_path.clone(),
                source: e.error,
            })?;

        tracing::info!(
            "Installed {} {} to {}",
            executable_name,
            archive.version(),
            binary_path.display()
        );
        return Ok(InstallResult {
            binary_path,
            installed_version: archive.version().clone(),
        });
    }

    Err(InstallError::MissingExecutable(executable_name.to_string()))
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Matches `name` and `./name`, but nothing nested.
fn is_top_level(path: &Path, name: &str) -> bool {
    let mut normal = path.components().filter(|c| !matches!(c, Component::CurDir));
    matches!(
        (normal.next(), normal.next()),
        (Some(Component::Normal(first)), None) if first == name
    )
}

#[cfg(unix)]
fn set_executable(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::io::verify::verify;
    use crate::resolver::ResolvedArtifact;
    use bytes::Bytes;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use wxman_schema::{Arch, ArtifactRef, Os, PlatformKey, Sha256Digest};

    /// Build a `.tar.gz` from `(path, contents, mode)` entries.
    pub(crate) fn tar_gz(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, data, mode) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(*mode);
            header.set_entry_type(tar::EntryType::Regular);
            header.set_cksum();
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    pub(crate) fn verified(archive: Vec<u8>, version: &str) -> VerifiedArchive {
        let resolved = ResolvedArtifact {
            version: Version::parse(version).unwrap(),
            platform: PlatformKey::new(Os::Macos, Arch::Aarch64),
            artifact: ArtifactRef {
                url: format!(
                    "https://example.com/v{version}/wxman-aarch64-apple-darwin.tar.gz"
                ),
                sha256: Sha256Digest::compute(&archive),
            },
        };
        verify(Bytes::from(archive), &resolved).unwrap()
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn installs_only_the_named_executable() {
        let archive = verified(
            tar_gz(&[
                ("README.md", b"docs", 0o644),
                ("wxman", b"binary", 0o755),
                ("LICENSE", b"mit", 0o644),
            ]),
            "0.1.3",
        );
        let dest = tempfile::tempdir().unwrap();

        let result = install(&archive, "wxman", dest.path()).unwrap();
        assert_eq!(result.binary_path, dest.path().join("wxman"));
        assert_eq!(result.installed_version, Version::new(0, 1, 3));
        assert_eq!(fs::read(&result.binary_path).unwrap(), b"binary");
        assert_eq!(dir_entries(dest.path()), ["wxman"]);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&result.binary_path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn dot_slash_prefix_is_top_level() {
        let archive = verified(tar_gz(&[("./wxman", b"binary", 0o755)]), "0.1.3");
        let dest = tempfile::tempdir().unwrap();
        install(&archive, "wxman", dest.path()).unwrap();
        assert!(dest.path().join("wxman").exists());
    }

    #[test]
    fn nested_executable_is_not_installed() {
        let archive = verified(tar_gz(&[("bin/wxman", b"binary", 0o755)]), "0.1.3");
        let dest = tempfile::tempdir().unwrap();
        assert!(matches!(
            install(&archive, "wxman", dest.path()),
            Err(InstallError::MissingExecutable(_))
        ));
        assert!(dir_entries(dest.path()).is_empty());
    }

    #[test]
    fn reinstall_is_idempotent() {
        let archive = verified(tar_gz(&[("wxman", b"binary", 0o755)]), "0.1.3");
        let dest = tempfile::tempdir().unwrap();

        let first = install(&archive, "wxman", dest.path()).unwrap();
        let second = install(&archive, "wxman", dest.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(dir_entries(dest.path()), ["wxman"]);
    }

    #[test]
    fn upgrade_overwrites_previous_binary() {
        let dest = tempfile::tempdir().unwrap();
        let old = verified(tar_gz(&[("wxman", b"old", 0o755)]), "0.1.2");
        let new = verified(tar_gz(&[("wxman", b"new", 0o755)]), "0.1.3");

        install(&old, "wxman", dest.path()).unwrap();
        let result = install(&new, "wxman", dest.path()).unwrap();
        assert_eq!(fs::read(result.binary_path).unwrap(), b"new");
        assert_eq!(dir_entries(dest.path()), ["wxman"]);
    }

    #[test]
    fn failure_mid_write_keeps_previous_binary() {
        let dest = tempfile::tempdir().unwrap();
        let old = verified(tar_gz(&[("wxman", b"old binary", 0o755)]), "0.1.2");
        install(&old, "wxman", dest.path()).unwrap();

        let new = verified(tar_gz(&[("wxman", b"new binary contents", 0o755)]), "0.1.3");
        let mut fail_halfway = |reader: &mut dyn Read, tmp: &mut fs::File| -> io::Result<u64> {
            let mut half = vec![0u8; 5];
            reader.read_exact(&mut half)?;
            tmp.write_all(&half)?;
            Err(io::Error::other("disk yanked"))
        };

        let err = install_with(&new, "wxman", dest.path(), &mut fail_halfway).unwrap_err();
        assert!(matches!(err, InstallError::Write { .. }));
        assert_eq!(fs::read(dest.path().join("wxman")).unwrap(), b"old binary");
        assert_eq!(dir_entries(dest.path()), ["wxman"]);
    }

    #[test]
    fn failure_on_first_install_leaves_nothing() {
        let dest = tempfile::tempdir().unwrap();
        let archive = verified(tar_gz(&[("wxman", b"binary", 0o755)]), "0.1.3");
        let mut short_write = |reader: &mut dyn Read, tmp: &mut fs::File| -> io::Result<u64> {
            let mut byte = [0u8; 1];
            reader.read_exact(&mut byte)?;
            tmp.write_all(&byte)?;
            Ok(1)
        };

        let err = install_with(&archive, "wxman", dest.path(), &mut short_write).unwrap_err();
        assert!(matches!(
            err,
            InstallError::Truncated {
                expected: 6,
                written: 1,
                ..
            }
        ));
        assert!(dir_entries(dest.path()).is_empty());
    }

    #[test]
    fn rejects_path_like_names() {
        let archive = verified(tar_gz(&[("wxman", b"binary", 0o755)]), "0.1.3");
        let dest = tempfile::tempdir().unwrap();
        for name in ["../wxman", "bin/wxman", "", "."] {
            assert!(matches!(
                install(&archive, name, dest.path()),
                Err(InstallError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn corrupt_gzip_is_an_archive_error() {
        let archive = verified(b"not gzip at all".to_vec(), "0.1.3");
        let dest = tempfile::tempdir().unwrap();
        assert!(matches!(
            install(&archive, "wxman", dest.path()),
            Err(InstallError::Archive(_))
        ));
    }
}
