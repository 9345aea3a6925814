//! Verify command

use std::path::Path;

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use wxman_core::io::verify::digest_file;
use wxman_core::{Error, IntegrityError, resolver};

use super::{load_table, target_platform};

/// Hash a local archive and compare it with the table's digest for
/// `(version, target)`.
pub fn verify(
    releases: Option<&Path>,
    file: &Path,
    version: Option<&str>,
    target: Option<&str>,
) -> Result<()> {
    let table = load_table(releases)?;
    let platform = target_platform(target)?;
    let resolved = resolver::resolve(&table, version, platform).map_err(Error::from)?;

    let actual = digest_file(file)
        .map_err(Error::Archive)
        .with_context(|| format!("failed to hash {}", file.display()))?;

    if !resolved.artifact.sha256.matches(actual.as_str()) {
        return Err(Error::from(IntegrityError {
            url: file.display().to_string(),
            expected: resolved.artifact.sha256,
            actual,
        })
        .into());
    }

    println!(
        "{} {} matches wxman {} for {}",
        "✓".green(),
        file.display(),
        resolved.version,
        resolved.platform.target_triple()
    );
    Ok(())
}
