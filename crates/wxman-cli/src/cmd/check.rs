//! Check command

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::style::Stylize;
use wxman_core::{Error, InstallResult, resolver, self_check};
use wxman_schema::BINARY_NAME;

use super::{bin_dir, load_table};

/// Run only the post-install self-check against an already installed binary.
pub fn check(
    releases: Option<&Path>,
    version: Option<&str>,
    bin_dir_arg: Option<&Path>,
    timeout: Duration,
) -> Result<()> {
    let expected = match version {
        None | Some("latest") => {
            let table = load_table(releases)?;
            super::channel(&table, None)?.version.clone()
        }
        Some(v) => resolver::parse_version(v).map_err(Error::from)?,
    };
    let binary_path = bin_dir(bin_dir_arg)?.join(BINARY_NAME);

    let report = self_check::self_check(&binary_path, &expected, timeout).map_err(|source| {
        Error::SelfCheck {
            installed: InstallResult {
                binary_path: binary_path.clone(),
                installed_version: expected.clone(),
            },
            source,
        }
    })?;

    println!(
        "{} {} reports {}",
        "✓".green(),
        report.binary_path.display(),
        report.output.trim()
    );
    Ok(())
}
