//! Resolve command

use std::path::Path;

use anyhow::Result;
use crossterm::style::Stylize;
use wxman_core::{Error, resolver};

use super::{load_table, target_platform};

/// Print the archive a version and platform resolve to. Touches neither the
/// network nor the filesystem beyond reading `--releases`.
pub fn resolve(
    releases: Option<&Path>,
    version: Option<&str>,
    target: Option<&str>,
    json: bool,
) -> Result<()> {
    let table = load_table(releases)?;
    let platform = target_platform(target)?;
    let resolved = resolver::resolve(&table, version, platform).map_err(Error::from)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    let lw = 10;
    println!(
        "  {} {}",
        "wxman".white().bold(),
        resolved.version.to_string().dark_grey()
    );
    println!("  {:<lw$}{}", "platform", resolved.platform);
    println!("  {:<lw$}{}", "target", resolved.platform.target_triple());
    println!("  {:<lw$}{}", "url", resolved.artifact.url);
    println!("  {:<lw$}{}", "sha256", resolved.artifact.sha256);
    Ok(())
}
