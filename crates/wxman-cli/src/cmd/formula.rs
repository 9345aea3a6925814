//! Formula command

use std::path::Path;

use anyhow::Result;
use wxman_core::formula::{FormulaMeta, render_formula};

use super::{channel, load_table};

/// Print the Homebrew formula for a release.
pub fn formula(releases: Option<&Path>, version: Option<&str>) -> Result<()> {
    let table = load_table(releases)?;
    let channel = channel(&table, version)?;
    print!("{}", render_formula(channel, &FormulaMeta::default()));
    Ok(())
}
