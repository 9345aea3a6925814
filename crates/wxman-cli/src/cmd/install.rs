//! Install command

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use wxman_core::{ArchiveSource, Error, HttpFetcher, InstallRequest, Installer, resolver};
use wxman_schema::BINARY_NAME;

use super::{bin_dir, load_table, target_platform};
use crate::InstallArgs;
use crate::ui::Output;

/// Resolve, fetch, verify, install and self-check wxman for this machine.
pub async fn install(
    releases: Option<&Path>,
    args: &InstallArgs,
    dry_run: bool,
    output: Arc<Output>,
) -> Result<()> {
    let table = load_table(releases)?;
    let platform = target_platform(None)?;
    let dest_dir = bin_dir(args.bin_dir.as_deref())?;
    let check_timeout = (!args.skip_check).then(|| Duration::from_secs(args.check_timeout));

    if dry_run {
        let resolved =
            resolver::resolve(&table, args.version.as_deref(), platform).map_err(Error::from)?;
        let lw = 10;
        println!(
            "{} wxman {} for {}",
            "Would install".bold(),
            resolved.version,
            resolved.platform
        );
        match &args.archive {
            Some(path) => println!("  {:<lw$}{}", "archive", path.display()),
            None => println!("  {:<lw$}{}", "url", resolved.artifact.url),
        }
        println!("  {:<lw$}{}", "sha256", resolved.artifact.sha256);
        println!("  {:<lw$}{}", "into", dest_dir.join(BINARY_NAME).display());
        match check_timeout {
            Some(t) => println!("  {:<lw$}{BINARY_NAME} --version within {t:?}", "check"),
            None => println!("  {:<lw$}skipped", "check"),
        }
        return Ok(());
    }

    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;
    let fetcher = HttpFetcher::new(client).with_reporter(output.clone());
    let installer = Installer::new(&table, &fetcher).with_reporter(output);

    let mut request = InstallRequest::new(platform, dest_dir).with_check_timeout(check_timeout);
    if let Some(version) = &args.version {
        request = request.with_version(version.clone());
    }
    if let Some(path) = &args.archive {
        request = request.with_source(ArchiveSource::Local(path.clone()));
    }

    let outcome = installer.run(&request).await?;
    if let Some(report) = &outcome.self_check {
        tracing::debug!("self-check output: {}", report.output.trim());
    }
    Ok(())
}
