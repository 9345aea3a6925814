//! wxman-install CLI

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wxman_cli::ui::Output;
use wxman_cli::{Cli, Commands, cmd};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Arc::new(Output::new(cli.quiet));

    if let Err(err) = run(cli, output.clone()).await {
        let core = err
            .chain()
            .find_map(|e| e.downcast_ref::<wxman_core::Error>());
        match core {
            Some(core) => {
                output.error(&core.to_string());
                std::process::exit(core.exit_code());
            }
            None => {
                output.error(&format!("{err:#}"));
                std::process::exit(1);
            }
        }
    }
}

async fn run(cli: Cli, output: Arc<Output>) -> Result<()> {
    let releases = cli.releases.as_deref();
    let dry_run = cli.dry_run;

    match cli.command {
        None => cmd::install::install(releases, &default_install(), dry_run, output).await,
        Some(Commands::Install(args)) => {
            cmd::install::install(releases, &args, dry_run, output).await
        }
        Some(Commands::Resolve {
            version,
            target,
            json,
        }) => cmd::resolve::resolve(releases, version.as_deref(), target.as_deref(), json),
        Some(Commands::Verify {
            file,
            version,
            target,
        }) => cmd::verify::verify(releases, &file, version.as_deref(), target.as_deref()),
        Some(Commands::Check {
            version,
            bin_dir,
            check_timeout,
        }) => cmd::check::check(
            releases,
            version.as_deref(),
            bin_dir.as_deref(),
            Duration::from_secs(check_timeout),
        ),
        Some(Commands::Formula { version }) => cmd::formula::formula(releases, version.as_deref()),
        Some(Commands::Targets) => cmd::targets::targets(releases),
        Some(Commands::Completions { shell }) => {
            cmd::completions::completions(shell, &mut std::io::stdout());
            Ok(())
        }
    }
}

/// `install` with nothing on the command line still honours the environment.
fn default_install() -> wxman_cli::InstallArgs {
    wxman_cli::InstallArgs {
        version: std::env::var("WXMAN_VERSION").ok(),
        bin_dir: std::env::var_os("WXMAN_BIN_DIR").map(Into::into),
        ..wxman_cli::InstallArgs::default()
    }
}
