//! wxman-install
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
//!
//! Installs the prebuilt `wxman` terminal app for the host platform.
//!
//! # Overview
//!
//! The release table (built in, or `--releases`) maps every published
//! version and platform to one `.tar.gz` archive and its SHA256 digest.
//! A run resolves the host to its archive, downloads it, refuses it unless
//! the digest matches, atomically replaces `<bin-dir>/wxman` and finally asks
//! the new binary for its version.
//!
//! Platforms the release declares unsupported fail before any network
//! traffic, with the declared reason.

pub mod cmd;
pub mod ui;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use wxman_core::self_check::DEFAULT_TIMEOUT;

#[derive(Debug, Parser)]
#[command(name = "wxman-install")]
#[command(author, version, about = "Fetch, verify and install prebuilt wxman binaries")]
pub struct Cli {
    /// Release table to use instead of the built-in one
    #[arg(long, global = true, env = "WXMAN_RELEASES")]
    pub releases: Option<PathBuf>,

    /// Show what would happen without downloading or writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Defaults to `install`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download, verify and install wxman for this machine
    Install(InstallArgs),
    /// Show which archive a version and platform resolve to
    Resolve {
        /// Version to resolve (default: latest)
        #[arg(long, env = "WXMAN_VERSION")]
        version: Option<String>,
        /// Target triple or os/arch (default: this machine)
        #[arg(long)]
        target: Option<String>,
        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a downloaded archive against the release table
    Verify {
        /// Archive to hash
        file: PathBuf,
        /// Version the archive claims to be (default: latest)
        #[arg(long, env = "WXMAN_VERSION")]
        version: Option<String>,
        /// Target triple or os/arch (default: this machine)
        #[arg(long)]
        target: Option<String>,
    },
    /// Run the post-install self-check against an installed binary
    Check {
        /// Expected version (default: latest)
        #[arg(long, env = "WXMAN_VERSION")]
        version: Option<String>,
        /// Directory containing the wxman binary
        #[arg(long, env = "WXMAN_BIN_DIR")]
        bin_dir: Option<PathBuf>,
        /// Seconds to wait for `wxman --version`
        #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
        check_timeout: u64,
    },
    /// Print the Homebrew formula for a release
    Formula {
        /// Release to render (default: latest)
        #[arg(long, env = "WXMAN_VERSION")]
        version: Option<String>,
    },
    /// List every release and platform with its status
    Targets,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Args)]
pub struct InstallArgs {
    /// Version to install (default: latest)
    #[arg(long, env = "WXMAN_VERSION")]
    pub version: Option<String>,

    /// Directory to install the wxman binary into
    #[arg(long, env = "WXMAN_BIN_DIR")]
    pub bin_dir: Option<PathBuf>,

    /// Install from an already-downloaded archive instead of fetching it
    #[arg(long, value_name = "FILE")]
    pub archive: Option<PathBuf>,

    /// Seconds to wait for `wxman --version` after installing
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub check_timeout: u64,

    /// Do not run the installed binary after installing
    #[arg(long)]
    pub skip_check: bool,
}

impl Default for InstallArgs {
    fn default() -> Self {
        Self {
            version: None,
            bin_dir: None,
            archive: None,
            check_timeout: DEFAULT_TIMEOUT.as_secs(),
            skip_check: false,
        }
    }
}
