//! Reporter that writes styled progress to stderr.
//!
//! Stdout is reserved for command results (`resolve`, `formula`, ...), so
//! everything the install pipeline reports goes to stderr. Download progress
//! redraws a single line and is only drawn when stderr is a terminal.

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::style::Stylize;
use semver::Version;
use wxman_core::Reporter;

use super::progress::format_download_progress;

#[derive(Debug)]
pub struct Output {
    quiet: bool,
    interactive: bool,
    progress_line: AtomicBool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            interactive: std::io::stderr().is_terminal(),
            progress_line: AtomicBool::new(false),
        }
    }

    /// Prints a success message.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            self.line(&format!("{} {msg}", "✓".green()));
        }
    }

    /// Prints an error. Never suppressed.
    pub fn error(&self, msg: &str) {
        self.line(&format!("{} {msg}", "error:".red().bold()));
    }

    fn line(&self, text: &str) {
        let mut stderr = std::io::stderr().lock();
        if self.progress_line.swap(false, Ordering::Relaxed) {
            let _ = writeln!(stderr);
        }
        let _ = writeln!(stderr, "{text}");
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        if !self.quiet {
            self.line(&format!("{}", title.bold()));
        }
    }

    fn downloading(&self, url: &str, current: u64, total: Option<u64>) {
        if self.quiet || !self.interactive {
            return;
        }
        let name = url.rsplit('/').next().unwrap_or(url);
        let mut stderr = std::io::stderr().lock();
        let _ = write!(
            stderr,
            "\r  {}  {}",
            name.dark_grey(),
            format_download_progress(current, total)
        );
        let _ = stderr.flush();
        self.progress_line.store(true, Ordering::Relaxed);
    }

    fn verified(&self, digest: &str) {
        if !self.quiet {
            self.line(&format!("  {} sha256 {}", "✓".green(), digest.dark_grey()));
        }
    }

    fn installing(&self, path: &Path) {
        if !self.quiet {
            self.line(&format!("  {}", path.display()));
        }
    }

    fn done(&self, version: &Version, detail: &str) {
        self.success(&format!(
            "wxman {} installed to {detail}",
            version.to_string().bold()
        ));
    }

    // The error itself is printed once by `main`; this only closes the run.
    fn failed(&self, version: Option<&Version>, reason: &str) {
        tracing::debug!("install failed: {reason}");
        if self.quiet {
            return;
        }
        let summary = match version {
            Some(v) => format!("wxman {v} is installed but failed its self-check"),
            None => "nothing installed".to_string(),
        };
        self.line(&format!("{} {summary}", "✗".red()));
    }

    fn info(&self, msg: &str) {
        if !self.quiet {
            self.line(&format!("  {}", msg.dark_grey()));
        }
    }

    fn warning(&self, msg: &str) {
        self.line(&format!("{} {msg}", "warning:".yellow().bold()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_output_is_silent() {
        let output = Output::new(true);
        output.section("Fetching");
        output.downloading("https://example.com/wxman.tar.gz", 10, Some(100));
        assert!(!output.progress_line.load(Ordering::Relaxed));
    }
}
