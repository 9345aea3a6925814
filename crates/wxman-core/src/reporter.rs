//! Reporter trait for dependency injection
//!
//! This trait allows the install pipeline to report progress and status
//! without being coupled to a specific terminal implementation.

use std::path::Path;

use semver::Version;

pub trait Reporter: Send + Sync {
    /// Indicates a new phase has started (e.g. "Fetching", "Installing").
    fn section(&self, title: &str);

    /// Updates the progress of a download.
    fn downloading(&self, url: &str, current: u64, total: Option<u64>);

    /// The archive digest matched the table.
    fn verified(&self, digest: &str);

    /// The executable is being written to `path`.
    fn installing(&self, path: &Path);

    /// Marks the run as successfully completed.
    fn done(&self, version: &Version, detail: &str);

    /// Marks the run as failed with a specific reason.
    fn failed(&self, version: Option<&Version>, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn downloading(&self, url: &str, current: u64, total: Option<u64>) {
        (**self).downloading(url, current, total);
    }
    fn verified(&self, digest: &str) {
        (**self).verified(digest);
    }
    fn installing(&self, path: &Path) {
        (**self).installing(path);
    }
    fn done(&self, version: &Version, detail: &str) {
        (**self).done(version, detail);
    }
    fn failed(&self, version: Option<&Version>, reason: &str) {
        (**self).failed(version, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
}

/// A no-op reporter for silent operations (e.g., verification, testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn downloading(&self, _: &str, _: u64, _: Option<u64>) {}
    fn verified(&self, _: &str) {}
    fn installing(&self, _: &Path) {}
    fn done(&self, _: &Version, _: &str) {}
    fn failed(&self, _: Option<&Version>, _: &str) {}
    fn info(&self, _: &str) {}
    fn warning(&self, _: &str) {}
}
