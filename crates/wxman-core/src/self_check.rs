//! Post-install self-check: the installed binary must report the version
//! that was resolved for it.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;

use semver::Version;
use thiserror::Error;
use wait_timeout::ChildExt;
use wxman_schema::VERSION_FLAG;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum SelfCheckError {
    #[error("failed to run {path} --version: {source}")]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} --version did not exit within {timeout:?}")]
    TimedOut { path: PathBuf, timeout: Duration },

    #[error("{path} --version exited with {status}")]
    Failed { path: PathBuf, status: ExitStatus },

    #[error("installed binary reports '{output}', expected version {expected}")]
    VersionMismatch { expected: Version, output: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfCheckReport {
    pub binary_path: PathBuf,
    pub output: String,
}

/// Run `binary --version` and require `expected` among its output tokens.
pub fn self_check(
    binary: &Path,
    expected: &Version,
    timeout: Duration,
) -> Result<SelfCheckReport, SelfCheckError> {
    let spawn_err = |source| SelfCheckError::Spawn {
        path: binary.to_path_buf(),
        source,
    };

    let mut child = spawn(binary).map_err(spawn_err)?;

    // Read stdout while waiting: the child blocks once the pipe is full.
    let reader = child.stdout.take().map(|mut stdout| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        })
    });

    let Some(status) = child.wait_timeout(timeout).map_err(spawn_err)? else {
        child.kill().ok();
        child.wait().ok();
        return Err(SelfCheckError::TimedOut {
            path: binary.to_path_buf(),
            timeout,
        });
    };

    let stdout = match reader {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("stdout reader panicked")))
            .map_err(spawn_err)?,
        None => Vec::new(),
    };
    let output = String::from_utf8_lossy(&stdout).trim().to_string();

    if !status.success() {
        return Err(SelfCheckError::Failed {
            path: binary.to_path_buf(),
            status,
        });
    }

    if !reports_version(&output, expected) {
        return Err(SelfCheckError::VersionMismatch {
            expected: expected.clone(),
            output,
        });
    }

    tracing::debug!("Self-check passed: {output}");
    Ok(SelfCheckReport {
        binary_path: binary.to_path_buf(),
        output,
    })
}

/// Whole-token match so `0.1.3` is not satisfied by `0.1.30`.
fn reports_version(output: &str, expected: &Version) -> bool {
    let expected = expected.to_string();
    output
        .split_whitespace()
        .map(|token| token.strip_prefix('v').unwrap_or(token))
        .any(|token| token == expected)
}

fn spawn(binary: &Path) -> std::io::Result<Child> {
    let mut attempts = 0;
    loop {
        let result = Command::new(binary)
            .arg(VERSION_FLAG)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn();

        // A freshly renamed executable can briefly be busy while another
        // thread's fork still holds the staging descriptor.
        match result {
            Err(e) if is_text_busy(&e) && attempts < 5 => {
                attempts += 1;
                std::thread::sleep(Duration::from_millis(50));
            }
            other => return other,
        }
    }
}

#[cfg(unix)]
fn is_text_busy(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(libc::ETXTBSY)
}

#[cfg(not(unix))]
fn is_text_busy(_: &std::io::Error) -> bool {
    false
}
