//! Version-control collaborator.
//!
//! The enumerator only considers files git knows about, so ignored and
//! untracked build artifacts never reach the checks even when physically
//! present. The listing is computed once per run and treated as
//! read-only afterwards.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to launch git: {source}")]
    Launch {
        #[source]
        source: std::io::Error,
    },
    #[error("git ls-files exited with {status}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    Failed {
        status: String,
        stdout: String,
        stderr: String,
    },
}

/// List the tracked files under `root` as absolute paths.
///
/// Uses NUL separation so paths containing newlines round-trip.
pub fn tracked_files(root: &Path) -> Result<HashSet<PathBuf>, VcsError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(["ls-files", "-z"])
        .output()
        .map_err(|source| VcsError::Launch { source })?;

    if !output.status.success() {
        return Err(VcsError::Failed {
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    Ok(listing
        .split('\0')
        .filter(|entry| !entry.is_empty())
        .map(|entry| root.join(entry))
        .collect())
}

/// Whether a git executable is available. Tests use this to skip
/// end-to-end runs on hosts without git.
pub fn available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}
