//! Commit creation through the system `git` binary, so the user's hooks and
//! signing config apply.

use std::path::Path;
use std::process::Command;

use crate::error::GitError;

/// Check that a `git` executable is on the PATH.
pub fn check_git_installed() -> Result<(), GitError> {
    which::which("git").map(|_| ()).map_err(|_| GitError::NotInstalled)
}

/// Create a commit in `workdir` with `message` from the currently staged changes.
pub fn commit(workdir: &Path, message: &str) -> Result<(), GitError> {
    run_git(workdir, &["commit", "-m", message])
}

/// Run a git command in `workdir`, mapping failures to [`GitError::CommitFailed`].
fn run_git(workdir: &Path, args: &[&str]) -> Result<(), GitError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(workdir)
        .args(args)
        .output()
        .map_err(GitError::SpawnFailed)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        // `git commit` reports "nothing to commit" on stdout.
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        return Err(GitError::CommitFailed(detail));
    }

    Ok(())
}
