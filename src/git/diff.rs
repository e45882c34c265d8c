//! Staged diff collection using git2.

use std::fmt;
use std::path::Path;

use git2::{Delta, Diff, DiffFormat, ErrorCode, Repository, Tree};
use tracing::debug;

use crate::error::GitError;

/// Status of a staged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Renamed => write!(f, "Renamed"),
        }
    }
}

/// A file with staged changes.
#[derive(Debug, Clone)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
}

/// The staged changes of a repository, as unified diff text.
#[derive(Debug, Clone)]
pub struct StagedDiff {
    pub diff_text: String,
    pub changed_files: Vec<ChangedFile>,
    pub additions: usize,
    pub deletions: usize,
}

/// Open the repository containing `path`.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    Repository::discover(path).map_err(|e| {
        debug!("Repository discovery failed for {}: {}", path.display(), e);
        GitError::NotARepository
    })
}

/// Whether `path` is inside a git repository.
pub fn is_repository(path: &Path) -> bool {
    Repository::discover(path).is_ok()
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e)
            if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound =>
        {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

fn index_diff(repo: &Repository) -> Result<Diff<'_>, GitError> {
    let head_tree = resolve_head_tree(repo)?;
    repo.diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(GitError::DiffFailed)
}

/// Whether the index differs from HEAD.
pub fn has_staged_changes(repo: &Repository) -> Result<bool, GitError> {
    Ok(index_diff(repo)?.deltas().len() > 0)
}

/// Collect the staged diff (index against HEAD, like `git diff --cached`).
pub fn staged_diff(repo: &Repository) -> Result<StagedDiff, GitError> {
    let diff = index_diff(repo)?;

    let changed_files = collect_files(&diff);
    if changed_files.is_empty() {
        return Err(GitError::NoStagedChanges);
    }

    let mut diff_text = String::new();
    let mut additions = 0usize;
    let mut deletions = 0usize;

    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        match origin {
            '+' => additions += 1,
            '-' => deletions += 1,
            _ => {}
        }

        if origin == '+' || origin == '-' || origin == ' ' {
            diff_text.push(origin);
        }
        diff_text.push_str(&String::from_utf8_lossy(line.content()));

        true
    })
    .map_err(GitError::DiffFailed)?;

    debug!(
        "Staged diff: {} files, {} additions, {} deletions, {} chars",
        changed_files.len(),
        additions,
        deletions,
        diff_text.len()
    );

    Ok(StagedDiff {
        diff_text,
        changed_files,
        additions,
        deletions,
    })
}

fn collect_files(diff: &Diff<'_>) -> Vec<ChangedFile> {
    diff.deltas()
        .filter_map(|delta| {
            let status = match delta.status() {
                Delta::Added => FileStatus::Added,
                Delta::Deleted => FileStatus::Deleted,
                Delta::Renamed => FileStatus::Renamed,
                _ => FileStatus::Modified,
            };

            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().to_string())?;

            Some(ChangedFile { path, status })
        })
        .collect()
}
