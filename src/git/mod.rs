//! Git operations: repository inspection via git2, commits via the git binary.

pub mod diff;
pub mod executor;

pub use diff::{
    ChangedFile, FileStatus, StagedDiff, has_staged_changes, is_repository, open_repository,
    staged_diff,
};
pub use executor::{check_git_installed, commit};
