//! Error types for smartcommit modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git executable not found. Install git and make sure it is on your PATH")]
    NotInstalled,

    #[error("Not a git repository (or any of the parent directories)")]
    NotARepository,

    #[error("No staged changes found. Use 'git add <files>' to stage changes first")]
    NoStagedChanges,

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to spawn git process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Failed to commit: {0}")]
    CommitFailed(String),
}

/// Errors from the commit message generation backends.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Server error: {code} - {message}")]
    Server { code: String, message: String },

    #[error("Failed to connect to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Backend did not respond within {0} seconds")]
    Timeout(u64),

    #[error("Backend returned an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the one-time consent gate.
#[derive(Error, Debug)]
pub enum ConsentError {
    #[error("Consent not given. Diffs are only sent after you agree to the security notice")]
    Declined,

    #[error("Could not determine the home directory for the consent marker")]
    NoHomeDir,

    #[error("Failed to read consent answer: {0}")]
    Prompt(#[source] dialoguer::Error),

    #[error("Failed to record consent at '{path}': {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort the commit pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error("Error generating commit message: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Consent(#[from] ConsentError),

    #[error("Error reading input: {0}")]
    Prompt(#[source] dialoguer::Error),
}
