//! smartcommit - generate Conventional Commits messages from staged changes.
//!
//! # Overview
//!
//! smartcommit reads the staged diff of a git repository, redacts likely secrets,
//! sends the sanitized diff to a generation backend (a commit message server or
//! Google Gemini), applies any forced type or scope to the reply, and commits
//! after confirmation.

pub mod backend;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod redact;

// Re-export commonly used types
pub use backend::{Backend, BackendKind, GenerateRequest, Style};
pub use commit::{CommitType, ConventionalCommit};
pub use config::Config;
pub use error::{BackendError, ConfigError, ConsentError, GitError, PipelineError};
pub use pipeline::{ConsentGate, PipelineOptions, PipelineOutcome, run_pipeline};
pub use redact::{RedactionReport, redact, redact_with_report};
