//! Conventional commit message model and post-processing of generated text.

pub mod message;
pub mod overrides;

pub use message::{
    BREAKING_CHANGE_FOOTER, CommitType, ConventionalCommit, parse_commit_type, truncate_title,
};
pub use overrides::{limit_header, override_scope, override_type};
