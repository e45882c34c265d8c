//! Commit message generation backends.
//!
//! Two backends produce the same raw commit text from a redacted diff:
//! a local HTTP server speaking a small JSON API ([`server`]) and the hosted
//! Gemini API ([`gemini`]). Everything downstream treats the reply as opaque
//! text, so redaction and post-processing behave identically for both.

pub mod gemini;
pub mod prompt;
pub mod server;

use std::fmt;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::commit::CommitType;
use crate::config::Config;
use crate::error::BackendError;

pub use gemini::GeminiBackend;
pub use server::ServerBackend;

/// Replies shorter than this are replaced by [`FALLBACK_MESSAGE`].
pub const MIN_MESSAGE_LENGTH: usize = 10;

/// Used when a backend returns an empty or degenerate message.
pub const FALLBACK_MESSAGE: &str =
    "chore: update files\n\n- Update project files\n- Apply changes from diff";

/// How much detail the generated message should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Detailed,
    Short,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Detailed => "detailed",
            Style::Short => "short",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which backend to send diffs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Server,
    Gemini,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Server => "server",
            BackendKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for one generation call. Serialized as the server backend's request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    /// Redacted diff text.
    pub diff: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub commit_type: Option<CommitType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// A service that turns a diff into commit message text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Where diffs are sent, for the consent notice and logs.
    fn destination(&self) -> String;

    /// Generate raw commit message text for the request.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError>;
}

/// Build the backend selected in `config`.
pub fn from_config(config: &Config) -> Result<Box<dyn Backend>, BackendError> {
    match config.backend {
        BackendKind::Server => Ok(Box::new(ServerBackend::new(
            config.server_url.clone(),
            config.api_key().map(str::to_string),
            config.timeout(),
        )?)),
        BackendKind::Gemini => Ok(Box::new(GeminiBackend::new(
            config.gemini_api_key.clone(),
            config.model.clone(),
            config.timeout(),
        )?)),
    }
}

/// Ask `backend` for a message, falling back to a canned one for degenerate replies.
pub async fn generate_commit_message<B>(
    backend: &B,
    request: &GenerateRequest,
) -> Result<String, BackendError>
where
    B: Backend + ?Sized,
{
    let raw = backend.generate(request).await?;
    let message = raw.trim();

    if message.chars().count() < MIN_MESSAGE_LENGTH {
        warn!(
            "Backend returned a degenerate message ({} chars), using fallback",
            message.chars().count()
        );
        return Ok(FALLBACK_MESSAGE.to_string());
    }

    debug!("Generated message: {} chars", message.len());
    Ok(message.to_string())
}
