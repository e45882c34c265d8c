//! Google Gemini `generateContent` backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompt::{build_prompt, clean_response};
use super::server::map_transport_error;
use super::{Backend, GenerateRequest};
use crate::error::BackendError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Backend calling the hosted Gemini API directly.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiBackend {
    /// Create the backend. Fails with [`BackendError::Authentication`] when no key is set.
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let api_key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            BackendError::Authentication(
                "GEMINI_API_KEY is not set. Export it to use the gemini backend".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: model.into(),
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Point the backend at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    fn destination(&self) -> String {
        format!("Google Gemini ({})", self.model)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        let url = self.endpoint();
        let prompt = build_prompt(request);
        debug!(url = %url, prompt_chars = prompt.len(), "Sending Gemini request");

        let body = GeminiRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, &self.base_url, self.timeout_secs))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, &self.base_url, self.timeout_secs))?;

        debug!(status = %status, body_len = text.len(), "Received Gemini response");

        if !status.is_success() {
            return Err(classify_error(status, &text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        let reply: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        Ok(clean_response(&reply))
    }
}

fn classify_error(status: StatusCode, body: &str) -> BackendError {
    let (message, api_status) = match serde_json::from_str::<GeminiErrorEnvelope>(body) {
        Ok(env) => (env.error.message, env.error.status),
        Err(_) => (body.chars().take(200).collect(), String::new()),
    };

    let key_rejected = body.contains("API_KEY_INVALID") || message.contains("API key");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Authentication(message),
        StatusCode::BAD_REQUEST if key_rejected => BackendError::Authentication(message),
        _ => BackendError::Server {
            code: if api_status.is_empty() {
                status.as_u16().to_string()
            } else {
                api_status
            },
            message,
        },
    }
}
