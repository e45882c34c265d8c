//! Client for the commit message server's JSON API.
//!
//! `POST {server_url}/api/v1/generate` with a [`GenerateRequest`] body and an
//! optional `X-API-Key` header. The server answers with an envelope:
//!
//! ```json
//! {"success": true, "data": {"message": "feat: ..."}}
//! {"success": false, "error": {"code": "INVALID_API_KEY", "message": "..."}}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{Backend, GenerateRequest};
use crate::error::BackendError;

const GENERATE_PATH: &str = "/api/v1/generate";
const API_KEY_HEADER: &str = "X-API-Key";
const USER_AGENT_VALUE: &str = concat!("smartcommit/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an unparseable body quoted back in errors.
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ResponseData>,
    #[serde(default)]
    error: Option<ResponseError>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Option<String>,
}

/// Backend talking to a commit message server over HTTP.
pub struct ServerBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl ServerBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(BackendError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout_secs: timeout.as_secs(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), GENERATE_PATH)
    }
}

#[async_trait]
impl Backend for ServerBackend {
    fn destination(&self) -> String {
        format!("the commit message server at {}", self.base_url)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        let url = self.endpoint();
        debug!(url = %url, diff_chars = request.diff.len(), "Sending generate request");

        let mut builder = self.client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_transport_error(e, &self.base_url, self.timeout_secs))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, &self.base_url, self.timeout_secs))?;

        debug!(status = %status, body_len = body.len(), "Received generate response");
        parse_response(status, &body)
    }
}

/// Classify a reqwest failure as a timeout or a connection problem.
pub(crate) fn map_transport_error(err: reqwest::Error, url: &str, timeout_secs: u64) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(timeout_secs)
    } else {
        BackendError::Connection {
            url: url.to_string(),
            source: err,
        }
    }
}

fn parse_response(status: StatusCode, body: &str) -> Result<String, BackendError> {
    let parsed: GenerateResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    BackendError::Authentication(format!("server returned {status}"))
                }
                s if !s.is_success() => BackendError::Server {
                    code: s.as_u16().to_string(),
                    message: snippet,
                },
                _ => BackendError::InvalidResponse(format!("{e}. Response: {snippet}")),
            });
        }
    };

    if !parsed.success {
        let error = parsed.error.unwrap_or_default();
        return Err(match error.code.as_str() {
            "MISSING_API_KEY" | "INVALID_API_KEY" => BackendError::Authentication(format!(
                "{}\nSet api_key in .smartcommitrc.json or the SMARTCOMMIT_API_KEY environment variable",
                error.message
            )),
            _ => {
                let code = if error.code.is_empty() {
                    status.as_u16().to_string()
                } else {
                    error.code
                };
                let message = match error.details {
                    Some(details) if !details.is_empty() => {
                        format!("{} ({})", error.message, details)
                    }
                    _ => error.message,
                };
                BackendError::Server { code, message }
            }
        });
    }

    Ok(parsed.data.map(|d| d.message).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success() {
        let body = r#"{"success": true, "data": {"message": "feat: add x", "type": "feat", "breaking": false}}"#;
        assert_eq!(parse_response(StatusCode::OK, body).unwrap(), "feat: add x");
    }

    #[test]
    fn test_parse_success_without_data_is_empty() {
        let body = r#"{"success": true}"#;
        assert_eq!(parse_response(StatusCode::OK, body).unwrap(), "");
    }

    #[test]
    fn test_parse_auth_error_codes() {
        for code in ["MISSING_API_KEY", "INVALID_API_KEY"] {
            let body = format!(
                r#"{{"success": false, "error": {{"code": "{code}", "message": "bad key"}}}}"#
            );
            let err = parse_response(StatusCode::UNAUTHORIZED, &body).unwrap_err();
            match err {
                BackendError::Authentication(msg) => {
                    assert!(msg.contains("bad key"));
                    assert!(msg.contains("SMARTCOMMIT_API_KEY"));
                }
                other => panic!("expected Authentication, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_server_error_with_details() {
        let body = r#"{"success": false, "error": {"code": "RATE_LIMITED", "message": "slow down", "details": "retry in 60s"}}"#;
        let err = parse_response(StatusCode::TOO_MANY_REQUESTS, body).unwrap_err();
        match err {
            BackendError::Server { code, message } => {
                assert_eq!(code, "RATE_LIMITED");
                assert_eq!(message, "slow down (retry in 60s)");
            }
            other => panic!("expected Server, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_non_json_error_status() {
        let err = parse_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, BackendError::Server { ref code, .. } if code == "502"));
    }

    #[test]
    fn test_parse_non_json_success_is_invalid() {
        let err = parse_response(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let backend =
            ServerBackend::new("http://localhost:8080/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:8080/api/v1/generate");
    }

    #[test]
    fn test_empty_api_key_is_ignored() {
        let backend =
            ServerBackend::new("http://localhost:8080", Some(String::new()), Duration::from_secs(5))
                .unwrap();
        assert!(backend.api_key.is_none());
    }
}
