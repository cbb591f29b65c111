//! Outbound client for the generative language API.
//!
//! Callers depend on the [`TextGenerator`] trait, not the concrete client,
//! so services and tests can substitute a stub. The real client walks the
//! configured model list in order; the first model that answers wins and the
//! last failure is reported when none do.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::LlmSettings;
use crate::infra::error::InfraError;

/// How much upstream error body is kept for logs and hints.
const DETAIL_LIMIT: usize = 240;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("the configured API key was rejected")]
    Unauthorized,
    #[error("request quota for the generative API is exhausted")]
    QuotaExhausted,
    #[error("model `{model}` is not available")]
    ModelUnavailable { model: String },
    #[error("network failure reaching the generative API: {0}")]
    Network(#[source] reqwest::Error),
    #[error("generative API returned status {status}: {detail}")]
    Api { status: u16, detail: String },
    #[error("model response carried no text candidates")]
    EmptyResponse,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One prompt in, raw model text out.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

pub struct GenerativeLanguageClient {
    http: Client,
    base: Url,
    api_key: String,
    models: Vec<String>,
}

impl GenerativeLanguageClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, InfraError> {
        let http = Client::builder()
            .user_agent(concat!("sopforge/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;
        Ok(Self {
            http,
            base: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            models: settings.models.clone(),
        })
    }

    async fn call_model(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let url = self
            .base
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(|err| LlmError::Api {
                status: 0,
                detail: format!("invalid request url: {err}"),
            })?;

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![Part {
                    text: prompt.to_owned(),
                }],
            }],
        };

        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(LlmError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_status(status, model, &detail));
        }

        let payload: GenerateResponse =
            response.json().await.map_err(|err| LlmError::Api {
                status: status.as_u16(),
                detail: format!("unexpected response shape: {err}"),
            })?;
        payload.into_text().ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl TextGenerator for GenerativeLanguageClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let mut last_error = None;
        for model in &self.models {
            match self.call_model(model, prompt).await {
                Ok(text) => {
                    debug!(model, chars = text.len(), "model responded");
                    return Ok(text);
                }
                Err(err) => {
                    warn!(model, error = %err, "model attempt failed");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or(LlmError::ModelUnavailable {
            model: "<none configured>".to_owned(),
        }))
    }
}

fn classify_status(status: StatusCode, model: &str, detail: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => LlmError::QuotaExhausted,
        StatusCode::NOT_FOUND => LlmError::ModelUnavailable {
            model: model.to_owned(),
        },
        _ => LlmError::Api {
            status: status.as_u16(),
            detail: truncate_detail(detail),
        },
    }
}

fn truncate_detail(detail: &str) -> String {
    let trimmed = detail.trim();
    if trimmed.len() <= DETAIL_LIMIT {
        return trimmed.to_owned();
    }
    let mut cut = DETAIL_LIMIT;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &trimmed[..cut])
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .map(|part| part.text)
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification_matches_error_classes() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "m", ""),
            LlmError::Unauthorized
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "m", ""),
            LlmError::Unauthorized
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "m", ""),
            LlmError::QuotaExhausted
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "gemini-x", ""),
            LlmError::ModelUnavailable { model } if model == "gemini-x"
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "m", "boom"),
            LlmError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn response_text_concatenates_candidate_parts() {
        let payload: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"hello "},{"text":"world"}]}}]}"#,
        )
        .expect("decode");
        assert_eq!(payload.into_text().as_deref(), Some("hello world"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).expect("decode");
        assert_eq!(empty.into_text(), None);

        let blank: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#,
        )
        .expect("decode");
        assert_eq!(blank.into_text(), None);
    }

    #[test]
    fn long_error_bodies_are_truncated_for_logs() {
        let detail = "x".repeat(1000);
        let truncated = truncate_detail(&detail);
        assert!(truncated.len() <= DETAIL_LIMIT + 3);
        assert!(truncated.ends_with("..."));
    }
}
