//! Reasoning endpoint clients.

use crate::{ClassifierError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Default request timeout for local model inference
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A text-generation endpoint: prompt in, free-form text out
pub trait ReasoningClient {
    fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Client for an Ollama `/api/generate` endpoint
#[derive(Debug, Clone)]
pub struct OllamaClient {
    url: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, model, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            url: url.into(),
            model: model.into(),
            client,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ReasoningClient for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        info!("Requesting classification from {} ({})", self.url, self.model);
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(ClassifierError::Endpoint { status, body });
        }

        let generated: GenerateResponse = response.json()?;
        debug!("Received {} chars", generated.response.chars().count());
        Ok(generated.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_layout() {
        let request = GenerateRequest {
            model: "qwen2:7b-instruct",
            prompt: "hi",
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "qwen2:7b-instruct", "prompt": "hi", "stream": false})
        );
    }

    #[test]
    fn test_missing_response_field_is_empty() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"done": true}"#).unwrap();
        assert!(parsed.response.is_empty());
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let client = OllamaClient::with_timeout(
            "http://127.0.0.1:9/api/generate",
            "qwen2:7b-instruct",
            Duration::from_secs(2),
        )
        .unwrap();
        assert!(matches!(client.generate("hi"), Err(ClassifierError::Http(_))));
    }
}
