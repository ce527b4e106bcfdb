//! Reasoning service client
//!
//! A single-shot request/response client for chat-style text generation
//! backends. Speaks the Ollama chat shape by default and the
//! OpenAI-compatible chat-completions shape when the URL says so.
//!
//! Failures never escape as errors: every call yields a
//! [`ReasoningResponse`], and callers decide what a failure means. The
//! client does not retry.

use crate::core::config::AgentConfig;
use crate::core::error::{Result, TaifError};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// API format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Ollama,
    OpenAI,
}

/// One request to the reasoning backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningRequest {
    pub model_id: String,
    pub system_context: String,
    pub user_text: String,
    /// Ask the backend to emit syntactically valid JSON
    pub require_structured_output: bool,
}

/// Why a reasoning call produced no text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReasoningFailure {
    #[error("Failed to communicate with reasoning backend: {0}")]
    Transport(String),

    #[error("Reasoning backend timeout after {0}s")]
    Timeout(u64),

    #[error("Reasoning backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unreadable reasoning backend response: {0}")]
    Decode(String),

    #[error("Reasoning backend returned no message")]
    Empty,
}

/// Outcome of one reasoning call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReasoningResponse {
    Text(String),
    Failed(ReasoningFailure),
}

impl ReasoningResponse {
    pub fn text(&self) -> Option<&str> {
        match self {
            ReasoningResponse::Text(t) => Some(t),
            ReasoningResponse::Failed(_) => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ReasoningResponse::Failed(_))
    }
}

/// Anything that can answer a [`ReasoningRequest`]
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn complete(&self, request: &ReasoningRequest) -> ReasoningResponse;
}

/// HTTP client for a chat-style reasoning backend
pub struct ReasoningClient {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    api_format: ApiFormat,
    timeout_secs: u64,
}

impl ReasoningClient {
    /// Create a client for `api_url` with a per-call timeout
    pub fn new(api_url: String, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TaifError::LlmError(format!("Failed to build HTTP client: {}", e)))?;
        let api_format = Self::detect_api_format(&api_url);
        Ok(Self {
            client,
            api_key,
            api_url,
            api_format,
            timeout_secs,
        })
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        Self::new(
            config.backend_url.clone(),
            config.api_key.clone(),
            config.timeout_secs,
        )
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.trim_end_matches('/').ends_with("/chat/completions") {
            ApiFormat::OpenAI
        } else {
            ApiFormat::Ollama
        }
    }

    pub fn api_format(&self) -> ApiFormat {
        self.api_format
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn transport_failure(&self, e: reqwest::Error) -> ReasoningFailure {
        if e.is_timeout() {
            ReasoningFailure::Timeout(self.timeout_secs)
        } else {
            ReasoningFailure::Transport(e.to_string())
        }
    }

    async fn post<T: Serialize>(&self, body: &T) -> std::result::Result<reqwest::Response, ReasoningFailure> {
        let mut builder = self
            .client
            .post(&self.api_url)
            .header("content-type", "application/json")
            .json(body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| self.transport_failure(e))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ReasoningFailure::Status { status, body });
        }
        Ok(response)
    }

    async fn complete_ollama(&self, request: &ReasoningRequest) -> std::result::Result<String, ReasoningFailure> {
        let body = OllamaRequest::from_request(request);
        let response = self.post(&body).await?;
        let completion: OllamaResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ReasoningFailure::Timeout(self.timeout_secs)
            } else {
                ReasoningFailure::Decode(e.to_string())
            }
        })?;
        completion
            .message
            .map(|m| m.content)
            .ok_or(ReasoningFailure::Empty)
    }

    async fn complete_openai(&self, request: &ReasoningRequest) -> std::result::Result<String, ReasoningFailure> {
        let body = OpenAIRequest::from_request(request);
        let response = self.post(&body).await?;
        let completion: OpenAIResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ReasoningFailure::Timeout(self.timeout_secs)
            } else {
                ReasoningFailure::Decode(e.to_string())
            }
        })?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ReasoningFailure::Empty)
    }

    /// Model names the backend advertises
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| TaifError::LlmError(format!("Invalid backend URL {}: {}", self.api_url, e)))?;
        url.set_path(match self.api_format {
            ApiFormat::Ollama => "/api/tags",
            ApiFormat::OpenAI => "/v1/models",
        });

        let mut builder = self.client.get(url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| TaifError::LlmError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TaifError::LlmError(format!(
                "API error: status {}",
                response.status()
            )));
        }

        match self.api_format {
            ApiFormat::Ollama => {
                let tags: OllamaTags = response
                    .json()
                    .await
                    .map_err(|e| TaifError::LlmError(e.to_string()))?;
                Ok(tags.models.into_iter().map(|m| m.name).collect())
            }
            ApiFormat::OpenAI => {
                let models: OpenAIModels = response
                    .json()
                    .await
                    .map_err(|e| TaifError::LlmError(e.to_string()))?;
                Ok(models.data.into_iter().map(|m| m.id).collect())
            }
        }
    }
}

#[async_trait]
impl ReasoningService for ReasoningClient {
    async fn complete(&self, request: &ReasoningRequest) -> ReasoningResponse {
        tracing::debug!(
            model = %request.model_id,
            structured = request.require_structured_output,
            "Sending reasoning request"
        );
        let result = match self.api_format {
            ApiFormat::Ollama => self.complete_ollama(request).await,
            ApiFormat::OpenAI => self.complete_openai(request).await,
        };
        match result {
            Ok(text) => ReasoningResponse::Text(text),
            Err(failure) => {
                tracing::warn!(model = %request.model_id, "{}", failure);
                ReasoningResponse::Failed(failure)
            }
        }
    }
}

// Ollama chat format
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

impl OllamaRequest {
    fn from_request(request: &ReasoningRequest) -> Self {
        Self {
            model: request.model_id.clone(),
            messages: Message::pair(request),
            stream: false,
            format: request.require_structured_output.then_some("json"),
        }
    }
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

impl OpenAIRequest {
    fn from_request(request: &ReasoningRequest) -> Self {
        Self {
            model: request.model_id.clone(),
            messages: Message::pair(request),
            stream: false,
            response_format: request.require_structured_output.then(|| ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIModels {
    #[serde(default)]
    data: Vec<OpenAIModel>,
}

#[derive(Deserialize)]
struct OpenAIModel {
    id: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn pair(request: &ReasoningRequest) -> Vec<Message> {
        vec![
            Message {
                role: "system".into(),
                content: request.system_context.clone(),
            },
            Message {
                role: "user".into(),
                content: request.user_text.clone(),
            },
        ]
    }
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}
