//! What a capability can reach besides its own parameters

use super::{OpError, OpResult};
use crate::llm::client::{ReasoningRequest, ReasoningResponse};

/// Blocking access to the reasoning backend
///
/// Capabilities run synchronously, so whoever dispatches them supplies
/// a bridge that waits for the backend's answer.
pub trait Reasoner {
    fn ask(&self, request: &ReasoningRequest) -> ReasoningResponse;
}

impl<F> Reasoner for F
where
    F: Fn(&ReasoningRequest) -> ReasoningResponse,
{
    fn ask(&self, request: &ReasoningRequest) -> ReasoningResponse {
        self(request)
    }
}

/// Execution context handed to every capability
#[derive(Clone, Copy, Default)]
pub struct OpContext<'a> {
    reasoner: Option<&'a dyn Reasoner>,
    default_model: &'a str,
}

impl<'a> OpContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow capabilities to call the backend, using `default_model` unless
    /// the descriptor names one
    pub fn with_reasoner(mut self, reasoner: &'a dyn Reasoner, default_model: &'a str) -> Self {
        self.reasoner = Some(reasoner);
        self.default_model = default_model;
        self
    }

    pub fn has_reasoner(&self) -> bool {
        self.reasoner.is_some()
    }

    /// One free-text backend call; empty or failed answers are errors
    pub fn ask(&self, model: Option<&str>, system: &str, prompt: String) -> OpResult<String> {
        let reasoner = self.reasoner.ok_or(OpError::NoReasoner)?;
        let request = ReasoningRequest {
            model_id: model.unwrap_or(self.default_model).to_string(),
            system_context: system.to_string(),
            user_text: prompt,
            require_structured_output: false,
        };
        tracing::debug!(model = %request.model_id, "Capability reasoning call");

        match reasoner.ask(&request) {
            ReasoningResponse::Text(text) if !text.trim().is_empty() => Ok(text),
            ReasoningResponse::Text(_) => Err(OpError::Reasoning("empty response".into())),
            ReasoningResponse::Failed(failure) => Err(OpError::Reasoning(failure.to_string())),
        }
    }
}
