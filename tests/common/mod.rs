//! Shared test doubles

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use taif::llm::{ReasoningFailure, ReasoningRequest, ReasoningResponse, ReasoningService};

/// Reasoning service that replays queued responses and records requests
///
/// Once the queue is empty every call fails with `ReasoningFailure::Empty`.
pub struct ScriptedService {
    responses: Mutex<VecDeque<ReasoningResponse>>,
    requests: Mutex<Vec<ReasoningRequest>>,
}

impl ScriptedService {
    pub fn new(responses: Vec<ReasoningResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Service answering each call with the next text in order
    pub fn replying(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| ReasoningResponse::Text(t.to_string()))
                .collect(),
        )
    }

    /// Service whose every call fails at the transport level
    pub fn unreachable() -> Self {
        Self::new(Vec::new())
    }

    pub fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningService for ScriptedService {
    async fn complete(&self, request: &ReasoningRequest) -> ReasoningResponse {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ReasoningResponse::Failed(ReasoningFailure::Empty))
    }
}

pub fn transport_failure() -> ReasoningResponse {
    ReasoningResponse::Failed(ReasoningFailure::Transport("connection refused".into()))
}
