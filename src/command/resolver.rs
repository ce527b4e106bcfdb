//! Intent resolution - converts instruction text into an ActionDescriptor
//!
//! Two paths:
//! - single-stage: one structured request, parsed directly
//! - dual-stage: a free-text "thinker" pass whose analysis is embedded in a
//!   structured "formatter" pass
//!
//! The dual-stage path never stalls on the thinker: if it fails or comes
//! back empty, a deterministic analysis derived from the instruction is
//! used instead and the formatter still runs.

use crate::core::config::AgentConfig;
use crate::core::error::{Result, TaifError};
use crate::llm::client::{ReasoningRequest, ReasoningResponse, ReasoningService};
use crate::llm::context::PromptContext;
use crate::llm::parser::{parse_descriptor, ActionDescriptor};
use crate::llm::prompts;

/// Which resolution path to take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SingleStage,
    DualStage,
}

/// Terminal outcome of resolving one instruction
#[derive(Debug, Clone, PartialEq)]
pub enum IntentResolution {
    /// A descriptor to hand to the dispatcher
    Matched(ActionDescriptor),
    /// The backend found no actionable intent
    NoMatch,
}

impl IntentResolution {
    fn from_parsed(parsed: Option<ActionDescriptor>) -> Self {
        parsed.map_or(IntentResolution::NoMatch, IntentResolution::Matched)
    }

    pub fn descriptor(&self) -> Option<&ActionDescriptor> {
        match self {
            IntentResolution::Matched(d) => Some(d),
            IntentResolution::NoMatch => None,
        }
    }
}

/// Resolves instructions through a reasoning service
pub struct IntentResolver<'a, S: ReasoningService + ?Sized> {
    service: &'a S,
    context: &'a PromptContext,
    model: String,
    thinker_model: String,
    formatter_model: String,
}

impl<'a, S: ReasoningService + ?Sized> IntentResolver<'a, S> {
    pub fn new(service: &'a S, context: &'a PromptContext, config: &AgentConfig) -> Self {
        Self {
            service,
            context,
            model: config.model.clone(),
            thinker_model: config.thinker_model.clone(),
            formatter_model: config.formatter_model.clone(),
        }
    }

    pub async fn resolve(&self, instruction: &str, route: Route) -> Result<IntentResolution> {
        match route {
            Route::SingleStage => self.resolve_single(instruction).await,
            Route::DualStage => self.resolve_dual(instruction).await,
        }
    }

    /// One structured request; the response must be the descriptor itself
    pub async fn resolve_single(&self, instruction: &str) -> Result<IntentResolution> {
        let request = ReasoningRequest {
            model_id: self.model.clone(),
            system_context: prompts::structured_system_prompt(self.context),
            user_text: prompts::single_stage_prompt(instruction),
            require_structured_output: true,
        };

        let text = match self.service.complete(&request).await {
            ReasoningResponse::Text(text) => text,
            ReasoningResponse::Failed(failure) => {
                return Err(TaifError::LlmError(failure.to_string()));
            }
        };
        tracing::debug!(response = %text, "Single-stage response");

        parse_descriptor(&text).map(IntentResolution::from_parsed)
    }

    /// Thinker analysis followed by formatter synthesis
    pub async fn resolve_dual(&self, instruction: &str) -> Result<IntentResolution> {
        let analysis = self.think(instruction).await;
        tracing::debug!(analysis = %analysis, "Thinker analysis");

        let request = ReasoningRequest {
            model_id: self.formatter_model.clone(),
            system_context: prompts::structured_system_prompt(self.context),
            user_text: prompts::formatter_prompt(&analysis, instruction, self.context),
            require_structured_output: true,
        };

        let text = match self.service.complete(&request).await {
            ReasoningResponse::Text(text) => text,
            ReasoningResponse::Failed(failure) => {
                return Err(TaifError::LlmError(failure.to_string()));
            }
        };
        tracing::debug!(response = %text, "Formatter response");

        parse_descriptor(&text).map(IntentResolution::from_parsed)
    }

    /// Free-text analysis, or the fallback when the thinker is unusable
    async fn think(&self, instruction: &str) -> String {
        let request = ReasoningRequest {
            model_id: self.thinker_model.clone(),
            system_context: prompts::THINKER_SYSTEM_PROMPT.to_string(),
            user_text: prompts::thinker_prompt(instruction),
            require_structured_output: false,
        };

        let response = self.service.complete(&request).await;
        match response {
            ReasoningResponse::Text(text) if !thinker_failed(&text) => text,
            other => {
                tracing::warn!(
                    failed = other.is_failure(),
                    "Thinker unavailable, using fallback analysis"
                );
                prompts::fallback_analysis(instruction)
            }
        }
    }
}

/// Text that signals the thinker did not really answer
fn thinker_failed(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty()
        || trimmed.contains("Failed to communicate")
        || trimmed.to_lowercase().contains("timeout")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thinker_failure_detection() {
        assert!(thinker_failed(""));
        assert!(thinker_failed("   \n"));
        assert!(thinker_failed("Failed to communicate with Ollama"));
        assert!(thinker_failed("Request TIMEOUT"));
        assert!(!thinker_failed("The user wants to read notes.txt"));
    }

    #[test]
    fn test_resolution_descriptor() {
        let matched = IntentResolution::Matched(ActionDescriptor::new("pwd", Default::default()));
        assert_eq!(matched.descriptor().map(|d| d.action.as_str()), Some("pwd"));
        assert!(IntentResolution::NoMatch.descriptor().is_none());
    }
}
