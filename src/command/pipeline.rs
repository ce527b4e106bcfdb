//! Instruction pipeline: classify -> resolve -> dispatch
//!
//! Each instruction is handled start to finish before the next: the two
//! reasoning calls of the dual-stage path run sequentially on a
//! current-thread runtime owned by the agent, and dispatch runs
//! synchronously afterwards. Nothing is carried between instructions.

use crate::actions::CapabilityRegistry;
use crate::command::complexity::{ComplexityAnalysis, ComplexityClassifier};
use crate::command::executor::{CommandExecutor, ExecutionResult};
use crate::command::resolver::{IntentResolution, IntentResolver, Route};
use crate::core::config::AgentConfig;
use crate::core::error::{Result, TaifError};
use crate::llm::client::{ReasoningClient, ReasoningRequest, ReasoningService};
use crate::llm::context::PromptContext;
use crate::llm::parser::ActionDescriptor;
use tokio::runtime::{Builder, Runtime};
use uuid::Uuid;

pub const NO_MATCH_MESSAGE: &str =
    "Sorry, I couldn't understand the instruction or no command is available.";

/// How the resolution path is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// Let the complexity classifier decide
    #[default]
    Auto,
    ForceSingle,
    ForceDual,
}

/// What happened to one instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Executed(ExecutionResult),
    NoMatch,
    Failed(String),
}

impl Outcome {
    /// Text shown to the caller
    pub fn message(&self) -> String {
        match self {
            Outcome::Executed(result) => result.output.clone(),
            Outcome::NoMatch => NO_MATCH_MESSAGE.to_string(),
            Outcome::Failed(reason) => format!("Could not resolve instruction: {}", reason),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Executed(r) if r.success)
    }
}

/// Owns everything needed to turn instructions into results
pub struct Agent<S: ReasoningService> {
    config: AgentConfig,
    registry: CapabilityRegistry,
    context: PromptContext,
    classifier: ComplexityClassifier,
    service: S,
    mode: ResolutionMode,
    runtime: Runtime,
}

impl Agent<ReasoningClient> {
    /// Agent backed by the HTTP reasoning client and built-in actions
    pub fn from_config(config: AgentConfig) -> Result<Self> {
        let service = ReasoningClient::from_config(&config)?;
        Self::new(config, CapabilityRegistry::builtin()?, service)
    }
}

impl<S: ReasoningService> Agent<S> {
    pub fn new(config: AgentConfig, registry: CapabilityRegistry, service: S) -> Result<Self> {
        config.validate()?;
        if registry.is_empty() {
            return Err(TaifError::ConfigError("capability registry is empty".into()));
        }
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let context = PromptContext::from_registry(&registry);
        let classifier = ComplexityClassifier::from_config(&config);
        Ok(Self {
            config,
            registry,
            context,
            classifier,
            service,
            mode: ResolutionMode::Auto,
            runtime,
        })
    }

    pub fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Complexity breakdown without contacting the backend
    pub fn classify(&self, instruction: &str) -> ComplexityAnalysis {
        self.classifier.analyze(instruction)
    }

    pub fn route(&self, instruction: &str) -> Route {
        match self.mode {
            ResolutionMode::ForceSingle => Route::SingleStage,
            ResolutionMode::ForceDual => Route::DualStage,
            ResolutionMode::Auto => {
                if self.classifier.is_complex(instruction) {
                    Route::DualStage
                } else {
                    Route::SingleStage
                }
            }
        }
    }

    /// Resolve an instruction on the agent's runtime
    ///
    /// Must not be called from inside another async runtime.
    pub fn resolve(&self, instruction: &str) -> Result<IntentResolution> {
        let route = self.route(instruction);
        tracing::info!(?route, "Resolving instruction");
        let resolver = IntentResolver::new(&self.service, &self.context, &self.config);
        self.runtime.block_on(resolver.resolve(instruction, route))
    }

    /// Validate and run a descriptor
    ///
    /// Capabilities that need the backend reach it through the agent's
    /// runtime, so this too must run outside any async context.
    pub fn dispatch(&self, descriptor: &ActionDescriptor) -> ExecutionResult {
        let reasoner =
            |request: &ReasoningRequest| self.runtime.block_on(self.service.complete(request));
        CommandExecutor::new(&self.registry)
            .with_workdir(self.config.workdir.as_deref())
            .with_reasoner(&reasoner, &self.config.model)
            .execute(descriptor)
    }

    /// Run one instruction through the whole pipeline
    pub fn handle(&self, instruction: &str) -> Outcome {
        let cycle = Uuid::new_v4();
        let span = tracing::info_span!("instruction", %cycle);
        let _guard = span.enter();

        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Outcome::NoMatch;
        }

        match self.resolve(instruction) {
            Ok(IntentResolution::Matched(descriptor)) => {
                tracing::info!(action = %descriptor.action, "Resolved");
                let result = self.dispatch(&descriptor);
                tracing::info!(success = result.success, "Dispatched");
                Outcome::Executed(result)
            }
            Ok(IntentResolution::NoMatch) => {
                tracing::info!("No actionable intent");
                Outcome::NoMatch
            }
            Err(TaifError::MalformedIntent(reason)) => {
                tracing::warn!("Malformed intent: {}", reason);
                Outcome::NoMatch
            }
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }
}
