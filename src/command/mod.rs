//! Command pipeline
//!
//! Instruction -> ComplexityClassifier -> IntentResolver -> ActionDescriptor
//! -> CommandExecutor -> ExecutionResult

pub mod complexity;
pub mod executor;
pub mod pipeline;
pub mod resolver;

pub use complexity::{ComplexityAnalysis, ComplexityClassifier, Indicator};
pub use executor::{CommandExecutor, ExecutionResult};
pub use pipeline::{Agent, Outcome, ResolutionMode, NO_MATCH_MESSAGE};
pub use resolver::{IntentResolution, IntentResolver, Route};
