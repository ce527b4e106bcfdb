//! Reasoning backend access: client, prompts and response parsing

pub mod client;
pub mod context;
pub mod parser;
pub mod prompts;

pub use client::{
    ReasoningClient, ReasoningFailure, ReasoningRequest, ReasoningResponse, ReasoningService,
};
pub use context::PromptContext;
pub use parser::{parse_descriptor, ActionDescriptor};
