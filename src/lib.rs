//! TAIF - natural language file system agent

pub mod actions;
pub mod command;
pub mod core;
pub mod llm;
