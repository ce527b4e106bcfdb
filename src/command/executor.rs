//! Command execution - validates descriptors and runs capabilities
//!
//! The executor always returns a result string. Unknown actions, missing
//! or mistyped parameters and operation failures all become diagnostics;
//! nothing runs unless validation passes.

use crate::actions::{CapabilityContract, CapabilityRegistry, OpContext, Params, Reasoner};
use crate::core::error::Result;
use crate::llm::parser::ActionDescriptor;
use std::path::{Path, PathBuf};

/// Result of dispatching one descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub action: String,
    pub output: String,
    pub success: bool,
}

impl ExecutionResult {
    fn ok(action: &str, output: String) -> Self {
        Self {
            action: action.to_string(),
            output,
            success: true,
        }
    }

    fn rejected(action: &str, output: String) -> Self {
        Self {
            action: action.to_string(),
            output,
            success: false,
        }
    }
}

/// Dispatches descriptors against a capability registry
pub struct CommandExecutor<'a> {
    registry: &'a CapabilityRegistry,
    workdir: Option<PathBuf>,
    context: OpContext<'a>,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(registry: &'a CapabilityRegistry) -> Self {
        Self {
            registry,
            workdir: None,
            context: OpContext::new(),
        }
    }

    /// Let capabilities such as `summarize` call the reasoning backend
    pub fn with_reasoner(mut self, reasoner: &'a dyn Reasoner, default_model: &'a str) -> Self {
        self.context = self.context.with_reasoner(reasoner, default_model);
        self
    }

    /// Resolve relative path parameters against `dir`
    pub fn with_workdir(mut self, dir: Option<&Path>) -> Self {
        self.workdir = dir.map(Path::to_path_buf);
        self
    }

    /// Check the action exists and bind its parameters
    pub fn validate(&self, descriptor: &ActionDescriptor) -> Result<(&'a CapabilityContract, Params)> {
        let contract = self.registry.resolve(&descriptor.action)?;
        let params = Params::bind(contract, &descriptor.parameters, self.workdir.as_deref())?;
        Ok((contract, params))
    }

    /// Validate and execute a descriptor
    pub fn execute(&self, descriptor: &ActionDescriptor) -> ExecutionResult {
        let (contract, params) = match self.validate(descriptor) {
            Ok(bound) => bound,
            Err(e) => {
                tracing::warn!(action = %descriptor.action, "Rejected: {}", e);
                return ExecutionResult::rejected(&descriptor.action, format!("Rejected: {}", e));
            }
        };

        tracing::info!(action = contract.name, params = params.len(), "Executing");
        match (contract.execute)(&params, &self.context) {
            Ok(output) => ExecutionResult::ok(contract.name, output),
            Err(e) => {
                tracing::warn!(action = contract.name, "Operation failed: {}", e);
                ExecutionResult::rejected(contract.name, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(value: serde_json::Value) -> ActionDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_execute_echo() {
        let registry = CapabilityRegistry::builtin().unwrap();
        let result = CommandExecutor::new(&registry)
            .execute(&descriptor(json!({"action": "echo", "parameters": {"text": "hello"}})));
        assert!(result.success);
        assert_eq!(result.output, "hello");
    }

    #[test]
    fn test_unknown_action_rejected() {
        let registry = CapabilityRegistry::builtin().unwrap();
        let result = CommandExecutor::new(&registry)
            .execute(&descriptor(json!({"action": "format_disk", "parameters": {}})));
        assert!(!result.success);
        assert!(result.output.contains("Unknown action: format_disk"));
    }

    #[test]
    fn test_missing_parameter_names_field() {
        let registry = CapabilityRegistry::builtin().unwrap();
        let result = CommandExecutor::new(&registry)
            .execute(&descriptor(json!({"action": "cat", "parameters": {}})));
        assert!(!result.success);
        assert!(result.output.contains("'path'"));
    }

    #[test]
    fn test_pwd_reports_workdir() {
        let registry = CapabilityRegistry::builtin().unwrap();
        let result = CommandExecutor::new(&registry)
            .with_workdir(Some(Path::new("/srv/data")))
            .execute(&descriptor(json!({"action": "pwd"})));
        assert_eq!(result.output, "/srv/data");
    }
}
