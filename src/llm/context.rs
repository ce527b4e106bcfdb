//! Action vocabulary context for reasoning prompts
//!
//! Built from the capability registry so the reasoning service is only
//! ever offered actions that actually exist.

use crate::actions::CapabilityRegistry;

/// Vocabulary summary embedded in resolver prompts
#[derive(Debug, Clone)]
pub struct PromptContext {
    /// Action names in registry order
    pub actions: Vec<String>,
    /// One line per action: signature and description
    pub signatures: Vec<String>,
}

impl PromptContext {
    pub fn from_registry(registry: &CapabilityRegistry) -> Self {
        let actions = registry.list_actions().iter().map(|a| a.to_string()).collect();
        let signatures = registry
            .contracts()
            .map(|c| format!("- {}: {}", c.signature(), c.description))
            .collect();
        Self {
            actions,
            signatures,
        }
    }

    /// Comma-separated action names
    pub fn action_list(&self) -> String {
        self.actions.join(", ")
    }

    /// Multi-line vocabulary listing with parameter signatures
    ///
    /// `[name:kind]` marks an optional parameter.
    pub fn summary(&self) -> String {
        self.signatures.join("\n")
    }
}
