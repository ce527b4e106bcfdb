//! Agent configuration with documented defaults
//!
//! Values are layered: built-in defaults, then an optional TOML file,
//! then `TAIF_*` environment variables. The binary applies its command
//! line flags last.

use crate::core::error::{Result, TaifError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the intent-resolution pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    // === REASONING BACKEND ===
    /// Chat endpoint of the reasoning backend
    ///
    /// Ollama's `/api/chat` by default. URLs ending in `/chat/completions`
    /// switch the client to the OpenAI-compatible request shape.
    pub backend_url: String,

    /// Optional bearer token sent with every request
    pub api_key: Option<String>,

    /// Model used for single-stage resolution
    pub model: String,

    /// Model used for the free-text analysis pass
    pub thinker_model: String,

    /// Model used for the JSON synthesis pass
    pub formatter_model: String,

    /// Upper bound for a single backend call, in seconds
    ///
    /// A call that exceeds this returns a timeout failure. The client
    /// never retries on its own.
    pub timeout_secs: u64,

    // === ROUTING ===
    /// Score at or above which an instruction takes the dual-stage path
    pub complexity_threshold: u32,

    /// Word count above which an instruction earns the length bonus
    pub long_instruction_words: usize,

    // === EXECUTION ===
    /// Directory that relative path parameters are resolved against
    ///
    /// When unset, relative paths are used as given (i.e. relative to the
    /// process working directory).
    pub workdir: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:11434/api/chat".into(),
            api_key: None,
            model: "mistral".into(),
            thinker_model: "llama3".into(),
            formatter_model: "mistral".into(),
            timeout_secs: 30,
            complexity_threshold: 3,
            long_instruction_words: 15,
            workdir: None,
        }
    }
}

impl AgentConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TaifError::ConfigError(format!("Invalid TOML: {}", e)))
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TaifError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Overlay `TAIF_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay variables from an arbitrary lookup (used by `apply_env`)
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TAIF_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Some(key) = lookup("TAIF_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = lookup("TAIF_MODEL") {
            self.model = model;
        }
        if let Some(model) = lookup("TAIF_THINKER_MODEL") {
            self.thinker_model = model;
        }
        if let Some(model) = lookup("TAIF_FORMATTER_MODEL") {
            self.formatter_model = model;
        }
        if let Some(secs) = lookup("TAIF_TIMEOUT_SECS") {
            self.timeout_secs = secs.trim().parse().map_err(|_| {
                TaifError::ConfigError(format!("TAIF_TIMEOUT_SECS is not a number: {}", secs))
            })?;
        }
        if let Some(dir) = lookup("TAIF_WORKDIR") {
            self.workdir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.backend_url.trim().is_empty() {
            return Err(TaifError::ConfigError("backend_url must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(TaifError::ConfigError("timeout_secs must be positive".into()));
        }
        for (field, value) in [
            ("model", &self.model),
            ("thinker_model", &self.thinker_model),
            ("formatter_model", &self.formatter_model),
        ] {
            if value.trim().is_empty() {
                return Err(TaifError::ConfigError(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AgentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.complexity_threshold, 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AgentConfig::from_toml_str(
            r#"
            thinker_model = "deepseek-r1"
            complexity_threshold = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.thinker_model, "deepseek-r1");
        assert_eq!(config.complexity_threshold, 5);
        assert_eq!(config.formatter_model, "mistral");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = AgentConfig::from_toml_str("timeout_secs = \"soon\"");
        assert!(matches!(result, Err(TaifError::ConfigError(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TAIF_MODEL", "qwen2"),
            ("TAIF_TIMEOUT_SECS", "5"),
            ("TAIF_WORKDIR", "/srv/data"),
        ]
        .into_iter()
        .collect();

        let mut config = AgentConfig::default();
        config
            .apply_env_from(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.model, "qwen2");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.workdir, Some(PathBuf::from("/srv/data")));
    }

    #[test]
    fn test_bad_timeout_env_rejected() {
        let mut config = AgentConfig::default();
        let result = config.apply_env_from(|key| {
            (key == "TAIF_TIMEOUT_SECS").then(|| "thirty".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = AgentConfig {
            timeout_secs: 0,
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
