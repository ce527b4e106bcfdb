use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaifError {
    #[error("Action already registered: {0}")]
    DuplicateAction(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Missing required parameter '{parameter}' for action '{action}'")]
    MissingParameter { action: String, parameter: String },

    #[error("Invalid parameter '{parameter}' for action '{action}': expected {expected}")]
    InvalidParameter {
        action: String,
        parameter: String,
        expected: String,
    },

    #[error("Malformed intent: {0}")]
    MalformedIntent(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TaifError>;
