pub mod config;
pub mod error;

pub use config::AgentConfig;
pub use error::{Result, TaifError};
