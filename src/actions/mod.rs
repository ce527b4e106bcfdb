//! Capability registry: the fixed action vocabulary
//!
//! Each action is a [`CapabilityContract`] naming its parameters and a plain
//! function that performs it. Operations report expected failures (missing
//! files, existing directories) through [`OpError`]; the dispatcher turns
//! those into result strings.

pub mod catalog;
pub mod context;
pub mod fs_ops;
pub mod params;
pub mod system_ops;
pub mod text_ops;

pub use catalog::{CapabilityContract, CapabilityRegistry, ExecuteFn};
pub use context::{OpContext, Reasoner};
pub use params::{ParamKind, ParamSpec, ParamValue, Params};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure raised while performing a capability
#[derive(Error, Debug)]
pub enum OpError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Directory already exists: {}", .0.display())]
    DirectoryExists(PathBuf),

    #[error("Path exists and is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("File {} already exists. Use force to overwrite.", .0.display())]
    FileExists(PathBuf),

    #[error("Link already exists: {}", .0.display())]
    LinkExists(PathBuf),

    #[error("Directory not empty: {} (use force to remove contents)", .0.display())]
    DirectoryNotEmpty(PathBuf),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Download failed: {0}")]
    Http(String),

    #[error("Unsupported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("Reasoning backend failed: {0}")]
    Reasoning(String),

    #[error("No reasoning backend available for this action")]
    NoReasoner,

    #[error("Parameter '{0}' was not bound")]
    Unbound(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl OpError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        OpError::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap an I/O error with the path it happened on
    pub fn at(path: &Path, source: std::io::Error) -> Self {
        Self::io(path.display().to_string(), source)
    }
}

pub type OpResult<T> = std::result::Result<T, OpError>;
