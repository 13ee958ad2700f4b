//! Error types for BRDF models and their documents

use thiserror::Error;

/// Result type for BRDF operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing, loading or saving BRDFs
#[derive(Error, Debug)]
pub enum Error {
    /// No model registered under this alias
    #[error("Unknown BRDF alias: {0}")]
    UnknownAlias(String),

    /// Component `type` does not name a known model
    #[error("Unknown BRDF model: {0}")]
    UnknownModel(String),

    /// Parameter name not exposed by the component
    #[error("Unknown parameter {component}.{name}")]
    UnknownParam { component: String, name: String },

    /// Parameter value has the wrong kind
    #[error("Incorrect BRDF parameter {name}: expected {expected}")]
    ParamKind { name: String, expected: &'static str },

    /// Alias cannot be used as a file stem
    #[error("Invalid BRDF alias: {0:?}")]
    InvalidAlias(String),

    /// Document is structurally valid JSON but not a usable BRDF
    #[error("Invalid BRDF document: {0}")]
    InvalidDocument(String),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
