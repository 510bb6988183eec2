//! Core error types and utilities

use thiserror::Error;

/// Core-specific error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Initialization error: {0}")]
    InitializationError(String),

    #[error("Fork failed: {0}")]
    ProcessFork(String),

    #[error("Wait failed: {0}")]
    ProcessWait(String),

    #[error("Reaper error: {0}")]
    ReaperStart(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Malformed request: {0}")]
    HttpParse(#[from] crate::http::ParseError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Other(String),
}

impl CoreError {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::ConfigurationError(_) => "KELP001",
            CoreError::ValidationError(_) => "KELP002",
            CoreError::InitializationError(_) => "KELP003",
            CoreError::ProcessFork(_) => "KELP004",
            CoreError::ProcessWait(_) => "KELP005",
            CoreError::ReaperStart(_) => "KELP006",
            CoreError::ServerError(_) => "KELP007",
            CoreError::HttpParse(_) => "KELP008",
            CoreError::IoError(_) => "KELP009",
            CoreError::Other(_) => "KELP999",
        }
    }
}

/// Core-specific result type
pub type Result<T> = std::result::Result<T, CoreError>;

// Convenience implementations
impl From<&str> for CoreError {
    fn from(s: &str) -> Self {
        CoreError::Other(s.to_string())
    }
}

impl From<String> for CoreError {
    fn from(s: String) -> Self {
        CoreError::Other(s)
    }
}
