use std::io;
use thiserror::Error;

/// Custom error type for HandleIt
#[derive(Error, Debug)]
pub enum HandleItError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Monitor runtime error: {0}")]
    Runtime(String),
}

/// Result type alias for HandleIt
pub type Result<T> = std::result::Result<T, HandleItError>;

impl HandleItError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        HandleItError::Config(msg.into())
    }

    /// Create a runtime error
    pub fn runtime<S: Into<String>>(msg: S) -> Self {
        HandleItError::Runtime(msg.into())
    }
}
