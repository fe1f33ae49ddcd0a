use std::io;
use thiserror::Error;

/// Errors raised while setting up or running an audit.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Missing or unusable input/output, or an unreadable config file.
    /// Always raised before any rule is evaluated.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to read input: {0}")]
    SourceRead(#[source] io::Error),

    #[error("Failed to write output: {0}")]
    SinkWrite(#[source] io::Error),

    #[error("Malformed rule '{mode}': {reason}")]
    MalformedRule { mode: String, reason: String },

    #[error("Constraint tag <{tag}> was not found in the current context")]
    ConstraintNotSatisfied { tag: String },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

impl AuditError {
    pub fn config(message: impl Into<String>) -> Self {
        AuditError::Configuration(message.into())
    }

    pub fn malformed(mode: &str, reason: impl Into<String>) -> Self {
        AuditError::MalformedRule {
            mode: mode.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
