//! Error types for the Transform Runtime.

use thiserror::Error;

/// Errors that can occur while running a user transform (§7).
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The transform source itself does not parse as JavaScript.
    #[error("transform does not parse: {message}")]
    TransformValidation { message: String },

    /// The transform threw while executing.
    #[error("transform threw: {message}")]
    TransformRuntimeError { message: String, stack: Option<String> },

    /// Failed to set up the host context (bootstrap script, capability
    /// bindings) — an internal error, not a fault in the user's code.
    #[error("failed to initialize the transform runtime: {0}")]
    Internal(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RuntimeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::TransformValidation { message: message.into() }
    }

    pub fn runtime(message: impl Into<String>, stack: Option<String>) -> Self {
        Self::TransformRuntimeError {
            message: message.into(),
            stack,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
