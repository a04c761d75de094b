//! # Application Error Types
//!
//! This module defines common error types used throughout the profile bot.
//! It provides structured error handling for configuration, storage, delivery
//! and command validation failures.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Profile file read/write and (de)serialization errors
    Storage(String),
    /// Telegram API / network errors
    Network(String),
    /// Caller is not allowed to run the operation
    Unauthorized(String),
    /// Command invoked with missing or malformed arguments
    Usage(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Storage(msg) => write!(f, "[STORAGE] {}", msg),
            AppError::Network(msg) => write!(f, "[NETWORK] {}", msg),
            AppError::Unauthorized(msg) => write!(f, "[UNAUTHORIZED] {}", msg),
            AppError::Usage(msg) => write!(f, "[USAGE] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<teloxide::RequestError> for AppError {
    fn from(err: teloxide::RequestError) -> Self {
        AppError::Network(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::error;

    /// Log profile file errors with path and operation context
    pub fn log_storage_error(
        error: &impl std::fmt::Display,
        operation: &str,
        path: Option<&str>,
        user_id: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            path = ?path,
            user_id = ?user_id,
            "Profile storage operation failed"
        );
    }

    /// Log a failed outbound delivery to a single recipient
    pub fn log_delivery_error(error: &impl std::fmt::Display, operation: &str, recipient: &str) {
        error!(
            error = %error,
            operation = %operation,
            recipient = %recipient,
            "Message delivery failed"
        );
    }

    /// Log a handler fault together with the event that triggered it
    pub fn log_handler_error(
        error: &impl std::fmt::Display,
        event: &impl std::fmt::Debug,
        user_id: Option<u64>,
    ) {
        error!(
            error = %error,
            event = ?event,
            user_id = ?user_id,
            "Update handler failed"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}
