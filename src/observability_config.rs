//! # Observability Configuration
//!
//! Environment-specific configuration for logging and metrics export.

use crate::errors::{AppError, AppResult};

/// Observability configuration for different environments
#[derive(Debug, Clone, PartialEq)]
pub struct ObservabilityConfig {
    /// Environment name (development, staging, production)
    pub environment: String,
    /// Log level applied to the `profile_bot` target
    pub log_level: String,
    /// Log output format (`pretty` or `json`); `None` picks by environment
    pub log_format: Option<String>,
    /// Prometheus metrics endpoint port
    pub metrics_port: u16,
    /// Whether to serve the Prometheus endpoint
    pub enable_metrics_export: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_format: None,
            metrics_port: 9090,
            enable_metrics_export: true,
        }
    }
}

impl ObservabilityConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unparseable numeric or boolean values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT").map(|f| f.to_lowercase()),
            metrics_port: lookup("METRICS_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.metrics_port),
            enable_metrics_export: lookup("ENABLE_METRICS_EXPORT")
                .and_then(|v| v.to_lowercase().parse().ok())
                .unwrap_or(defaults.enable_metrics_export),
        }
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Whether logs should be emitted as human-readable text rather than JSON
    pub fn use_pretty_logs(&self) -> bool {
        match self.log_format.as_deref() {
            Some("pretty") => true,
            Some(_) => false,
            None => self.is_development(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> AppResult<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "Invalid log level: {}",
                self.log_level
            )));
        }

        if let Some(format) = &self.log_format {
            if format != "pretty" && format != "json" {
                return Err(AppError::Config(format!(
                    "Invalid log format: {} (expected 'pretty' or 'json')",
                    format
                )));
            }
        }

        if self.enable_metrics_export && self.metrics_port == 0 {
            return Err(AppError::Config(
                "Metrics port cannot be 0 when metrics export is enabled".to_string(),
            ));
        }

        Ok(())
    }
}
