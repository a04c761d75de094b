//! # Unified Application Configuration
//!
//! This module provides a centralized configuration system that consolidates
//! all application settings into a single, structured configuration object.
//! Values are read from environment variables (optionally seeded from a `.env`
//! file) and validated before the bot starts serving updates.

use crate::errors::{AppError, AppResult};
use crate::observability_config::ObservabilityConfig;
use std::path::PathBuf;

/// Default location of the persisted profile table
pub const DEFAULT_DATA_FILE: &str = "bot_data.json";

/// Bot-specific configuration settings
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    /// Telegram bot token
    pub token: String,
    /// The single user allowed to run `/broadcast`
    pub admin_user_id: u64,
    /// HTTP client timeout in seconds
    pub http_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            admin_user_id: 0,
            http_timeout_secs: 30,
        }
    }
}

impl BotConfig {
    /// Validate bot configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.token.trim().is_empty() {
            return Err(AppError::Config("Bot token cannot be empty".to_string()));
        }

        let parts: Vec<&str> = self.token.split(':').collect();
        if parts.len() != 2 {
            return Err(AppError::Config(
                "Bot token format is invalid. Expected format: 'bot_id:bot_token'".to_string(),
            ));
        }

        if parts[0].parse::<u64>().is_err() {
            return Err(AppError::Config(
                "Bot token bot ID must be numeric".to_string(),
            ));
        }

        if parts[1].len() < 20 {
            return Err(AppError::Config(
                "Bot token appears to be too short. Please verify it's a valid token".to_string(),
            ));
        }

        if self.admin_user_id == 0 {
            return Err(AppError::Config(
                "Administrator user ID must be a positive number".to_string(),
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(AppError::Config("HTTP timeout cannot be 0".to_string()));
        }

        if self.http_timeout_secs > 300 {
            return Err(AppError::Config(
                "HTTP timeout cannot be greater than 300 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

/// Profile persistence settings
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    /// Path of the JSON file holding the profile table
    pub data_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(AppError::Config(
                "Profile data file path cannot be empty".to_string(),
            ));
        }
        if self.data_file.is_dir() {
            return Err(AppError::Config(format!(
                "Profile data file path points to a directory: {}",
                self.data_file.display()
            )));
        }
        Ok(())
    }
}

/// Main application configuration containing all settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        config.bot.token = lookup("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            AppError::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required but not set".to_string(),
            )
        })?;

        config.bot.admin_user_id = lookup("ADMIN_USER_ID")
            .ok_or_else(|| {
                AppError::Config(
                    "ADMIN_USER_ID environment variable is required but not set".to_string(),
                )
            })?
            .trim()
            .parse()
            .map_err(|_| AppError::Config("ADMIN_USER_ID must be a numeric user ID".to_string()))?;

        if let Some(timeout) = lookup("HTTP_CLIENT_TIMEOUT_SECS") {
            config.bot.http_timeout_secs = timeout.trim().parse().map_err(|_| {
                AppError::Config(
                    "HTTP_CLIENT_TIMEOUT_SECS must be a valid number of seconds".to_string(),
                )
            })?;
        }

        if let Some(path) = lookup("PROFILE_DATA_FILE") {
            config.storage.data_file = PathBuf::from(path);
        }

        config.observability = ObservabilityConfig::from_lookup(&lookup);

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.bot.validate()?;
        self.storage.validate()?;
        self.observability.validate()?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: bot_token=[REDACTED], admin_user_id={}, data_file={}, http_timeout_secs={}, metrics_port={}, metrics_enabled={}",
            self.bot.admin_user_id,
            self.storage.data_file.display(),
            self.bot.http_timeout_secs,
            self.observability.metrics_port,
            self.observability.enable_metrics_export
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const VALID_TOKEN: &str = "123456789:AAFakeTokenForTestingPurposes1234567890";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_bot_config_validation() {
        let mut config = BotConfig::default();

        // Invalid: empty token
        assert!(config.validate().is_err());

        // Invalid: malformed token
        config.token = "invalid-token".to_string();
        assert!(config.validate().is_err());

        // Invalid: short token
        config.token = "123:short".to_string();
        assert!(config.validate().is_err());

        // Invalid: missing admin
        config.token = VALID_TOKEN.to_string();
        assert!(config.validate().is_err());

        config.admin_user_id = 7613045174;
        assert!(config.validate().is_ok());

        config.http_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.http_timeout_secs = 301;
        assert!(config.validate().is_err());
        config.http_timeout_secs = 30;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_applies_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", VALID_TOKEN),
            ("ADMIN_USER_ID", "42"),
        ]))
        .unwrap();

        assert_eq!(config.bot.admin_user_id, 42);
        assert_eq!(config.bot.http_timeout_secs, 30);
        assert_eq!(config.storage.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", VALID_TOKEN),
            ("ADMIN_USER_ID", " 99 "),
            ("PROFILE_DATA_FILE", "/tmp/profiles.json"),
            ("HTTP_CLIENT_TIMEOUT_SECS", "12"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.bot.admin_user_id, 99);
        assert_eq!(config.bot.http_timeout_secs, 12);
        assert_eq!(config.storage.data_file, PathBuf::from("/tmp/profiles.json"));
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_missing_required_values() {
        let err = AppConfig::from_lookup(lookup_from(&[("ADMIN_USER_ID", "42")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = AppConfig::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", VALID_TOKEN)]))
            .unwrap_err();
        assert!(err.to_string().contains("ADMIN_USER_ID"));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", VALID_TOKEN),
            ("ADMIN_USER_ID", "admin"),
        ]))
        .unwrap_err();
        assert!(err.to_string().starts_with("[CONFIG]"));
    }

    #[test]
    fn test_summary_redacts_token() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", VALID_TOKEN),
            ("ADMIN_USER_ID", "42"),
        ]))
        .unwrap();
        let summary = config.summary();
        assert!(!summary.contains(VALID_TOKEN));
        assert!(summary.contains("[REDACTED]"));
    }
}
