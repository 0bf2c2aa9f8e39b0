//! Core runtime configuration.
//!
//! # Responsibility
//! - Declare tunables for persistence and logging with safe defaults.
//! - Parse and validate JSON configuration documents.
//!
//! # Invariants
//! - A validated config has a usable storage key and at least one write attempt.

use crate::logging::default_log_level;
use crate::storage::validate_key;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized collection.
pub const DEFAULT_STORAGE_KEY: &str = "notes";
/// Attempts per write-through before the failure is surfaced.
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 3;

/// What to do when the stored collection cannot be read back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Start from the readable part, keeping a backup copy of the raw blob.
    #[default]
    Recover,
    /// Refuse to load and report the damage.
    Strict,
}

/// Configuration for one note store instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub storage_key: String,
    pub max_write_attempts: u32,
    pub load_policy: LoadPolicy,
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
            load_policy: LoadPolicy::default(),
            log_level: default_log_level().to_string(),
        }
    }
}

impl CoreConfig {
    /// Parses a JSON document; absent fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if validate_key(&self.storage_key).is_err() {
            return Err(ConfigError::InvalidStorageKey(self.storage_key.clone()));
        }
        if self.max_write_attempts == 0 {
            return Err(ConfigError::ZeroWriteAttempts);
        }
        Ok(())
    }
}

/// Configuration parse/validation error.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidStorageKey(String),
    ZeroWriteAttempts,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
            Self::InvalidStorageKey(key) => write!(f, "invalid storage_key `{key}`"),
            Self::ZeroWriteAttempts => write!(f, "max_write_attempts must be at least 1"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, LoadPolicy, DEFAULT_STORAGE_KEY};

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.load_policy, LoadPolicy::Recover);
    }

    #[test]
    fn parses_overrides() {
        let config = CoreConfig::from_json_str(
            r#"{"storage_key":"work-notes","max_write_attempts":1,"load_policy":"strict"}"#,
        )
        .unwrap();
        assert_eq!(config.storage_key, "work-notes");
        assert_eq!(config.max_write_attempts, 1);
        assert_eq!(config.load_policy, LoadPolicy::Strict);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = CoreConfig::from_json_str(r#"{"max_write_attempts":0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroWriteAttempts));

        let err = CoreConfig::from_json_str(r#"{"storage_key":"a/b"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStorageKey(_)));

        let err = CoreConfig::from_json_str(r#"{"unknown":true}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
