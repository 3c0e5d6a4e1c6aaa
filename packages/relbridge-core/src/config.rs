//! Adapter configuration.
//!
//! Supports TOML files, environment variable overrides, and defaults.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::datasource::IsolationLevel;
use crate::error::{Result, ServiceFault};
use crate::sql::SqlDialect;
use crate::transaction::CommitMode;

/// Adapter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Identifier mixed into every version tag (default: "default")
    pub scope_id: String,
    /// When transactional writes are committed
    pub commit_mode: CommitMode,
    /// Isolation level requested when a transaction opens
    pub isolation: IsolationLevel,
    /// Identifier quoting and placeholder style
    pub dialect: SqlDialect,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            scope_id: "default".to_string(),
            commit_mode: CommitMode::PerStatement,
            isolation: IsolationLevel::RepeatableRead,
            dialect: SqlDialect::default(),
        }
    }
}

impl BridgeConfig {
    /// Creates a configuration with the given scope id and defaults otherwise.
    pub fn with_scope(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ServiceFault::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| ServiceFault::Config(format!("Invalid TOML: {}", e)))
    }

    /// Saves the configuration to a TOML file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ServiceFault::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), toml)
            .map_err(|e| ServiceFault::Config(format!("Failed to write config file: {}", e)))?;
        Ok(())
    }

    /// Applies environment variable overrides.
    /// Variables are prefixed with `RELBRIDGE_`.
    /// Example: `RELBRIDGE_SCOPE_ID=orders` overrides `scope_id`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("RELBRIDGE_SCOPE_ID") {
            self.scope_id = val;
        }
        if let Ok(val) = env::var("RELBRIDGE_COMMIT_MODE") {
            self.commit_mode = val
                .parse()
                .map_err(|e| ServiceFault::Config(format!("Invalid commit_mode: {}", e)))?;
        }
        if let Ok(val) = env::var("RELBRIDGE_ISOLATION") {
            self.isolation = val
                .parse()
                .map_err(|e| ServiceFault::Config(format!("Invalid isolation: {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{IdentifierQuote, PlaceholderStyle};
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.scope_id, "default");
        assert_eq!(config.commit_mode, CommitMode::PerStatement);
        assert_eq!(config.isolation, IsolationLevel::RepeatableRead);
        assert_eq!(config.dialect.identifier_quote, IdentifierQuote::Ansi);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
            scope_id = "orders"
            commit_mode = "on_close"
            isolation = "serializable"

            [dialect]
            identifier_quote = "backtick"
            placeholder = "dollar"
        "#;
        let config = BridgeConfig::from_toml(toml).unwrap();
        assert_eq!(config.scope_id, "orders");
        assert_eq!(config.commit_mode, CommitMode::OnClose);
        assert_eq!(config.isolation, IsolationLevel::Serializable);
        assert_eq!(config.dialect.identifier_quote, IdentifierQuote::Backtick);
        assert_eq!(config.dialect.placeholder, PlaceholderStyle::Dollar);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BridgeConfig::from_toml("scope_id = \"crm\"").unwrap();
        assert_eq!(config.scope_id, "crm");
        assert_eq!(config.commit_mode, CommitMode::PerStatement);
    }

    #[test]
    fn test_invalid_toml() {
        let err = BridgeConfig::from_toml("commit_mode = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ServiceFault::Config(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("relbridge.toml");
        let config = BridgeConfig {
            commit_mode: CommitMode::OnClose,
            ..BridgeConfig::with_scope("inventory")
        };
        config.save_to_file(&file_path).unwrap();
        let loaded = BridgeConfig::from_file(&file_path).unwrap();
        assert_eq!(loaded, config);
    }
}
