//! Tunables of the navigation engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors raised while loading a [`NavigatorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read navigator config: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML or names unknown settings.
    #[error("failed to parse navigator config: {source}")]
    Toml {
        /// The underlying TOML error.
        #[from]
        source: toml::de::Error,
    },
    /// A setting holds a value the engine cannot work with.
    #[error("`{0}` must be at least 1")]
    Zero(&'static str),
}

/// Limits applied to every maze attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigatorConfig {
    /// Attempts per oracle request before the maze attempt is abandoned.
    pub max_oracle_attempts: u32,
    /// Moves allowed per maze attempt.
    pub move_budget: u32,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            max_oracle_attempts: 3,
            move_budget: 100_000,
        }
    }
}

impl NavigatorConfig {
    /// Parses configuration from TOML text; missing settings keep their defaults.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.max_oracle_attempts == 0 {
            return Err(ConfigError::Zero("max_oracle_attempts"));
        }
        if self.move_budget == 0 {
            return Err(ConfigError::Zero("move_budget"));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = NavigatorConfig::parse("").expect("empty config is valid");
        assert_eq!(config, NavigatorConfig::default());
        assert_eq!(config.max_oracle_attempts, 3);
    }

    #[test]
    fn settings_override_defaults() {
        let config = NavigatorConfig::parse("max_oracle_attempts = 5\nmove_budget = 40\n")
            .expect("valid config");
        assert_eq!(config.max_oracle_attempts, 5);
        assert_eq!(config.move_budget, 40);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(matches!(
            NavigatorConfig::parse("max_oracle_attempts = 0"),
            Err(ConfigError::Zero("max_oracle_attempts"))
        ));
        assert!(matches!(
            NavigatorConfig::parse("retries = 2"),
            Err(ConfigError::Toml { .. })
        ));
    }
}
