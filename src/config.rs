//! Configuration for the skill and its HTTP host
//!
//! Loaded from TOML. Every field has a default so the skill can run with no
//! configuration file at all.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable overriding the HTTP listen port
pub const PORT_ENV: &str = "SKILL_PORT";

/// Main skill configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SkillConfig {
    #[serde(default)]
    pub skill: SkillSection,
    #[serde(default)]
    pub server: ServerSection,
}

/// Skill identity and request gating
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillSection {
    /// Skill identifier used in logs and health output (must match [a-zA-Z0-9._-]+)
    #[serde(default = "default_skill_id")]
    pub id: String,
    /// Only accept events from this application id when set
    pub application_id: Option<String>,
    /// Environment variable holding the application id; wins over `application_id`
    pub application_id_env: Option<String>,
}

impl Default for SkillSection {
    fn default() -> Self {
        Self {
            id: default_skill_id(),
            application_id: None,
            application_id_env: None,
        }
    }
}

fn default_skill_id() -> String {
    "macro-nutrition".to_string()
}

/// HTTP host settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    #[error("Invalid skill ID format: {0}")]
    InvalidSkillId(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SkillConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SkillConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field formats
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_skill_id(&self.skill.id)?;

        if let Some(app_id) = &self.skill.application_id {
            if app_id.trim().is_empty() {
                return Err(ConfigError::InvalidConfig(
                    "skill.application_id must not be empty when set".to_string(),
                ));
            }
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "server.host must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Helper method to get environment variable with error propagation
    fn get_env_var_required(env_var_name: &str) -> Result<String, ConfigError> {
        std::env::var(env_var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(env_var_name.to_string()))
    }

    /// Application id the skill should accept, if gating is enabled
    ///
    /// A configured `application_id_env` must resolve; a missing variable is
    /// an error rather than silently disabling the check.
    pub fn expected_application_id(&self) -> Result<Option<String>, ConfigError> {
        match &self.skill.application_id_env {
            Some(env_name) => Self::get_env_var_required(env_name).map(Some),
            None => Ok(self.skill.application_id.clone()),
        }
    }

    /// Listen port, honouring the `SKILL_PORT` override
    pub fn listen_port(&self) -> u16 {
        std::env::var(PORT_ENV)
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(self.server.port)
    }
}

/// Validate skill ID format
fn validate_skill_id(skill_id: &str) -> Result<(), ConfigError> {
    let valid_chars = skill_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');

    if skill_id.is_empty() || !valid_chars {
        return Err(ConfigError::InvalidSkillId(format!(
            "Skill ID '{skill_id}' must match pattern [a-zA-Z0-9._-]+"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let toml_content = r#"
[skill]
id = "macro-nutrition"
application_id = "amzn1.ask.skill.1234"

[server]
host = "127.0.0.1"
port = 3000
"#;

        let config = SkillConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.skill.id, "macro-nutrition");
        assert_eq!(
            config.skill.application_id.as_deref(),
            Some("amzn1.ask.skill.1234")
        );
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SkillConfig::from_toml_str("").unwrap();
        assert_eq!(config, SkillConfig::default());
        assert_eq!(config.skill.id, "macro-nutrition");
        assert_eq!(config.skill.application_id, None);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_invalid_skill_id() {
        assert!(validate_skill_id("invalid@skill").is_err());
        assert!(validate_skill_id("").is_err());
        assert!(validate_skill_id("valid-skill_123.test").is_ok());
    }

    #[test]
    fn test_empty_application_id_rejected() {
        let result = SkillConfig::from_toml_str(
            r#"
[skill]
application_id = "  "
"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_expected_application_id_from_literal() {
        let mut config = SkillConfig::default();
        assert_eq!(config.expected_application_id().unwrap(), None);

        config.skill.application_id = Some("amzn1.ask.skill.abc".to_string());
        assert_eq!(
            config.expected_application_id().unwrap().as_deref(),
            Some("amzn1.ask.skill.abc")
        );
    }

    #[test]
    fn test_expected_application_id_missing_env_var() {
        let mut config = SkillConfig::default();
        config.skill.application_id_env =
            Some("MACROSKILL_TEST_SURELY_UNSET_APPLICATION_ID".to_string());

        let result = config.expected_application_id();
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = SkillConfig::from_toml_str("[skill\nid = ");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }
}
