use std::path::{Path, PathBuf};

use crate::config::prompts::PromptTemplates;
use crate::config::schema::AgentConfig;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

const CONFIG_FILE_NAME: &str = "config.json";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AgentConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<AgentConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: AgentConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads the config at `path` if it exists, otherwise returns the defaults.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<AgentConfig, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        Ok(AgentConfig::default())
    }
}

/// `<platform config dir>/article-agent/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("article-agent").join(CONFIG_FILE_NAME))
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &AgentConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if let Some(temperature) = config.model.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Validation {
                message: format!("Temperature must be between 0.0 and 2.0, got {}", temperature),
            });
        }
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "timeout_secs must be greater than zero".to_string(),
        });
    }

    let base_url = &config.api.base_url;
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation {
            message: format!("base_url must be an http(s) URL: {}", base_url),
        });
    }

    config.prompt_templates().validate()
}

impl AgentConfig {
    /// Preset templates with any configured overrides applied.
    pub fn prompt_templates(&self) -> PromptTemplates {
        PromptTemplates::for_preset(self.model.preset).with_overrides(&self.prompts)
    }
}
