//! Configuration management for Promptsmith CLI
//!
//! Stores defaults and per-provider model overrides in
//! ~/.config/promptsmith/config.toml. Credentials and the library live in
//! the data directory, not here.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use promptsmith::{IdSource, OutputFormat, ParameterSchema, Provider};

const APP_DIR: &str = "promptsmith";
const CONFIG_FILE: &str = "config.toml";

/// CLI Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_provider")]
    pub provider: Provider,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub schema: ParameterSchema,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How new library entry ids are generated
    #[serde(default)]
    pub id_source: IdSource,
    /// Overrides the platform data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Model name per provider, keyed by provider name
    #[serde(default)]
    pub models: HashMap<String, String>,
}

fn default_provider() -> Provider {
    Provider::OpenAI
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            format: OutputFormat::default(),
            schema: ParameterSchema::default(),
            timeout_secs: default_timeout_secs(),
            id_source: IdSource::default(),
            data_dir: None,
            models: HashMap::new(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(APP_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config file")
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Directory holding the library blob and stored credentials
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_dir()
                .context("Could not determine data directory")?
                .join(APP_DIR)),
        }
    }

    /// Model for `provider`, or the provider default
    pub fn model_for(&self, provider: Provider) -> String {
        self.models
            .get(&provider.to_string())
            .cloned()
            .unwrap_or_else(|| provider.default_model().to_string())
    }

    pub fn set_model(&mut self, provider: Provider, model: String) {
        self.models.insert(provider.to_string(), model);
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse(
            r#"
provider = "anthropic"
format = "yaml"
id_source = "timestamp"

[models]
anthropic = "claude-test"
"#,
        )
        .unwrap();

        assert_eq!(config.provider, Provider::Anthropic);
        assert_eq!(config.format, OutputFormat::Yaml);
        assert_eq!(config.schema, ParameterSchema::Extended);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.id_source, IdSource::Timestamp);
        assert_eq!(config.model_for(Provider::Anthropic), "claude-test");
        assert_eq!(config.model_for(Provider::OpenAI), "gpt-4o-mini");
    }

    #[test]
    fn test_round_trip() {
        let mut config = Config::default();
        config.set_model(Provider::Google, "gemini-test".to_string());
        config.data_dir = Some(PathBuf::from("/tmp/promptsmith"));

        let content = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::parse(&content).unwrap();
        assert_eq!(parsed.model_for(Provider::Google), "gemini-test");
        assert_eq!(parsed.data_dir, config.data_dir);
    }
}
