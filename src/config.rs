use crate::error::{Result, StreamError};
use crate::streaming::ParserOptions;
use serde::Deserialize;
use std::env;
use std::fs;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";
pub const RECIPE_RECOMMEND_PATH: &str = "/api/v1/chat/recipe-recommend";
pub const MEAL_PLAN_CREATE_PATH: &str = "/api/v1/chat/meal-plan-create";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub parser: ParserOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the chat service, without a trailing path
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// Full URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.3,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = ClientConfig::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| StreamError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let mut config: ClientConfig = toml::from_str(&contents)
            .map_err(|e| StreamError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        // Allow environment variables to override file config
        config.apply_env()?;

        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(endpoint) = env::var("RECIPE_STREAM_ENDPOINT") {
            self.backend.endpoint = endpoint;
        }

        if let Ok(timeout) = env::var("RECIPE_STREAM_TIMEOUT_SECS") {
            self.backend.timeout_secs = timeout
                .parse::<u64>()
                .map_err(|e| StreamError::ConfigError(format!("Invalid timeout value: {}", e)))?;
        }

        if let Ok(max_tokens) = env::var("RECIPE_STREAM_MAX_TOKENS") {
            self.generation.max_tokens = max_tokens.parse::<u32>().map_err(|e| {
                StreamError::ConfigError(format!("Invalid max_tokens value: {}", e))
            })?;
        }

        if let Ok(temperature) = env::var("RECIPE_STREAM_TEMPERATURE") {
            self.generation.temperature = temperature.parse::<f64>().map_err(|e| {
                StreamError::ConfigError(format!("Invalid temperature value: {}", e))
            })?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.backend.endpoint.trim();
        if endpoint.is_empty() {
            return Err(StreamError::ConfigError("Endpoint is empty".to_string()));
        }

        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(StreamError::ConfigError(format!(
                "Endpoint must be an http(s) URL: {}",
                endpoint
            )));
        }

        if self.backend.timeout_secs == 0 {
            return Err(StreamError::ConfigError(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if self.generation.max_tokens == 0 {
            return Err(StreamError::ConfigError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(StreamError::ConfigError(format!(
                "Temperature out of range: {}",
                self.generation.temperature
            )));
        }

        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let valid_config = ClientConfig::default();
        assert!(valid_config.validate().is_ok());

        let mut invalid_config = ClientConfig::default();
        invalid_config.backend.timeout_secs = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = ClientConfig::default();
        invalid_config.backend.endpoint = "49.50.130.15:8000".to_string();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = ClientConfig::default();
        invalid_config.generation.temperature = 3.5;
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            [backend]
            endpoint = "https://chef.example.com/"
            timeout_secs = 30

            [parser]
            require_data_prefix = true
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.generation.max_tokens, 2000);
        assert!(config.parser.require_data_prefix);
        assert!(config.parser.lenient_envelopes);
        assert_eq!(
            config.backend.url(RECIPE_RECOMMEND_PATH),
            "https://chef.example.com/api/v1/chat/recipe-recommend"
        );
    }

    #[test]
    fn test_missing_config_file() {
        let result = ClientConfig::from_file("/nonexistent/recipe-stream.toml");
        match result {
            Err(StreamError::ConfigError(message)) => {
                assert!(message.starts_with("Failed to read config file"))
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }
}
