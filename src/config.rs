//! Deployment configuration: which strategy backs suggestions and analysis.
//!
//! Loaded from a TOML file or from the environment:
//!
//! ```toml
//! strategy = "remote"
//!
//! [remote]
//! model = "google/gemini-2.5-flash"
//! timeout_secs = 30
//! ```
//!
//! The API key is read from `OPENROUTER_API_KEY` when the file does not set it.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{Analyzer, RemoteAnalyzer, StaticAnalyzer};
use crate::gateway::openrouter::{OpenRouterSettings, DEFAULT_BASE_URL};
use crate::gateway::{ChatGateway, GatewayConfig, ProviderError, ProviderGateway};
use crate::suggestions::{RemoteSuggestions, StaticSuggestions, SuggestionProvider};

pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

pub const ENV_STRATEGY: &str = "MAPPER_STRATEGY";
pub const ENV_MODEL: &str = "MAPPER_MODEL";
pub const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_BASE_URL: &str = "OPENROUTER_BASE_URL";
pub const ENV_TIMEOUT_SECONDS: &str = "OPENROUTER_TIMEOUT_SECONDS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("failed to build gateway: {0}")]
    Gateway(#[from] ProviderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Static,
    Remote,
}

impl std::str::FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(StrategyKind::Static),
            "remote" => Ok(StrategyKind::Remote),
            other => Err(ConfigError::Invalid(format!(
                "unknown strategy {other:?} (expected \"static\" or \"remote\")"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub model: String,
    /// Falls back to `OPENROUTER_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub referer: Option<String>,
    pub app_title: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 2,
            retry_base_delay_ms: 500,
            referer: None,
            app_title: Some("Systems Change Mapper".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub strategy: StrategyKind,
    pub remote: RemoteConfig,
}

impl MapperConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: MapperConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file, filling a missing API key from the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: MapperConfig = toml::from_str(&raw)?;
        if config.remote.api_key.is_none() {
            config.remote.api_key = std::env::var(ENV_API_KEY).ok();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. `from_env` uses the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = MapperConfig::default();

        if let Some(strategy) = lookup(ENV_STRATEGY) {
            config.strategy = strategy.parse()?;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            config.remote.model = model;
        }
        config.remote.api_key = lookup(ENV_API_KEY);
        if let Some(url) = lookup(ENV_BASE_URL) {
            config.remote.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECONDS) {
            config.remote.timeout_secs = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_TIMEOUT_SECONDS} must be an integer, got {raw:?}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let remote = &self.remote;
        if remote.model.trim().is_empty() {
            return Err(ConfigError::Invalid("remote.model must be non-empty".into()));
        }
        if remote.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("remote.base_url must be non-empty".into()));
        }
        if remote.timeout_secs == 0 {
            return Err(ConfigError::Invalid("remote.timeout_secs must be >= 1".into()));
        }
        if self.strategy == StrategyKind::Remote
            && remote.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "remote strategy requires an API key ({ENV_API_KEY})"
            )));
        }
        Ok(())
    }
}

impl RemoteConfig {
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            max_retries: self.max_retries,
            retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    pub fn openrouter_settings(&self) -> Result<OpenRouterSettings, ConfigError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| ConfigError::Invalid(format!("missing API key ({ENV_API_KEY})")))?;
        let mut settings = OpenRouterSettings::new(api_key)
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(self.timeout_secs));
        settings.referer = self.referer.clone();
        settings.app_title = self.app_title.clone();
        Ok(settings)
    }
}

/// The strategy pair a session runs with.
#[derive(Clone)]
pub struct Strategies {
    pub suggestions: Arc<dyn SuggestionProvider>,
    pub analyzer: Arc<dyn Analyzer>,
}

impl Strategies {
    pub fn offline() -> Self {
        Self {
            suggestions: Arc::new(StaticSuggestions),
            analyzer: Arc::new(StaticAnalyzer),
        }
    }

    /// Both strategies backed by one shared gateway.
    pub fn remote(gateway: Arc<dyn ChatGateway>, model: &str) -> Self {
        Self {
            suggestions: Arc::new(RemoteSuggestions::new(gateway.clone(), model)),
            analyzer: Arc::new(RemoteAnalyzer::new(gateway, model)),
        }
    }

    /// Like [`Strategies::remote`], with every request tagged by `session_id`.
    pub fn remote_for_session(gateway: Arc<dyn ChatGateway>, model: &str, session_id: Uuid) -> Self {
        Self {
            suggestions: Arc::new(
                RemoteSuggestions::new(gateway.clone(), model).with_session(session_id),
            ),
            analyzer: Arc::new(RemoteAnalyzer::new(gateway, model).with_session(session_id)),
        }
    }
}

/// Build the configured strategies.
pub fn build_strategies(config: &MapperConfig) -> Result<Strategies, ConfigError> {
    build(config, None)
}

/// Build the configured strategies for one mapping session.
pub fn build_session_strategies(
    config: &MapperConfig,
    session_id: Uuid,
) -> Result<Strategies, ConfigError> {
    build(config, Some(session_id))
}

fn build(config: &MapperConfig, session_id: Option<Uuid>) -> Result<Strategies, ConfigError> {
    config.validate()?;
    match config.strategy {
        StrategyKind::Static => Ok(Strategies::offline()),
        StrategyKind::Remote => {
            let gateway: Arc<dyn ChatGateway> = Arc::new(ProviderGateway::openrouter(
                config.remote.openrouter_settings()?,
                config.remote.gateway_config(),
            )?);
            let model = &config.remote.model;
            Ok(match session_id {
                Some(id) => Strategies::remote_for_session(gateway, model, id),
                None => Strategies::remote(gateway, model),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_to_static() {
        let config = MapperConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.strategy, StrategyKind::Static);
        assert_eq!(config.remote.model, DEFAULT_MODEL);
    }

    #[test]
    fn remote_from_env_vars() {
        let config = MapperConfig::from_lookup(lookup(&[
            (ENV_STRATEGY, "Remote"),
            (ENV_API_KEY, "sk-test"),
            (ENV_MODEL, "openai/gpt-5-mini"),
            (ENV_TIMEOUT_SECONDS, "12"),
        ]))
        .unwrap();
        assert_eq!(config.strategy, StrategyKind::Remote);
        assert_eq!(config.remote.model, "openai/gpt-5-mini");
        assert_eq!(config.remote.timeout_secs, 12);
    }

    #[test]
    fn remote_without_key_is_rejected() {
        let err = MapperConfig::from_lookup(lookup(&[(ENV_STRATEGY, "remote")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(MapperConfig::from_lookup(lookup(&[(ENV_STRATEGY, "magic")])).is_err());
        assert!(MapperConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECONDS, "soon")])).is_err());
        assert!(MapperConfig::from_toml_str("[remote]\ntimeout_secs = 0").is_err());
        assert!(MapperConfig::from_toml_str("[remote]\nmodel = \"  \"").is_err());
    }

    #[test]
    fn toml_partial_overrides_keep_defaults() {
        let config = MapperConfig::from_toml_str(
            "strategy = \"remote\"\n[remote]\napi_key = \"sk-file\"\nmax_retries = 0\n",
        )
        .unwrap();
        assert_eq!(config.remote.max_retries, 0);
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.remote.gateway_config().max_retries, 0);
    }

    #[test]
    fn build_static_strategies() {
        let strategies = build_strategies(&MapperConfig::default()).unwrap();
        assert_eq!(strategies.suggestions.name(), "static");
        assert_eq!(strategies.analyzer.name(), "static");
    }

    #[test]
    fn build_remote_strategies() {
        let config = MapperConfig::from_toml_str(
            "strategy = \"remote\"\n[remote]\napi_key = \"sk-file\"\nbase_url = \"http://127.0.0.1:9\"\n",
        )
        .unwrap();
        let strategies = build_strategies(&config).unwrap();
        assert_eq!(strategies.suggestions.name(), "remote");
        assert_eq!(strategies.analyzer.name(), "remote");
    }
}
