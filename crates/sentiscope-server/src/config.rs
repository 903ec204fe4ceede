//! Server configuration

use sentiscope_classifier::ModelConfig;
use sentiscope_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration, read from YAML and then overridden by CLI/env
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `sqlite:` URL or a plain file path
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret expected in the `X-API-Key` header
    #[serde(default)]
    pub api_key: Option<String>,

    /// Reject requests without a matching key
    #[serde(default)]
    pub require_api_key: bool,
}

// Keep the key out of startup logs
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("require_api_key", &self.require_api_key)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Exact origins, or `*` for any
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o.trim() == "*")
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_database_url() -> String {
    "sqlite:///./sentimentos.db".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost".to_string()]
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    /// Comma-separated list, as in `ALLOWED_ORIGIN`
    pub allowed_origins: Option<String>,
    pub database_url: Option<String>,
    pub model_dir: Option<String>,
    pub model_repo: Option<String>,
}

impl ServerConfig {
    /// Load configuration from file (if present) and apply overrides
    pub fn load(config_path: impl AsRef<Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let config_path = config_path.as_ref();

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content).map_err(|e| {
                Error::config(format!(
                    "Failed to parse {}: {}",
                    config_path.display(),
                    e
                ))
            })?
        } else {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.apply(overrides);
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(listen) = &overrides.listen {
            self.server.listen = listen.clone();
        }

        if let Some(port) = overrides.port {
            self.server.port = port;
        }

        if let Some(key) = &overrides.api_key {
            self.auth.api_key = Some(key.clone());
        }

        if let Some(origins) = &overrides.allowed_origins {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(url) = &overrides.database_url {
            self.database.url = url.clone();
        }

        if let Some(dir) = &overrides.model_dir {
            self.model = self.model.clone().with_model_dir(dir);
        }

        if let Some(repo) = &overrides.model_repo {
            self.model = self.model.clone().with_repo(repo);
        }
    }

    /// Settings the server refuses to start without
    pub fn validate(&self) -> Result<()> {
        match self.auth.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {}
            _ => return Err(Error::config("API_KEY is not set")),
        }

        if self.model.max_length == 0 {
            return Err(Error::config("model.max_length must be greater than zero"));
        }

        if self.model.min_batch_size == 0 {
            return Err(Error::config("model.min_batch_size must be greater than zero"));
        }

        Ok(())
    }
}
