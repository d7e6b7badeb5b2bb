//! Named n8n instances and the clients bound to them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

use crate::auth::AuthConfig;
use crate::client::RestClient;
use crate::error::ConfigError;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = ".config.json";
pub const HOST_ENV_VAR: &str = "N8N_HOST";
pub const API_KEY_ENV_VAR: &str = "N8N_API_KEY";
/// Instance name used when configuration comes from environment variables
pub const ENV_INSTANCE_NAME: &str = "default";

const API_PATH: &str = "/api/v1";

/// Connection profile of one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    #[serde(rename = "n8n_host")]
    pub host: String,
    #[serde(rename = "n8n_api_key")]
    pub api_key: String,
}

/// Contents of the instance config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub environments: BTreeMap<String, InstanceConfig>,
    #[serde(rename = "defaultEnv", default, skip_serializing_if = "Option::is_none")]
    pub default_env: Option<String>,
}

impl EnvironmentConfig {
    /// Config with a single instance, which is also the default
    pub fn single(
        name: impl Into<String>,
        host: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let mut environments = BTreeMap::new();
        environments.insert(
            name.clone(),
            InstanceConfig {
                host: host.into(),
                api_key: api_key.into(),
            },
        );
        Self {
            environments,
            default_env: Some(name),
        }
    }

    /// Read a JSON config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build a single `default` instance from `N8N_HOST` / `N8N_API_KEY`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var(HOST_ENV_VAR).ok(),
            std::env::var(API_KEY_ENV_VAR).ok(),
        )
    }

    fn from_vars(host: Option<String>, api_key: Option<String>) -> Result<Self, ConfigError> {
        let host = host
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::MissingEnvVar(HOST_ENV_VAR))?;
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingEnvVar(API_KEY_ENV_VAR))?;
        Ok(Self::single(ENV_INSTANCE_NAME, host, api_key))
    }

    /// Load configuration.
    ///
    /// Order: the explicit path, then `.config.json` in the working
    /// directory, then the `N8N_HOST` / `N8N_API_KEY` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), path, Self::from_env)
    }

    /// Same lookup as [`EnvironmentConfig::load`] with `.config.json`
    /// searched in `dir` and `fallback` used when no file applies
    fn load_from<F>(dir: &Path, path: Option<&Path>, fallback: F) -> Result<Self, ConfigError>
    where
        F: FnOnce() -> Result<Self, ConfigError>,
    {
        if let Some(path) = path {
            debug!("Loading instance config from {}", path.display());
            return Self::from_file(path);
        }

        let local = dir.join(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            debug!("Loading instance config from {}", local.display());
            return Self::from_file(&local);
        }

        debug!("No config file found, using environment variables");
        fallback()
    }

    /// Name of the default instance: `defaultEnv`, or the first instance by
    /// name when unset
    pub fn resolved_default(&self) -> Result<String, ConfigError> {
        match &self.default_env {
            Some(name) if self.environments.contains_key(name) => Ok(name.clone()),
            Some(name) => Err(ConfigError::UnknownDefault(name.clone())),
            None => self
                .environments
                .keys()
                .next()
                .cloned()
                .ok_or(ConfigError::NoEnvironments),
        }
    }
}

/// Turn a configured host into the API root URL.
///
/// A trailing slash is dropped and `/api/v1` appended unless present.
pub fn normalize_host(instance: &str, host: &str) -> Result<Url, ConfigError> {
    let trimmed = host.trim().trim_end_matches('/');
    let with_api = if trimmed.ends_with(API_PATH) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_PATH)
    };

    let url = Url::parse(&with_api).map_err(|e| ConfigError::InvalidHost {
        instance: instance.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidHost {
            instance: instance.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Registry of configured instances.
///
/// Clients are built once at construction; lookups never mutate the
/// registry.
#[derive(Debug, Clone)]
pub struct EnvironmentManager {
    clients: BTreeMap<String, RestClient>,
    default_env: String,
}

impl EnvironmentManager {
    pub fn from_config(config: &EnvironmentConfig) -> Result<Self, ConfigError> {
        if config.environments.is_empty() {
            return Err(ConfigError::NoEnvironments);
        }
        let default_env = config.resolved_default()?;

        let mut clients = BTreeMap::new();
        for (name, instance) in &config.environments {
            let base_url = normalize_host(name, &instance.host)?;
            let client = RestClient::new(base_url, AuthConfig::with_api_key(&instance.api_key))
                .map_err(|source| ConfigError::Client {
                    instance: name.clone(),
                    source,
                })?;
            clients.insert(name.clone(), client);
        }

        info!(
            "Configured {} n8n instance(s), default '{}'",
            clients.len(),
            default_env
        );

        Ok(Self {
            clients,
            default_env,
        })
    }

    /// Load configuration (see [`EnvironmentConfig::load`]) and build the registry
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_config(&EnvironmentConfig::load(path)?)
    }

    /// Configured instance names, sorted
    pub fn available_environments(&self) -> Vec<String> {
        self.clients.keys().cloned().collect()
    }

    pub fn default_environment(&self) -> &str {
        &self.default_env
    }

    pub fn contains(&self, instance: &str) -> bool {
        self.clients.contains_key(instance)
    }

    /// Client for `instance`, or for the default instance when `None`
    pub fn client(&self, instance: Option<&str>) -> Result<&RestClient, ConfigError> {
        let name = instance.unwrap_or(&self.default_env);
        self.clients
            .get(name)
            .ok_or_else(|| ConfigError::UnknownInstance {
                instance: name.to_string(),
                available: self.available_environments(),
            })
    }
}
