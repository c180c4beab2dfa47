//! Configuration management for the playground
//!
//! Loads configuration with priority:
//! 1. config.toml (or specified config file)
//! 2. Environment variables (fallback)
//! 3. Defaults

use crate::error::{Error, Result as CoreResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the Passport API key used by the credentialed proxy.
pub const API_KEY_ENV: &str = "PASSPORT_API_KEY";

/// Environment variable holding the scorer id used to pre-fill drafts.
pub const SCORER_ID_ENV: &str = "PASSPORT_SCORER_ID";

/// Playground configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaygroundConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub spec: SpecConfig,

    #[serde(default)]
    pub upstreams: UpstreamConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin the browser uses to reach the proxy routes.
    /// Derived from host and port when unset.
    pub public_origin: Option<String>,
}

/// Where the OpenAPI document lives and how long a fetched copy stays fresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecConfig {
    #[serde(default = "default_spec_url")]
    pub url: String,

    #[serde(default = "default_revalidate_secs")]
    pub revalidate_secs: u64,
}

/// Base URLs of the three upstream APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_passport_base")]
    pub passport: String,

    #[serde(default = "default_holonym_base")]
    pub holonym: String,

    #[serde(default = "default_sign_base")]
    pub sign: String,
}

/// Server-held secrets and draft defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Passport API key (can reference env var with ${VAR_NAME})
    pub api_key: Option<String>,

    /// Scorer id used to pre-fill `scorer_id` path parameters
    pub default_scorer_id: Option<String>,

    /// Seed drafts from the defaults above
    #[serde(default = "default_true")]
    pub use_test_credentials: bool,
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub service_name: Option<String>,

    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_origin: None,
        }
    }
}

impl Default for SpecConfig {
    fn default() -> Self {
        Self {
            url: default_spec_url(),
            revalidate_secs: default_revalidate_secs(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            passport: default_passport_base(),
            holonym: default_holonym_base(),
            sign: default_sign_base(),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_scorer_id: None,
            use_test_credentials: true,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServerConfig {
    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn public_origin(&self) -> String {
        self.public_origin
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }
}

impl SpecConfig {
    pub fn revalidate_after(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

impl CredentialsConfig {
    /// The Passport API key, or a `MissingCredential` error when it was never provisioned.
    pub fn require_api_key(&self) -> CoreResult<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::MissingCredential("API key".to_string())),
        }
    }

    /// Scorer id to seed drafts with, honouring `use_test_credentials`.
    pub fn seed_scorer_id(&self) -> &str {
        if self.use_test_credentials {
            self.default_scorer_id.as_deref().unwrap_or_default()
        } else {
            ""
        }
    }
}

impl ObservabilityConfig {
    pub fn service_name(&self) -> &str {
        self.service_name.as_deref().unwrap_or("api-playground")
    }
}

impl PlaygroundConfig {
    /// Load configuration with the following priority:
    /// 1. `CONFIG_FILE` environment variable
    /// 2. config.toml in current directory or a parent
    /// 3. Environment variables (fallback)
    /// 4. Defaults
    pub fn load() -> Result<Self> {
        if let Ok(config_path) = env::var("CONFIG_FILE") {
            return Self::load_from(Some(PathBuf::from(config_path).as_path()));
        }

        match Self::find_config_file() {
            Some(path) => Self::load_from(Some(path.as_path())),
            None => {
                tracing::debug!("No config.toml found, using environment and defaults");
                Ok(Self::from_env())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let Some(config_path) = path.map(Path::to_path_buf).or_else(Self::find_config_file) else {
            return Ok(Self::from_env());
        };

        tracing::debug!("Loading configuration from: {:?}", config_path);

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))
    }

    /// Parse configuration from TOML text and resolve env references.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut config: PlaygroundConfig = toml::from_str(contents)?;
        config.resolve_env_vars();
        Ok(config)
    }

    /// Defaults with secrets taken from the environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.resolve_env_vars();
        config
    }

    /// Find config.toml by searching current directory and parents
    fn find_config_file() -> Option<PathBuf> {
        let mut current = env::current_dir().ok()?;

        loop {
            let config_path = current.join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Resolve ${VAR_NAME} references to environment variables
    fn resolve_env_vars(&mut self) {
        self.credentials.api_key =
            Self::resolve_secret(self.credentials.api_key.take(), API_KEY_ENV);
        self.credentials.default_scorer_id =
            Self::resolve_secret(self.credentials.default_scorer_id.take(), SCORER_ID_ENV);

        for base in [
            &mut self.upstreams.passport,
            &mut self.upstreams.holonym,
            &mut self.upstreams.sign,
            &mut self.spec.url,
        ] {
            if let Some(resolved) = Self::resolve_env_var(base) {
                *base = resolved;
            }
        }
    }

    /// Explicit value (or reference) first, then the well-known variable.
    fn resolve_secret(value: Option<String>, fallback_var: &str) -> Option<String> {
        match value {
            Some(v) if !v.is_empty() => Self::resolve_env_var(&v),
            _ => env::var(fallback_var).ok(),
        }
        .filter(|v| !v.is_empty())
    }

    /// Resolve a single ${VAR_NAME} reference
    fn resolve_env_var(value: &str) -> Option<String> {
        if value.starts_with("${") && value.ends_with('}') {
            let var_name = &value[2..value.len() - 1];
            env::var(var_name).ok()
        } else {
            Some(value.to_string())
        }
    }

    /// Create test-friendly defaults
    pub fn test_defaults() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 18080,
                public_origin: Some("http://localhost:3000".to_string()),
            },
            spec: SpecConfig::default(),
            upstreams: UpstreamConfig::default(),
            credentials: CredentialsConfig {
                api_key: Some("test-api-key".to_string()),
                default_scorer_id: Some("335".to_string()),
                use_test_credentials: true,
            },
            observability: ObservabilityConfig::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_spec_url() -> String {
    "https://api.passport.xyz/v2/openapi.json".to_string()
}

fn default_revalidate_secs() -> u64 {
    3600
}

fn default_passport_base() -> String {
    "https://api.passport.xyz".to_string()
}

fn default_holonym_base() -> String {
    "https://api.holonym.io".to_string()
}

fn default_sign_base() -> String {
    "https://mainnet-rpc.sign.global".to_string()
}

fn default_true() -> bool {
    true
}
