//! Client configuration with YAML, JSON and TOML support

use std::path::{Path, PathBuf};
use std::time::Duration;

use ladok_core::{ApiProfile, DEFAULT_RELATION_BASE, DEFAULT_VENDOR};
use serde::{Deserialize, Serialize};

use crate::session::ClientIdentity;

/// Client configuration
///
/// Can be loaded from YAML, JSON or TOML, or constructed programmatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Connection settings
    pub connection: ConnectionConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    /// TLS client certificate (optional)
    #[serde(default)]
    pub identity: Option<IdentityConfig>,
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// API root, e.g. `https://api.ladok.se`
    pub base_url: String,

    /// Vendor token in `application/vnd.<vendor>-<service>+json`
    #[serde(default = "default_vendor")]
    pub vendor: String,

    /// Prefix of every relation URI
    #[serde(default = "default_relation_base")]
    pub relation_base: String,
}

fn default_vendor() -> String {
    DEFAULT_VENDOR.to_string()
}

fn default_relation_base() -> String {
    DEFAULT_RELATION_BASE.to_string()
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// General request timeout in milliseconds (default: 30s)
    #[serde(default = "default_request_timeout")]
    pub request_ms: u64,

    /// Connect timeout in milliseconds (default: 10s)
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            request_ms: default_request_timeout(),
            connect_ms: default_connect_timeout(),
        }
    }
}

impl TimeoutsConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }
}

fn default_request_timeout() -> u64 {
    30_000 // 30 seconds
}

fn default_connect_timeout() -> u64 {
    10_000 // 10 seconds
}

/// Where to find the PKCS#12 client certificate and its passphrase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Path to the `.p12` / `.pfx` bundle
    pub pkcs12_path: PathBuf,

    /// Passphrase given inline
    #[serde(default)]
    pub passphrase: Option<String>,

    /// Environment variable holding the passphrase
    #[serde(default)]
    pub passphrase_env: Option<String>,
}

impl IdentityConfig {
    /// Resolve the passphrase: inline value first, then the environment
    pub fn passphrase(&self) -> Result<String, ConfigError> {
        if let Some(passphrase) = &self.passphrase {
            return Ok(passphrase.clone());
        }
        match &self.passphrase_env {
            Some(var) => {
                std::env::var(var).map_err(|_| ConfigError::MissingPassphrase(var.clone()))
            }
            None => Ok(String::new()),
        }
    }

    /// Read the certificate bundle
    pub fn load(&self) -> Result<ClientIdentity, ConfigError> {
        let passphrase = self.passphrase()?;
        ClientIdentity::from_pkcs12_file(&self.pkcs12_path, passphrase).map_err(|e| {
            ConfigError::IoError(format!("{}: {}", self.pkcs12_path.display(), e))
        })
    }
}

impl ClientConfig {
    /// Load configuration from a file, picking the format by extension
    ///
    /// `.toml` and `.json` are recognised; anything else is read as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse configuration from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Create a builder for programmatic configuration
    pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(base_url)
    }

    /// Relation and media-type conventions of this deployment
    pub fn profile(&self) -> ApiProfile {
        ApiProfile::new(&self.connection.vendor, &self.connection.relation_base)
    }
}

/// Builder for ClientConfig
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: ClientConfig {
                connection: ConnectionConfig {
                    base_url: base_url.into(),
                    vendor: default_vendor(),
                    relation_base: default_relation_base(),
                },
                timeouts: TimeoutsConfig::default(),
                identity: None,
            },
        }
    }

    /// Set the media-type vendor token
    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.config.connection.vendor = vendor.into();
        self
    }

    /// Set the relation URI prefix
    pub fn relation_base(mut self, relation_base: impl Into<String>) -> Self {
        self.config.connection.relation_base = relation_base.into();
        self
    }

    /// Set request timeout in milliseconds
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.request_ms = ms;
        self
    }

    /// Set connect timeout in milliseconds
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.connect_ms = ms;
        self
    }

    /// Use a PKCS#12 client certificate
    pub fn pkcs12(mut self, path: impl Into<PathBuf>, passphrase: Option<String>) -> Self {
        self.config.identity = Some(IdentityConfig {
            pkcs12_path: path.into(),
            passphrase,
            passphrase_env: None,
        });
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Passphrase variable {0} is not set")]
    MissingPassphrase(String),
}
