//! Configuration file handling for ladok-cli

use anyhow::{Context, Result};
use ladok_client::{ClientConfig, IdentityConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default API root
    pub base_url: Option<String>,
    /// Media-type vendor token
    pub vendor: Option<String>,
    /// Relation URI prefix
    pub relation_base: Option<String>,
    /// PKCS#12 client certificate
    pub cert: Option<PathBuf>,
    /// Environment variable holding the certificate passphrase
    pub passphrase_env: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Default output format
    pub output: Option<String>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("ladok-cli");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, args: &ArgOverrides<'_>) -> MergedConfig {
        let base_url = args
            .base_url
            .map(String::from)
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| "https://api.ladok.se".to_string());

        let mut builder = ClientConfig::builder(base_url);
        if let Some(vendor) = &self.vendor {
            builder = builder.vendor(vendor);
        }
        if let Some(relation_base) = &self.relation_base {
            builder = builder.relation_base(relation_base);
        }
        if let Some(ms) = self.timeout_ms {
            builder = builder.request_timeout_ms(ms);
        }
        let mut client = builder.build();

        if let Some(cert) = args.cert.map(Path::to_path_buf).or_else(|| self.cert.clone()) {
            client.identity = Some(IdentityConfig {
                pkcs12_path: cert,
                passphrase: args.passphrase.map(String::from),
                passphrase_env: self.passphrase_env.clone(),
            });
        }

        MergedConfig {
            client,
            output: args
                .output
                .map(String::from)
                .or_else(|| self.output.clone())
                .unwrap_or_else(|| "table".to_string()),
            no_color: args.no_color || self.no_color.unwrap_or(false),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Default)]
pub struct ArgOverrides<'a> {
    pub base_url: Option<&'a str>,
    pub cert: Option<&'a Path>,
    pub passphrase: Option<&'a str>,
    pub output: Option<&'a str>,
    pub no_color: bool,
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub client: ClientConfig,
    pub output: String,
    pub no_color: bool,
}
