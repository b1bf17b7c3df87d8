//! YAML configuration for the watcher process.
//!
//! ```yaml
//! server:
//!   host: "0.0.0.0:27100"
//!   archive_key: "secret"
//!   database: "log_watcher.db"
//!   log_level: "info"
//! sources:
//!   - id: 1
//!     domain: "tf2pickup.eu"
//!     address: "203.0.113.7:27015"
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DOMAIN_PLACEHOLDER: &str = "{domain}";

fn default_api_url() -> String {
    "https://api.tf2pickup.{domain}".to_string()
}

fn default_archive_url() -> String {
    "http://logs.tf/upload".to_string()
}

fn default_database() -> String {
    "log_watcher.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Listener and collaborator settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerSettings {
    /// Address the UDP listener binds to
    pub host: String,
    /// Credential sent with every archived log
    #[serde(default)]
    pub archive_key: String,
    /// SQLite file receiving per-player match records
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Match roster API, `{domain}` is replaced by the source's domain
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_archive_url")]
    pub archive_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// One game server whose log stream is watched.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SourceConfig {
    pub id: u32,
    pub domain: String,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    pub server: ServerSettings,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// A validated source: immutable for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    pub origin: SocketAddr,
    pub domain: String,
    pub id: u32,
}

impl Source {
    pub fn new(origin: SocketAddr, domain: impl Into<String>, id: u32) -> Self {
        Self {
            origin,
            domain: domain.into(),
            id,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.domain, self.id)
    }
}

impl Config {
    /// Reads and validates the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_yaml::from_str(text).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost {
                address: self.server.host.clone(),
            })
    }

    /// Resolves every configured source. Fails on the first bad or duplicated address.
    pub fn sources(&self) -> Result<Vec<Source>, ConfigError> {
        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            if source.domain.trim().is_empty() {
                return Err(ConfigError::EmptyDomain { id: source.id });
            }

            let origin: SocketAddr =
                source
                    .address
                    .parse()
                    .map_err(|_| ConfigError::InvalidSourceAddress {
                        domain: source.domain.clone(),
                        id: source.id,
                        address: source.address.clone(),
                    })?;

            if !seen.insert(origin) {
                return Err(ConfigError::DuplicateAddress {
                    address: source.address.clone(),
                });
            }

            sources.push(Source::new(origin, source.domain.clone(), source.id));
        }

        Ok(sources)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;
        self.sources()?;

        if !self.server.api_url.contains(DOMAIN_PLACEHOLDER) {
            return Err(ConfigError::MissingDomainPlaceholder {
                url: self.server.api_url.clone(),
            });
        }

        Ok(())
    }
}
