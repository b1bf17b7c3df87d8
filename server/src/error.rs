use std::path::PathBuf;
use thiserror::Error;

/// Problems found while loading the configuration. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid listen address '{address}'")]
    InvalidHost { address: String },

    #[error("source {domain}#{id} has invalid address '{address}'")]
    InvalidSourceAddress {
        domain: String,
        id: u32,
        address: String,
    },

    #[error("address {address} is bound to more than one source")]
    DuplicateAddress { address: String },

    #[error("source #{id} has an empty domain")]
    EmptyDomain { id: u32 },

    #[error("api_url '{url}' must contain the {{domain}} placeholder")]
    MissingDomainPlaceholder { url: String },
}

/// Failures reported by the match resolver, log archiver and stats store.
///
/// None of these abort a state transition; the state machine logs them and moves on.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Other(String),
}
