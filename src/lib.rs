//! Sitevault: a polite single-site archiving crawler
//!
//! This crate implements a breadth-first crawler that archives HTML pages and
//! linked documents from one institutional site at a time, while respecting
//! robots.txt, per-host backoff, a global bandwidth cap, and configured
//! active-hours windows.

pub mod archive;
pub mod config;
pub mod crawler;
pub mod pacing;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for sitevault operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Metadata serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid environment override {name}: {value}")]
    InvalidEnv { name: String, value: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for sitevault operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use archive::{Archive, CrawlRecord};
pub use config::{Config, EnvSettings};
pub use pacing::{ActiveWindow, PolitenessClock, TokenBucket};
pub use robots::RobotsAuthority;
pub use url::{in_scope, normalize_url, safe_path_for};
