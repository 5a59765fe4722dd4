//! Configuration module for sitevault
//!
//! TOML file plus environment overrides (environment wins), a separate
//! validation pass, and a SHA-256 hash of the config file for run
//! correlation.
//!
//! # Example
//!
//! ```no_run
//! use sitevault::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{apply_env_overrides, compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, EnvSettings};
pub use validation::{ensure_seeds_present, validate};
