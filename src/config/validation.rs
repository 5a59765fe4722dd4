use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a merged configuration.
///
/// Seed presence is checked separately (`ensure_seeds_present`) since a dry
/// run may legitimately load a seedless config.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    for seed in &config.seed_urls {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("seed '{}': {}", seed, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "seed '{}' must be http or https",
                seed
            )));
        }
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "seed '{}' has no host",
                seed
            )));
        }
    }

    if config.max_depth > 100 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be <= 100, got {}",
            config.max_depth
        )));
    }

    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if !config.rate_limit.is_finite() || config.rate_limit < 0.0 {
        return Err(ConfigError::Validation(format!(
            "rate_limit must be >= 0, got {}",
            config.rate_limit
        )));
    }

    if config.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Rejects a configuration with no seeds. Called before a real crawl.
pub fn ensure_seeds_present(config: &Config) -> Result<(), ConfigError> {
    if config.seed_urls.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }
    Ok(())
}
