use crate::config::types::{Config, EnvSettings};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads a TOML configuration file, merges environment overrides on top
/// (environment wins), and validates the result.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content.
///
/// Logged at startup so runs can be correlated with the exact config that
/// produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its file hash.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Merges environment variables over file values. The lookup is injected so
/// tests can run without touching the process environment.
pub fn apply_env_overrides(
    config: &mut Config,
    get: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(v) = get("SEED_URLS") {
        config.seed_urls = split_list(&v);
    }
    if let Some(v) = get("INCLUDE_PATTERNS") {
        config.include_patterns = split_list(&v);
    }
    if let Some(v) = get("EXCLUDE_PATTERNS") {
        config.exclude_patterns = split_list(&v);
    }
    if let Some(v) = get("MAX_DEPTH") {
        config.max_depth = parse_env("MAX_DEPTH", &v)?;
    }
    if let Some(v) = get("CONCURRENCY") {
        config.concurrency = parse_env("CONCURRENCY", &v)?;
    }
    if let Some(v) = get("RATE_LIMIT") {
        config.rate_limit = parse_env("RATE_LIMIT", &v)?;
    }
    if let Some(v) = get("DOWNLOAD_FILES") {
        config.download_files = parse_bool("DOWNLOAD_FILES", &v)?;
    }
    if let Some(v) = get("OUTPUT_DIR") {
        config.output_dir = v;
    }
    Ok(())
}

impl EnvSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through an injected lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(v) = get("CRAWL_USER_AGENT") {
            settings.user_agent = v;
        }
        if let Some(v) = get("RESPECT_ROBOTS") {
            settings.respect_robots = parse_bool("RESPECT_ROBOTS", &v)?;
        }
        if let Some(v) = get("RUN_ONCE") {
            settings.run_once = parse_bool("RUN_ONCE", &v)?;
        }
        if let Some(v) = get("SCHEDULE_HOURS") {
            let hours: u64 = parse_env("SCHEDULE_HOURS", &v)?;
            settings.schedule_hours = hours.max(1);
        }
        if let Some(v) = get("ACTIVE_WINDOW") {
            settings.active_window = v;
        }
        if let Some(v) = get("WINDOW_TZ") {
            settings.window_tz = v;
        }
        if let Some(v) = get("BANDWIDTH_BPS") {
            settings.bandwidth_bps = parse_env("BANDWIDTH_BPS", &v)?;
        }
        if let Some(v) = get("JITTER_MAX") {
            settings.jitter_max = parse_env("JITTER_MAX", &v)?;
        }
        settings.log_path = get("LOG_PATH");

        Ok(settings)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(
            r#"
seed_urls = ["https://example.edu/"]
max_depth = 2
rate_limit = 0.5
exclude_patterns = ["/calendar/"]
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.seed_urls, vec!["https://example.edu/"]);
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.rate_limit, 0.5);
        assert_eq!(config.exclude_patterns, vec!["/calendar/"]);
        // Defaults fill the rest
        assert_eq!(config.concurrency, 2);
        assert!(config.download_files);
        assert_eq!(config.output_dir, "./data");
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("seed_urls = [unclosed");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = Config {
            seed_urls: vec!["https://file.example.edu/".to_string()],
            max_depth: 2,
            ..Config::default()
        };
        let vars = env(&[
            ("SEED_URLS", "https://a.example.edu/, https://b.example.edu/"),
            ("MAX_DEPTH", "5"),
            ("DOWNLOAD_FILES", "false"),
            ("OUTPUT_DIR", "/tmp/vault"),
        ]);
        apply_env_overrides(&mut config, |n| vars.get(n).cloned()).unwrap();

        assert_eq!(
            config.seed_urls,
            vec!["https://a.example.edu/", "https://b.example.edu/"]
        );
        assert_eq!(config.max_depth, 5);
        assert!(!config.download_files);
        assert_eq!(config.output_dir, "/tmp/vault");
    }

    #[test]
    fn test_bad_env_value_is_an_error() {
        let mut config = Config::default();
        let vars = env(&[("MAX_DEPTH", "many")]);
        let err = apply_env_overrides(&mut config, |n| vars.get(n).cloned());
        assert!(matches!(err, Err(ConfigError::InvalidEnv { .. })));
    }

    #[test]
    fn test_env_settings_defaults() {
        let settings = EnvSettings::from_lookup(|_| None).unwrap();
        assert!(settings.respect_robots);
        assert!(!settings.run_once);
        assert_eq!(settings.schedule_hours, 24);
        assert_eq!(settings.bandwidth_bps, 0);
        assert_eq!(settings.jitter_max, 0.5);
        assert!(settings.active_window.is_empty());
        assert!(settings.user_agent.starts_with("sitevault/"));
    }

    #[test]
    fn test_env_settings_overrides() {
        let vars = env(&[
            ("CRAWL_USER_AGENT", "archivebot/1.0"),
            ("RESPECT_ROBOTS", "no"),
            ("RUN_ONCE", "1"),
            ("SCHEDULE_HOURS", "0"),
            ("ACTIVE_WINDOW", "22:00-06:00"),
            ("WINDOW_TZ", "America/Chicago"),
            ("BANDWIDTH_BPS", "500000"),
            ("JITTER_MAX", "2.0"),
        ]);
        let settings = EnvSettings::from_lookup(|n| vars.get(n).cloned()).unwrap();
        assert_eq!(settings.user_agent, "archivebot/1.0");
        assert!(!settings.respect_robots);
        assert!(settings.run_once);
        // Floor of one hour
        assert_eq!(settings.schedule_hours, 1);
        assert_eq!(settings.active_window, "22:00-06:00");
        assert_eq!(settings.window_tz, "America/Chicago");
        assert_eq!(settings.bandwidth_bps, 500_000);
        assert_eq!(settings.jitter_max, 2.0);
    }

    #[test]
    fn test_config_hash_is_stable() {
        let file = create_temp_config("seed_urls = [\"https://example.edu/\"]");
        let a = compute_config_hash(file.path()).unwrap();
        let b = compute_config_hash(file.path()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
