use serde::Deserialize;

/// Crawl configuration as loaded from TOML and merged with the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Seed URLs, one traversal each per cycle
    #[serde(default)]
    pub seed_urls: Vec<String>,

    /// Path substrings a URL must contain to be crawled (empty = no filter)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Path substrings that exclude a URL from crawling
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Maximum traversal depth from a seed
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Concurrency hint (the engine crawls each seed sequentially)
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Base inter-request delay in seconds
    #[serde(default = "default_rate_limit")]
    pub rate_limit: f64,

    /// Whether linked documents (PDF etc.) are downloaded
    #[serde(default = "default_download_files")]
    pub download_files: bool,

    /// Archive root directory
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_max_depth() -> u32 {
    3
}

fn default_concurrency() -> u32 {
    2
}

fn default_rate_limit() -> f64 {
    1.0
}

fn default_download_files() -> bool {
    true
}

fn default_output_dir() -> String {
    "./data".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_urls: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            max_depth: default_max_depth(),
            concurrency: default_concurrency(),
            rate_limit: default_rate_limit(),
            download_files: default_download_files(),
            output_dir: default_output_dir(),
        }
    }
}

/// Environment-only runtime toggles, read outside the merged config.
#[derive(Debug, Clone)]
pub struct EnvSettings {
    /// User-agent string sent with every request
    pub user_agent: String,

    /// Whether robots.txt is honored
    pub respect_robots: bool,

    /// Exit after the first cycle instead of looping
    pub run_once: bool,

    /// Hours between cycle starts in scheduled mode
    pub schedule_hours: u64,

    /// Active-hours spec, e.g. "22:00-06:00" (empty = always)
    pub active_window: String,

    /// IANA timezone name for the active window
    pub window_tz: String,

    /// Global bandwidth cap in bytes/second (0 = unlimited)
    pub bandwidth_bps: u64,

    /// Maximum random jitter added to each politeness delay, seconds
    pub jitter_max: f64,

    /// Optional log file path, tee'd with stdout
    pub log_path: Option<String>,
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self {
            user_agent: format!("sitevault/{}", env!("CARGO_PKG_VERSION")),
            respect_robots: true,
            run_once: false,
            schedule_hours: 24,
            active_window: String::new(),
            window_tz: "UTC".to_string(),
            bandwidth_bps: 0,
            jitter_max: 0.5,
            log_path: None,
        }
    }
}
