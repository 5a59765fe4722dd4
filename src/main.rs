//! Sitevault main entry point
//!
//! Command-line interface for the sitevault archiving crawler.

use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use sitevault::config::{ensure_seeds_present, load_config_with_hash, EnvSettings};
use sitevault::crawler::{shutdown_channel, CycleRunner};
use tracing_subscriber::EnvFilter;

/// Sitevault: a polite single-site archiving crawler
///
/// Sitevault walks one or more seed sites breadth-first, archiving HTML
/// pages and linked documents while honoring robots.txt, per-host backoff,
/// a global bandwidth cap, and configured active hours.
#[derive(Parser, Debug)]
#[command(name = "sitevault")]
#[command(version)]
#[command(about = "A polite single-site archiving crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (falls back to $CONFIG_PATH)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Exit after one crawl cycle instead of running on a schedule
    #[arg(long)]
    run_once: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = EnvSettings::from_env().context("reading environment settings")?;
    setup_logging(cli.verbose, cli.quiet, settings.log_path.as_deref())?;

    let config_path = cli
        .config
        .or_else(|| std::env::var("CONFIG_PATH").ok().map(PathBuf::from))
        .context("no config file given (pass a path or set CONFIG_PATH)")?;

    tracing::info!("Loading configuration from: {}", config_path.display());
    let (config, config_hash) =
        load_config_with_hash(&config_path).context("loading configuration")?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.dry_run {
        print_dry_run(&config, &settings);
        return Ok(());
    }

    ensure_seeds_present(&config)?;
    if cli.run_once {
        settings.run_once = true;
    }

    let (shutdown_tx, shutdown) = shutdown_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, shutting down");
            shutdown_tx.send(true).ok();
        }
    });

    let mut runner = CycleRunner::new(config, settings, shutdown)?;
    runner.run().await?;

    Ok(())
}

/// Sets up the tracing subscriber. With LOG_PATH set, output is tee'd to
/// both stdout and the log file.
fn setup_logging(verbose: u8, quiet: bool, log_path: Option<&str>) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitevault=info,warn"),
            1 => EnvFilter::new("sitevault=debug,info"),
            2 => EnvFilter::new("sitevault=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path))?;
            let file = Arc::new(Mutex::new(file));
            builder
                .with_ansi(false)
                .with_writer(move || TeeWriter {
                    file: Arc::clone(&file),
                })
                .init();
        }
        None => builder.init(),
    }

    Ok(())
}

/// Writes log lines to stdout and the log file.
struct TeeWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl std::io::Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stdout().write_all(buf)?;
        if let Ok(mut file) = self.file.lock() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()?;
        if let Ok(mut file) = self.file.lock() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Handles --dry-run: shows the merged configuration without crawling.
fn print_dry_run(config: &sitevault::config::Config, settings: &EnvSettings) {
    println!("=== Sitevault Dry Run ===\n");

    println!("Crawl:");
    println!("  Max depth: {}", config.max_depth);
    println!("  Base delay: {}s", config.rate_limit);
    println!("  Download files: {}", config.download_files);
    println!("  Output dir: {}", config.output_dir);

    println!("\nSeeds ({}):", config.seed_urls.len());
    for seed in &config.seed_urls {
        println!("  - {}", seed);
    }

    if !config.include_patterns.is_empty() {
        println!("\nInclude patterns:");
        for p in &config.include_patterns {
            println!("  - {}", p);
        }
    }
    if !config.exclude_patterns.is_empty() {
        println!("\nExclude patterns:");
        for p in &config.exclude_patterns {
            println!("  - {}", p);
        }
    }

    println!("\nRuntime:");
    println!("  User agent: {}", settings.user_agent);
    println!("  Respect robots: {}", settings.respect_robots);
    println!(
        "  Mode: {}",
        if settings.run_once {
            "run once".to_string()
        } else {
            format!("every {} hour(s)", settings.schedule_hours)
        }
    );
    if !settings.active_window.is_empty() {
        println!(
            "  Active window: {} ({})",
            settings.active_window, settings.window_tz
        );
    }
    if settings.bandwidth_bps > 0 {
        println!("  Bandwidth cap: {} B/s", settings.bandwidth_bps);
    }

    println!("\n✓ Configuration is valid");
}
