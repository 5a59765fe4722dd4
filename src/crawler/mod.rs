//! Crawler module: fetching, parsing, traversal, and scheduling
//!
//! The walker drives a breadth-first traversal per seed; the processor turns
//! fetched pages into archive entries; the scheduler runs cycles on the
//! configured cadence with clean shutdown.

mod fetcher;
mod parser;
mod processor;
mod scheduler;
mod walker;

pub use fetcher::{build_http_client, fetch_page, FetchOutcome};
pub use parser::{find_document_links, html_to_text, parse_html, ParsedPage};
pub use processor::{archive_page, download_charged, process_documents};
pub use scheduler::{shutdown_channel, CycleRunner, Shutdown};
pub use walker::{CrawlStats, FrontierEntry, Walker};
