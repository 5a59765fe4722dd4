//! HTML parsing: link extraction, document-link discovery, and the text
//! rendering that goes into the archive.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node, Selector};
use url::Url;

use crate::archive::has_document_extension;
use crate::url::resolve_and_normalize;

/// Absolute document URLs buried in onclick handlers, e.g.
/// `onclick="window.open('https://example.edu/report.pdf')"`.
static ONCLICK_DOC_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s'"]+\.(?:pdf|docx?|xlsx?|txt)"#).expect("valid regex")
});

/// Runs of three or more newlines collapse to one blank line.
static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from the <title> tag)
    pub title: Option<String>,

    /// Followable links, resolved to absolute URLs
    pub links: Vec<Url>,

    /// Linked documents (PDF, office formats, plain text), deduped
    pub document_links: Vec<Url>,

    /// Plain-text rendering of the page body
    pub text: String,
}

/// Parses HTML content and extracts links, documents, and text.
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);
    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
        document_links: find_document_links(&document, base_url),
        text: html_to_text(&document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Anchor hrefs resolved against the page URL. Document links are handled
/// separately so they are downloaded rather than crawled.
fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();
    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(url) = resolve_and_normalize(href, base_url) else {
                continue;
            };
            if has_document_extension(url.path()) {
                continue;
            }
            links.push(url);
        }
    }
    links
}

/// Collects document links through three mechanisms: anchor hrefs with a
/// recognized extension, absolute URLs inside onclick handlers, and
/// data-href/data-url attributes. The same resolved URL found twice is
/// reported once.
pub fn find_document_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut seen = std::collections::HashSet::new();
    let mut found = Vec::new();

    let mut push = |url: Url| {
        if has_document_extension(url.path()) && seen.insert(url.to_string()) {
            found.push(url);
        }
    };

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_and_normalize(href, base_url) {
                    push(url);
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("[onclick]") {
        for element in document.select(&selector) {
            let Some(handler) = element.value().attr("onclick") else {
                continue;
            };
            for m in ONCLICK_DOC_URL.find_iter(handler) {
                if let Some(url) = resolve_and_normalize(m.as_str(), base_url) {
                    push(url);
                }
            }
        }
    }

    for attr in ["data-href", "data-url"] {
        let Ok(selector) = Selector::parse(&format!("[{}]", attr)) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attr) {
                if let Some(url) = resolve_and_normalize(value, base_url) {
                    push(url);
                }
            }
        }
    }

    found
}

/// Elements whose text never belongs in the archive rendering.
const SKIPPED_ANCESTORS: [&str; 6] = ["script", "style", "noscript", "header", "footer", "nav"];

/// Renders the page body as plain text, skipping scripts, styles, and
/// navigational boilerplate, then collapsing excess blank lines.
pub fn html_to_text(document: &Html) -> String {
    let mut out = String::new();

    for node in document.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let skipped = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .map(|e| SKIPPED_ANCESTORS.contains(&e.name()))
                .unwrap_or(false)
        });
        if skipped {
            continue;
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            // Preserve paragraph structure without piling up whitespace
            if !out.ends_with('\n') {
                out.push('\n');
            }
        } else {
            out.push_str(trimmed);
            out.push('\n');
        }
    }

    EXCESS_NEWLINES
        .replace_all(&out, "\n\n")
        .trim()
        .to_string()
}
