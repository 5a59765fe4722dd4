//! Page and document processing
//!
//! Turns a fetched HTML page into archive entries: the raw page, its text
//! rendering, one CrawlRecord, and (when enabled) a download + extraction
//! pass over every document the page links to. One document failing never
//! aborts the page or the documents after it.

use chrono::Utc;
use futures::StreamExt;
use reqwest::Client;
use url::Url;

use crate::archive::{extract_text, truncate_chars, Archive, CrawlRecord, DocKind, MAX_CONTENT_CHARS};
use crate::crawler::parser::ParsedPage;
use crate::pacing::TokenBucket;
use crate::robots::RobotsAuthority;
use crate::url::safe_path_for;
use crate::{CrawlError, Result};

/// Archives a fetched HTML page: raw markup, text rendering, and a record.
pub fn archive_page(archive: &Archive, url: &Url, body: &str, parsed: &ParsedPage) -> Result<()> {
    let name = safe_path_for(url);
    let download_path = archive.save_html(&name, body)?;

    let content = truncate_chars(&parsed.text, MAX_CONTENT_CHARS);
    archive.save_text(&name, &content)?;

    archive.append_record(&CrawlRecord {
        title: parsed.title.clone().unwrap_or_default(),
        url: url.to_string(),
        kind: "html".to_string(),
        content,
        download_path,
        date: Utc::now().to_rfc3339(),
        source_domain: url.host_str().unwrap_or_default().to_string(),
    })?;

    Ok(())
}

/// Downloads and archives every document linked from a page.
///
/// Each URL is checked against robots and the cross-page seen set, then
/// streamed to disk with every chunk charged to the bandwidth bucket.
/// Failures are logged per document and the loop continues.
pub async fn process_documents(
    client: &Client,
    bucket: &TokenBucket,
    robots: &mut RobotsAuthority,
    archive: &Archive,
    documents: &[Url],
    seen: &mut std::collections::HashSet<String>,
) -> usize {
    let mut archived = 0;

    for doc_url in documents {
        if !seen.insert(doc_url.to_string()) {
            continue;
        }
        if !robots.is_allowed(doc_url).await {
            tracing::debug!("Robots disallows document {}", doc_url);
            continue;
        }
        match archive_document(client, bucket, archive, doc_url).await {
            Ok(()) => archived += 1,
            Err(e) => tracing::warn!("Document download failed for {}: {}", doc_url, e),
        }
    }

    archived
}

async fn archive_document(
    client: &Client,
    bucket: &TokenBucket,
    archive: &Archive,
    url: &Url,
) -> Result<()> {
    let Some(kind) = DocKind::from_url_path(url.path()) else {
        return Err(CrawlError::Archive(format!(
            "no recognized document extension in {}",
            url.path()
        )));
    };

    let body = download_charged(client, bucket, url).await?;

    let name = safe_path_for(url);
    let download_path = archive.save_document(kind, &name, &body)?;

    // Extraction is best-effort: a bad file still stays archived
    let content = extract_text(kind, &archive.absolute(&download_path));
    if !content.is_empty() {
        archive.save_text(&name, &content)?;
    }

    // Documents have no <title>; the archive file name stands in
    let title = download_path
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();

    archive.append_record(&CrawlRecord {
        title,
        url: url.to_string(),
        kind: kind.label().to_string(),
        content,
        download_path,
        date: Utc::now().to_rfc3339(),
        source_domain: url.host_str().unwrap_or_default().to_string(),
    })?;

    tracing::info!("Archived {} ({} bytes)", url, body.len());
    Ok(())
}

/// Streams a response body, charging the bandwidth bucket per chunk so large
/// files pace themselves instead of bursting.
pub async fn download_charged(
    client: &Client,
    bucket: &TokenBucket,
    url: &Url,
) -> Result<Vec<u8>> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|source| CrawlError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Archive(format!(
            "HTTP {} fetching {}",
            status, url
        )));
    }

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| CrawlError::Http {
            url: url.to_string(),
            source,
        })?;
        bucket.charge(chunk.len()).await;
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
