//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with the configured user agent
//! - GET requests for HTML pages with throttle-signal classification
//! - Content-Type gating (only HTML bodies are read)

use reqwest::{header, Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// Content types parsed as HTML pages.
const HTML_CONTENT_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

/// Result of fetching one frontier URL
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched an HTML page
    Html {
        /// Final URL after redirects
        final_url: Url,
        /// Page body
        body: String,
    },

    /// The server asked us to slow down (HTTP 429 or 503)
    Throttled {
        /// Integer seconds from a Retry-After header, if one was sent
        retry_after: Option<f64>,
    },

    /// Response was not HTML (Content-Type mismatch)
    NotHtml {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Any other HTTP error status
    HttpError {
        /// The HTTP status code
        status: StatusCode,
    },

    /// Network-level failure (connection refused, timeout, DNS)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds the shared HTTP client.
///
/// One client per process run: connection pooling and cookie-free requests
/// with the configured user agent. Institutional sites often carry stale
/// certificate chains, so certificate validation is relaxed.
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .danger_accept_invalid_certs(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one page, classifying the response for the walker.
///
/// Only HTML bodies are read; other content types are reported without
/// downloading the body. 429/503 become `Throttled` with any integer
/// Retry-After the server sent.
pub async fn fetch_page(client: &Client, url: &Url) -> FetchOutcome {
    let response = match client.get(url.as_str()).send().await {
        Ok(resp) => resp,
        Err(e) => {
            return FetchOutcome::NetworkError {
                error: e.to_string(),
            }
        }
    };

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
        return FetchOutcome::Throttled {
            retry_after: parse_retry_after(&response),
        };
    }
    if !status.is_success() {
        return FetchOutcome::HttpError { status };
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    // A server that won't say what it is serving doesn't get parsed as HTML
    if !HTML_CONTENT_TYPES.iter().any(|t| content_type.contains(t)) {
        return FetchOutcome::NotHtml { content_type };
    }

    let final_url = response.url().clone();
    match response.text().await {
        Ok(body) => FetchOutcome::Html { final_url, body },
        Err(e) => FetchOutcome::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Parses an integer-seconds Retry-After header. HTTP-date forms are
/// ignored.
fn parse_retry_after(response: &Response) -> Option<f64> {
    response
        .headers()
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> Client {
        build_http_client("sitevault-test").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>hi</body></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        match fetch_page(&client(), &url).await {
            FetchOutcome::Html { body, .. } => assert!(body.contains("hi")),
            other => panic!("expected Html, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_throttled_with_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/busy"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/busy", server.uri())).unwrap();
        match fetch_page(&client(), &url).await {
            FetchOutcome::Throttled { retry_after } => assert_eq!(retry_after, Some(30.0)),
            other => panic!("expected Throttled, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_throttled_503_without_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/down", server.uri())).unwrap();
        match fetch_page(&client(), &url).await {
            FetchOutcome::Throttled { retry_after } => assert_eq!(retry_after, None),
            other => panic!("expected Throttled, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_date_retry_after_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/busy"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "Wed, 21 Oct 2026 07:28:00 GMT"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/busy", server.uri())).unwrap();
        match fetch_page(&client(), &url).await {
            FetchOutcome::Throttled { retry_after } => assert_eq!(retry_after, None),
            other => panic!("expected Throttled, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_xhtml_page_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>strict</body></html>", "application/xhtml+xml"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        match fetch_page(&client(), &url).await {
            FetchOutcome::Html { body, .. } => assert!(body.contains("strict")),
            other => panic!("expected Html, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_content_type_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mystery"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", ""))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/mystery", server.uri())).unwrap();
        match fetch_page(&client(), &url).await {
            FetchOutcome::NotHtml { content_type } => assert!(content_type.is_empty()),
            other => panic!("expected NotHtml, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_html_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<rss/>", "application/xml"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/feed.xml", server.uri())).unwrap();
        match fetch_page(&client(), &url).await {
            FetchOutcome::NotHtml { content_type } => {
                assert!(content_type.contains("application/xml"))
            }
            other => panic!("expected NotHtml, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        match fetch_page(&client(), &url).await {
            FetchOutcome::HttpError { status } => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("expected HttpError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_network_error() {
        // Port 9 (discard) is not listening
        let url = Url::parse("http://127.0.0.1:9/page").unwrap();
        match fetch_page(&client(), &url).await {
            FetchOutcome::NetworkError { .. } => {}
            other => panic!("expected NetworkError, got {:?}", other),
        }
    }
}
