use serde::{Deserialize, Serialize};

/// One archived item, as written to metadata.jsonl.
///
/// The log is append-only and identity is insertion order; the same URL may
/// legitimately appear once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlRecord {
    /// Page or document title (empty when none could be extracted)
    pub title: String,

    /// Normalized source URL
    pub url: String,

    /// Item kind: "html", "pdf", "doc", "docx", "xls", "xlsx" or "txt"
    #[serde(rename = "type")]
    pub kind: String,

    /// Extracted plain text, truncated to the archival cap
    pub content: String,

    /// Archive-relative path of the saved raw file
    pub download_path: String,

    /// RFC 3339 capture timestamp
    pub date: String,

    /// Host the item was fetched from
    pub source_domain: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_as_type() {
        let record = CrawlRecord {
            title: "Home".to_string(),
            url: "https://example.edu/".to_string(),
            kind: "html".to_string(),
            content: "Home page".to_string(),
            download_path: "html/index-abc.html".to_string(),
            date: "2026-08-23T12:00:00Z".to_string(),
            source_domain: "example.edu".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"type\":\"html\""));
        assert!(!json.contains("\"kind\""));

        let back: CrawlRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, "html");
        assert_eq!(back.source_domain, "example.edu");
    }
}
