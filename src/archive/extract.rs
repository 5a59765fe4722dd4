//! Document text extraction
//!
//! Best-effort extraction of plain text from downloaded documents. Extraction
//! never fails the crawl: any error yields empty text and a warning, the raw
//! file stays archived either way.

use std::io::Read;
use std::path::Path;

/// Maximum characters of extracted text kept per item.
pub const MAX_CONTENT_CHARS: usize = 200_000;

/// Downloadable document kinds, keyed by URL extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    Pdf,
    Doc,
    Docx,
    Xls,
    Xlsx,
    Txt,
}

impl DocKind {
    /// Classifies a URL path by its extension, case-insensitively.
    pub fn from_url_path(path: &str) -> Option<Self> {
        let ext = path.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "doc" => Some(Self::Doc),
            "docx" => Some(Self::Docx),
            "xls" => Some(Self::Xls),
            "xlsx" => Some(Self::Xlsx),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Record-type label and archive file extension.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Docx => "docx",
            Self::Xls => "xls",
            Self::Xlsx => "xlsx",
            Self::Txt => "txt",
        }
    }

    /// Archive subdirectory for the raw file. Raw text downloads go to
    /// `docs/` with the other documents; `text/` is reserved for extracted
    /// renderings so the two never collide.
    pub fn archive_dir(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            _ => "docs",
        }
    }
}

/// Whether a URL path ends in a recognized document extension.
pub fn has_document_extension(path: &str) -> bool {
    DocKind::from_url_path(path).is_some()
}

/// Extracts plain text from a saved document, truncated to the archival cap.
///
/// PDF and DOCX get real extraction; TXT is read as lossy UTF-8; legacy
/// binary formats (DOC, XLS, XLSX) are archived without text.
pub fn extract_text(kind: DocKind, saved_path: &Path) -> String {
    let text = match kind {
        DocKind::Pdf => extract_pdf(saved_path),
        DocKind::Docx => extract_docx(saved_path),
        DocKind::Txt => extract_txt(saved_path),
        DocKind::Doc | DocKind::Xls | DocKind::Xlsx => String::new(),
    };
    truncate_chars(&text, MAX_CONTENT_CHARS)
}

/// Truncates on a character boundary, never splitting a multi-byte char.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn extract_pdf(path: &Path) -> String {
    match pdf_extract::extract_text(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("PDF text extraction failed for {}: {}", path.display(), e);
            String::new()
        }
    }
}

fn extract_docx(path: &Path) -> String {
    match try_extract_docx(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("DOCX text extraction failed for {}: {}", path.display(), e);
            String::new()
        }
    }
}

/// DOCX is a zip; the body lives in word/document.xml. Stripping tags and
/// turning paragraph ends into newlines is enough for archival search.
fn try_extract_docx(path: &Path) -> std::io::Result<String> {
    let file = std::fs::File::open(path)?;
    let mut zip = zip::ZipArchive::new(file).map_err(std::io::Error::other)?;
    let mut entry = zip
        .by_name("word/document.xml")
        .map_err(std::io::Error::other)?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(strip_xml_tags(&xml))
}

fn strip_xml_tags(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len() / 4);
    let mut in_tag = false;
    let mut tag = String::new();

    for c in xml.chars() {
        match c {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' => {
                in_tag = false;
                // Paragraph and line-break closers become newlines
                if tag == "/w:p" || tag == "w:br" || tag == "w:br/" {
                    out.push('\n');
                }
            }
            _ if in_tag => tag.push(c),
            _ => out.push(c),
        }
    }

    out.trim().to_string()
}

fn extract_txt(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::warn!("Text read failed for {}: {}", path.display(), e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_kind_from_url_path() {
        assert_eq!(DocKind::from_url_path("/a/report.pdf"), Some(DocKind::Pdf));
        assert_eq!(DocKind::from_url_path("/a/REPORT.PDF"), Some(DocKind::Pdf));
        assert_eq!(DocKind::from_url_path("/a/form.docx"), Some(DocKind::Docx));
        assert_eq!(DocKind::from_url_path("/a/data.xlsx"), Some(DocKind::Xlsx));
        assert_eq!(DocKind::from_url_path("/notes.txt"), Some(DocKind::Txt));
        assert_eq!(DocKind::from_url_path("/page.html"), None);
        assert_eq!(DocKind::from_url_path("/page"), None);
    }

    #[test]
    fn test_has_document_extension() {
        assert!(has_document_extension("/files/a.pdf"));
        assert!(!has_document_extension("/files/a.png"));
    }

    #[test]
    fn test_archive_dirs() {
        assert_eq!(DocKind::Pdf.archive_dir(), "pdf");
        assert_eq!(DocKind::Txt.archive_dir(), "docs");
        assert_eq!(DocKind::Docx.archive_dir(), "docs");
        assert_eq!(DocKind::Xls.archive_dir(), "docs");
    }

    #[test]
    fn test_txt_extraction_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        // Valid UTF-8 followed by a stray byte
        f.write_all(b"hello world\n\xff").unwrap();

        let text = extract_text(DocKind::Txt, &path);
        assert!(text.starts_with("hello world"));
    }

    #[test]
    fn test_legacy_formats_yield_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.doc");
        std::fs::write(&path, b"\xd0\xcf\x11\xe0 binary").unwrap();
        assert_eq!(extract_text(DocKind::Doc, &path), "");
    }

    #[test]
    fn test_corrupt_pdf_yields_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();
        assert_eq!(extract_text(DocKind::Pdf, &path), "");
    }

    #[test]
    fn test_strip_xml_tags_paragraphs() {
        let xml = "<w:document><w:p><w:t>First</w:t></w:p><w:p><w:t>Second</w:t></w:p></w:document>";
        assert_eq!(strip_xml_tags(xml), "First\nSecond");
    }

    #[test]
    fn test_truncate_chars_boundary() {
        let s = "héllo";
        assert_eq!(truncate_chars(s, 2), "hé");
        assert_eq!(truncate_chars(s, 100), "héllo");
    }
}
