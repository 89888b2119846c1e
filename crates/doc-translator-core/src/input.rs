//! Source payloads and file reading.
//!
//! Every input reaches the orchestrator as a [`SourcePayload`]: plain text
//! (typed directly, or read from TXT/PDF) or HTML (DOCX converted by the
//! browser, or an HTML file).

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Text-or-HTML payload plus its type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourcePayload {
    Text { content: String },
    Html { html: String },
}

impl SourcePayload {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self::Html { html: html.into() }
    }

    pub const fn content_type(&self) -> ContentType {
        match self {
            Self::Text { .. } => ContentType::Text,
            Self::Html { .. } => ContentType::Html,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text { content } => content,
            Self::Html { html } => html,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

/// Kind of content produced by a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Html,
}

impl ContentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Html => "html",
        }
    }
}

/// Where the input came from; direct entry has its own size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputOrigin {
    Direct,
    File,
}

/// Accepted source file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
    Docx,
    /// DOCX already converted to HTML
    Html,
}

impl FileKind {
    /// Detect the kind from a file name's extension (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "txt" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "html" | "htm" => Ok(Self::Html),
            _ => Err(Error::UnsupportedFileType(name.to_string())),
        }
    }
}

/// Check a file's type and size before reading it.
pub fn validate_file(name: &str, size: usize, max_bytes: usize) -> Result<FileKind> {
    let kind = FileKind::from_name(name)?;
    if size > max_bytes {
        return Err(Error::InputTooLarge {
            actual: size,
            limit: max_bytes,
            unit: "bytes",
        });
    }
    Ok(kind)
}

/// Turn an uploaded file into a payload.
pub fn read_source_bytes(name: &str, bytes: &[u8]) -> Result<SourcePayload> {
    let kind = FileKind::from_name(name)?;
    debug!("Reading {} ({:?}, {} bytes)", name, kind, bytes.len());

    match kind {
        FileKind::Text => {
            let content = std::str::from_utf8(bytes)
                .map_err(|e| Error::Extraction(format!("{name} is not valid UTF-8 text: {e}")))?;
            Ok(SourcePayload::text(content))
        }
        FileKind::Pdf => read_pdf_text(bytes).map(SourcePayload::text),
        FileKind::Html => {
            let html = std::str::from_utf8(bytes)
                .map_err(|e| Error::Extraction(format!("{name} is not valid UTF-8: {e}")))?;
            Ok(SourcePayload::html(html))
        }
        FileKind::Docx => Err(Error::Extraction(
            "DOCX files must be converted to HTML before they are uploaded".to_string(),
        )),
    }
}

/// Read a file from disk, enforcing the size ceiling first.
pub fn read_source_file(path: impl AsRef<Path>, max_bytes: usize) -> Result<SourcePayload> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let size = std::fs::metadata(path)?.len();
    validate_file(name, usize::try_from(size).unwrap_or(usize::MAX), max_bytes)?;

    let bytes = std::fs::read(path)?;
    read_source_bytes(name, &bytes)
}

/// Extract text page by page, separating pages with "--- Page N ---" markers.
fn read_pdf_text(bytes: &[u8]) -> Result<String> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| Error::Extraction(format!("Failed to extract text from PDF: {e}")))?;

    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    let mut text = String::new();

    for (i, page_num) in pages.iter().enumerate() {
        let page_text = doc
            .extract_text(&[*page_num])
            .map_err(|e| Error::Extraction(format!("Failed to extract text from PDF: {e}")))?;

        for line in page_text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
            text.push_str(line);
            text.push('\n');
        }

        if i + 1 < pages.len() {
            text.push_str(&format!("\n--- Page {} ---\n\n", i + 2));
        }
    }

    info!("Extracted {} characters from {} PDF page(s)", text.len(), pages.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_kind_from_name() {
        assert_eq!(FileKind::from_name("notes.TXT").unwrap(), FileKind::Text);
        assert_eq!(FileKind::from_name("paper.pdf").unwrap(), FileKind::Pdf);
        assert_eq!(FileKind::from_name("report.Docx").unwrap(), FileKind::Docx);
        assert_eq!(FileKind::from_name("report.htm").unwrap(), FileKind::Html);
        assert!(matches!(
            FileKind::from_name("image.png"),
            Err(Error::UnsupportedFileType(_))
        ));
        assert!(FileKind::from_name("README").is_err());
    }

    #[test]
    fn test_validate_file_size() {
        let max = 10 * 1024 * 1024;
        assert!(validate_file("a.txt", max, max).is_ok());
        assert!(matches!(
            validate_file("a.txt", max + 1, max),
            Err(Error::InputTooLarge { unit: "bytes", .. })
        ));
    }

    #[test]
    fn test_payload_tagging() {
        let text: SourcePayload =
            serde_json::from_str(r#"{"type": "text", "content": "Hello"}"#).unwrap();
        assert_eq!(text, SourcePayload::text("Hello"));

        let html: SourcePayload =
            serde_json::from_str(r#"{"type": "html", "html": "<p>Hi</p>"}"#).unwrap();
        assert_eq!(html.content_type(), ContentType::Html);
        assert_eq!(html.as_str(), "<p>Hi</p>");
    }

    #[test]
    fn test_read_text_and_html_bytes() {
        assert_eq!(
            read_source_bytes("a.txt", "Hola".as_bytes()).unwrap(),
            SourcePayload::text("Hola")
        );
        assert_eq!(
            read_source_bytes("a.html", b"<p>x</p>").unwrap(),
            SourcePayload::html("<p>x</p>")
        );
        assert!(matches!(
            read_source_bytes("a.txt", &[0xff, 0xfe, 0x00]),
            Err(Error::Extraction(_))
        ));
    }

    #[test]
    fn test_raw_docx_asks_for_html() {
        let err = read_source_bytes("a.docx", b"PK").unwrap_err();
        assert_eq!(
            err.to_string(),
            "error reading file: DOCX files must be converted to HTML before they are uploaded"
        );
    }

    #[test]
    fn test_invalid_pdf_is_an_extraction_error() {
        assert!(matches!(
            read_source_bytes("broken.pdf", b"not a pdf"),
            Err(Error::Extraction(_))
        ));
    }

    #[test]
    fn test_read_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"Once upon a time.").unwrap();

        let payload = read_source_file(&path, 1024).unwrap();
        assert_eq!(payload, SourcePayload::text("Once upon a time."));

        assert!(matches!(
            read_source_file(&path, 4),
            Err(Error::InputTooLarge { .. })
        ));
    }
}
