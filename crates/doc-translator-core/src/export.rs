//! Downloadable artifacts: plain text, a standalone HTML page, or
//! Word-compatible markup.

use askama::Template;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::html::{ExtractedNode, HtmlDocument, extract_text_nodes};
use crate::input::ContentType;

const WORD_MIME: &str = "application/msword";
const HTML_MIME: &str = "text/html;charset=utf-8";
const TEXT_MIME: &str = "text/plain;charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Text,
    Html,
    Word,
}

impl ExportFormat {
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Text => TEXT_MIME,
            Self::Html => HTML_MIME,
            Self::Word => WORD_MIME,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Html => "html",
            Self::Word => "doc",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "word" | "doc" | "docx" => Ok(Self::Word),
            other => Err(Error::ConfigInvalid {
                field: "format".to_string(),
                reason: format!("unknown export format '{other}'"),
            }),
        }
    }
}

/// A rendered file ready to be written or served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Body of the exported document: markup passed through or plain paragraphs.
enum Body<'a> {
    Markup(&'a str),
    Paragraphs(Vec<&'a str>),
}

impl<'a> Body<'a> {
    fn new(content: &'a str, content_type: ContentType) -> Self {
        match content_type {
            ContentType::Html => Self::Markup(content),
            ContentType::Text => Self::Paragraphs(
                content
                    .split("\n\n")
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .collect(),
            ),
        }
    }

    fn markup(&self) -> Option<&str> {
        match self {
            Self::Markup(html) => Some(html),
            Self::Paragraphs(_) => None,
        }
    }

    fn paragraphs(&self) -> &[&'a str] {
        match self {
            Self::Markup(_) => &[],
            Self::Paragraphs(p) => p,
        }
    }
}

#[derive(Template)]
#[template(path = "export/document.html")]
struct DocumentTemplate<'a> {
    title: &'a str,
    body: Body<'a>,
}

#[derive(Template)]
#[template(path = "export/word.html")]
struct WordTemplate<'a> {
    title: &'a str,
    body: Body<'a>,
}

/// `report.pdf` -> `report_translated.<ext>`
pub fn output_file_name(original: &str, format: ExportFormat) -> String {
    let base = match original.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base,
        _ => original,
    };
    let base = if base.trim().is_empty() { "document" } else { base };
    format!("{}_translated.{}", base, format.extension())
}

/// Render translated `content` as a downloadable file.
pub fn render(
    content: &str,
    content_type: ContentType,
    format: ExportFormat,
    original_name: &str,
) -> Result<ExportFile> {
    if content.trim().is_empty() {
        return Err(Error::EmptyTranslationResult);
    }

    let title = "Translated Document";
    let bytes = match format {
        ExportFormat::Text => match content_type {
            ContentType::Text => content.as_bytes().to_vec(),
            ContentType::Html => plain_text(content).into_bytes(),
        },
        ExportFormat::Html => DocumentTemplate {
            title,
            body: Body::new(content, content_type),
        }
        .render()
        .map_err(template_error)?
        .into_bytes(),
        ExportFormat::Word => {
            let markup = WordTemplate {
                title,
                body: Body::new(content, content_type),
            }
            .render()
            .map_err(template_error)?;
            // Word detects the encoding from the byte-order mark
            format!("\u{feff}{markup}").into_bytes()
        }
    };

    Ok(ExportFile {
        file_name: output_file_name(original_name, format),
        mime_type: format.mime_type(),
        bytes,
    })
}

/// Visible text of an HTML fragment, one text run per line.
pub fn plain_text(html: &str) -> String {
    let doc = HtmlDocument::parse(html);
    extract_text_nodes(&doc)
        .map(|nodes| {
            nodes
                .iter()
                .map(ExtractedNode::text)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

fn template_error(e: askama::Error) -> Error {
    Error::Extraction(format!("failed to render export: {e}"))
}
