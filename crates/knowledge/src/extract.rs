//! Text extraction from uploaded documents.
//!
//! The format is chosen from the file name's extension (case-insensitive)
//! before anything is read, so unsupported uploads fail with no side effects.

use async_trait::async_trait;
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detect the format from a file name.
    pub fn from_file_name(file_name: &str) -> AppResult<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        if extension.eq_ignore_ascii_case("pdf") {
            Ok(Self::Pdf)
        } else if extension.eq_ignore_ascii_case("docx") {
            Ok(Self::Docx)
        } else {
            Err(AppError::UnsupportedFormat(file_name.to_string()))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    /// Default extractor for this format.
    pub fn extractor(&self) -> Box<dyn TextExtractor> {
        match self {
            Self::Pdf => Box::new(PdfExtractor),
            Self::Docx => Box::new(DocxExtractor),
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Format-specific text extraction from an in-memory payload.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    fn format(&self) -> DocumentFormat;

    /// Extract the document's plain text.
    async fn extract(&self, bytes: &[u8]) -> AppResult<String>;
}

/// PDF text extraction via `pdf-extract`.
#[derive(Debug, Default)]
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    async fn extract(&self, bytes: &[u8]) -> AppResult<String> {
        debug!("Extracting PDF ({} bytes)", bytes.len());

        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| AppError::Extraction(format!("PDF extraction task failed: {}", e)))?
            .map_err(|e| AppError::Extraction(format!("PDF extraction failed: {}", e)))
    }
}

/// DOCX text extraction from the archive's `word/document.xml`.
#[derive(Debug, Default)]
pub struct DocxExtractor;

#[async_trait]
impl TextExtractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    async fn extract(&self, bytes: &[u8]) -> AppResult<String> {
        debug!("Extracting DOCX ({} bytes)", bytes.len());

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| AppError::Extraction(format!("Invalid DOCX archive: {}", e)))?;

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| AppError::Extraction(format!("DOCX has no document body: {}", e)))?
            .read_to_string(&mut xml)
            .map_err(|e| AppError::Extraction(format!("Failed to read DOCX body: {}", e)))?;

        Ok(docx_xml_to_text(&xml))
    }
}

/// Plain text of a WordprocessingML body.
///
/// Emits `<w:t>` run text, one line per `<w:p>` paragraph, `<w:tab/>` as a tab
/// and `<w:br/>`/`<w:cr/>` as a newline. Everything else is skipped.
pub fn docx_xml_to_text(xml: &str) -> String {
    let mut text = String::new();
    let mut in_run_text = false;
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        if in_run_text {
            text.push_str(&decode_entities(&rest[..open]));
        }

        let Some(close) = rest[open..].find('>') else {
            break;
        };
        let tag = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];

        let closing = tag.starts_with('/');
        let self_closing = tag.ends_with('/');
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default();

        match (name, closing) {
            ("w:t", false) => in_run_text = !self_closing,
            ("w:t", true) => in_run_text = false,
            ("w:tab", false) => text.push('\t'),
            ("w:br" | "w:cr", false) => text.push('\n'),
            ("w:p", true) => text.push('\n'),
            _ => {}
        }
    }

    text
}

/// Decode the predefined XML entities and numeric character references.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];

        let decoded = after.find(';').and_then(|semi| {
            let entity = &after[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
