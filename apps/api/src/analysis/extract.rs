//! Format extractors: turn a validated upload into plain text.
//!
//! Dispatch is on `DocumentFormat`, resolved from the declared media type.
//! Adding a format means adding a variant; the `match` in `extract_text`
//! will not compile until it is handled.

use std::fmt;
use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::analysis::input::UploadedFile;
use crate::errors::AppError;

pub const TEXT_MEDIA_TYPE: &str = "text/plain";
pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Main body part inside a DOCX container.
const DOCX_BODY_PART: &str = "word/document.xml";

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Resolves an exact, case-sensitive media type string.
    pub fn from_media_type(media_type: &str) -> Result<Self, AppError> {
        match media_type {
            TEXT_MEDIA_TYPE => Ok(DocumentFormat::PlainText),
            PDF_MEDIA_TYPE => Ok(DocumentFormat::Pdf),
            DOCX_MEDIA_TYPE => Ok(DocumentFormat::Docx),
            other => Err(AppError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentFormat::PlainText => "TXT",
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
        };
        f.write_str(label)
    }
}

/// Underlying parser failures, wrapped into `AppError::Extraction`.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF parse error: {0}")]
    Pdf(String),

    #[error("DOCX container error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("DOCX has no word/document.xml part")]
    MissingDocumentBody,

    #[error("I/O error reading document: {0}")]
    Io(#[from] std::io::Error),

    #[error("parser aborted unexpectedly")]
    Aborted,
}

/// Extracts plain text from `file` according to its declared media type.
///
/// Callers are expected to have run `validate_file` first; an unknown type
/// still fails here with `UnsupportedFormat`.
pub fn extract_text(file: &UploadedFile) -> Result<String, AppError> {
    let format = DocumentFormat::from_media_type(&file.media_type)?;

    let result = match format {
        DocumentFormat::PlainText => extract_plain_text(&file.bytes),
        DocumentFormat::Pdf => extract_pdf(&file.bytes),
        DocumentFormat::Docx => extract_docx(&file.bytes),
    };

    let text = result.map_err(|source| AppError::Extraction { format, source })?;
    debug!(
        "Extracted {} chars from {format} '{}'",
        text.chars().count(),
        file.filename
    );
    Ok(text)
}

/// Runs `extract_text` on the blocking pool. A parser panic becomes an
/// `Extraction` error instead of tearing down the request task.
pub async fn extract_text_blocking(file: UploadedFile) -> Result<String, AppError> {
    let format = DocumentFormat::from_media_type(&file.media_type)?;
    tokio::task::spawn_blocking(move || extract_text(&file))
        .await
        .map_err(|_| AppError::Extraction {
            format,
            source: ExtractError::Aborted,
        })?
}

/// Decodes as UTF-8 the way a browser's `File.text()` does: a leading BOM is
/// dropped and invalid sequences become U+FFFD.
fn extract_plain_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    match archive.by_name(DOCX_BODY_PART) {
        Ok(mut part) => {
            part.read_to_string(&mut xml)?;
        }
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(ExtractError::MissingDocumentBody)
        }
        Err(e) => return Err(e.into()),
    }
    Ok(docx_xml_to_text(&xml))
}

/// Text runs, run-level tabs and breaks, and paragraph ends.
/// Tab stops in paragraph properties carry attributes and are not matched,
/// nor are self-closing empty `<w:t/>` runs.
static DOCX_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*[^/>]|\s*)>(.*?)</w:t>|<w:tab/>|<w:br(?:\s[^>]*)?/>|<w:cr/>|</w:p>")
        .expect("DOCX token regex is valid")
});

/// Flattens WordprocessingML to raw text: one blank line after each paragraph,
/// formatting dropped, deleted text and field codes skipped.
fn docx_xml_to_text(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len() / 4);
    for caps in DOCX_TOKEN.captures_iter(xml) {
        if let Some(run) = caps.get(1) {
            out.push_str(&html_escape::decode_html_entities(run.as_str()));
            continue;
        }
        match &caps[0] {
            "<w:tab/>" => out.push('\t'),
            "</w:p>" => out.push_str("\n\n"),
            _ => out.push('\n'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::io::Write;

    fn file(media_type: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile::new("doc", media_type, Bytes::copy_from_slice(bytes))
    }

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer.start_file(DOCX_BODY_PART, options).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    /// Minimal uncompressed PDF, one Helvetica text line per page.
    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let kids = (0..pages.len())
            .map(|i| format!("{} 0 R", 4 + 2 * i))
            .collect::<Vec<_>>()
            .join(" ");
        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];
        for (i, text) in pages.iter().enumerate() {
            let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                5 + 2 * i
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ));
        }

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }
        let xref_at = pdf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            tail.push_str(&format!("{offset:010} 00000 n \n"));
        }
        tail.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.extend_from_slice(tail.as_bytes());
        pdf
    }

    fn wrap_body(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    #[test]
    fn test_plain_text_is_verbatim() {
        let text = extract_text(&file(TEXT_MEDIA_TYPE, b"Hello world")).unwrap();
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn test_plain_text_keeps_whitespace_and_unicode() {
        let raw = "  Zoë — Senior Engineer\r\n\tRust, Go\n";
        let text = extract_text(&file(TEXT_MEDIA_TYPE, raw.as_bytes())).unwrap();
        assert_eq!(text, raw);
    }

    #[test]
    fn test_plain_text_drops_bom() {
        let text = extract_text(&file(TEXT_MEDIA_TYPE, b"\xEF\xBB\xBFHello")).unwrap();
        assert_eq!(text, "Hello");
    }

    #[test]
    fn test_plain_text_invalid_utf8_is_replaced() {
        // Windows-1252 bytes for "José García".
        let text = extract_text(&file(
            TEXT_MEDIA_TYPE,
            b"Jos\xe9 Garc\xeda, Senior Engineer",
        ))
        .unwrap();
        assert_eq!(text, "Jos\u{FFFD} Garc\u{FFFD}a, Senior Engineer");
    }

    #[test]
    fn test_plain_text_bom_then_invalid_bytes() {
        let text = extract_text(&file(TEXT_MEDIA_TYPE, b"\xEF\xBB\xBFH\xFF\xFEi")).unwrap();
        assert_eq!(text, "H\u{FFFD}\u{FFFD}i");
    }

    #[test]
    fn test_unknown_type_rejected_when_called_directly() {
        let err = extract_text(&file("image/png", b"\x89PNG")).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(ref t) if t == "image/png"));
    }

    #[test]
    fn test_docx_paragraphs_runs_and_entities() {
        let xml = wrap_body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>Jane</w:t></w:r><w:r><w:t xml:space="preserve"> Doe</w:t></w:r></w:p><w:p><w:r><w:t>R&amp;D</w:t><w:tab/><w:t>2019&#8211;2024</w:t><w:br/><w:t>Rust &lt;3</w:t></w:r></w:p>"#,
        );
        let text = extract_docx(&build_docx(&xml)).unwrap();
        assert_eq!(text, "Jane Doe\n\nR&D\t2019\u{2013}2024\nRust <3\n\n");
    }

    #[test]
    fn test_docx_run_tag_with_trailing_space() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t >Senior</w:t><w:t xml:space="preserve" > Engineer</w:t><w:t/><w:t /></w:r></w:p>"#,
        );
        let text = extract_docx(&build_docx(&xml)).unwrap();
        assert_eq!(text, "Senior Engineer\n\n");
    }

    #[test]
    fn test_docx_skips_deleted_text_and_field_codes() {
        let xml = wrap_body(
            r#"<w:p><w:del><w:r><w:delText>old</w:delText></w:r></w:del><w:r><w:instrText> HYPERLINK "x" </w:instrText></w:r><w:r><w:t>new</w:t></w:r></w:p>"#,
        );
        let text = extract_docx(&build_docx(&xml)).unwrap();
        assert_eq!(text, "new\n\n");
    }

    #[test]
    fn test_docx_through_dispatch() {
        let xml = wrap_body("<w:p><w:r><w:t>Kubernetes</w:t></w:r></w:p>");
        let text = extract_text(&file(DOCX_MEDIA_TYPE, &build_docx(&xml))).unwrap();
        assert_eq!(text.trim(), "Kubernetes");
    }

    #[test]
    fn test_docx_not_a_zip_is_extraction_error() {
        let err = extract_text(&file(DOCX_MEDIA_TYPE, b"definitely not a zip")).unwrap_err();
        assert!(matches!(
            err,
            AppError::Extraction {
                format: DocumentFormat::Docx,
                source: ExtractError::Zip(_)
            }
        ));
    }

    #[test]
    fn test_docx_zip_without_body_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("notes.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"hi").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = extract_docx(&bytes).unwrap_err();
        assert!(matches!(err, ExtractError::MissingDocumentBody));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_extraction_error() {
        let err = extract_text_blocking(file(PDF_MEDIA_TYPE, b"%PDF-1.4\nthis is not a pdf"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Extraction {
                format: DocumentFormat::Pdf,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_pdf_pages_extracted_in_order() {
        let pdf = build_pdf(&["Kubernetes", "Terraform"]);
        let text = extract_text_blocking(file(PDF_MEDIA_TYPE, &pdf))
            .await
            .unwrap();
        let first = text.find("Kubernetes").expect("page 1 text");
        let second = text.find("Terraform").expect("page 2 text");
        assert!(first < second, "pages out of order: {text:?}");
    }

    #[tokio::test]
    async fn test_blocking_extraction_returns_text() {
        let text = extract_text_blocking(file(TEXT_MEDIA_TYPE, b"Rust engineer"))
            .await
            .unwrap();
        assert_eq!(text, "Rust engineer");
    }
}
