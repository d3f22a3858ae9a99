//! Student document parsing
//!
//! Extracts text from uploaded applicant documents. PDF support is gated
//! behind the `pdf` feature; other formats report a structured parsing
//! error instead of failing the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

/// Largest accepted upload, in bytes
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

const SUPPORTED_EXTENSIONS: [&str; 1] = ["pdf"];

/// Outcome of parsing one uploaded document.
///
/// `success` is true iff no parsing errors were recorded; partial text
/// extraction with per-page errors reports `success: false` but still
/// carries whatever text was recovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub success: bool,
    pub file_name: String,
    pub file_size: u64,
    pub text_content: String,
    pub page_count: usize,
    pub metadata: Map<String, Value>,
    pub parsing_errors: Vec<String>,
}

impl ParsedDocument {
    fn empty(file_name: String, file_size: u64) -> Self {
        Self {
            success: false,
            file_name,
            file_size,
            text_content: String::new(),
            page_count: 0,
            metadata: Map::new(),
            parsing_errors: Vec::new(),
        }
    }
}

/// Outcome of pre-flight validation of an uploaded file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileValidation {
    pub valid: bool,
    pub file_exists: bool,
    pub supported_format: bool,
    pub file_size_ok: bool,
    pub errors: Vec<String>,
}

/// Check whether a file can be parsed before attempting extraction
pub fn validate_file(path: &Path) -> FileValidation {
    let mut validation = FileValidation {
        valid: false,
        file_exists: path.exists(),
        supported_format: false,
        file_size_ok: false,
        errors: Vec::new(),
    };

    if !validation.file_exists {
        validation.errors.push("File does not exist".to_string());
        return validation;
    }

    let extension = file_extension(path);
    validation.supported_format = SUPPORTED_EXTENSIONS.contains(&extension.as_str());
    if !validation.supported_format {
        validation
            .errors
            .push(format!("Unsupported file format: .{}", extension));
    }

    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    validation.file_size_ok = file_size <= MAX_FILE_SIZE;
    if !validation.file_size_ok {
        validation.errors.push(format!(
            "File too large: {} bytes (max: {})",
            file_size, MAX_FILE_SIZE
        ));
    }

    validation.valid =
        validation.file_exists && validation.supported_format && validation.file_size_ok;
    validation
}

/// Parse a document, extracting text and metadata.
///
/// Never raises; missing files, unsupported formats and extraction
/// failures all land in `parsing_errors`.
pub fn parse_document(path: &Path) -> ParsedDocument {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if !path.exists() {
        let mut doc = ParsedDocument::empty(file_name, 0);
        doc.parsing_errors
            .push(format!("File not found: {}", path.display()));
        return doc;
    }

    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let mut doc = ParsedDocument::empty(file_name, file_size);

    match file_extension(path).as_str() {
        "pdf" => parse_pdf(path, &mut doc),
        other => {
            doc.parsing_errors
                .push(format!("Unsupported file format: .{}", other));
        }
    }

    doc.success = doc.parsing_errors.is_empty();
    if !doc.success {
        warn!(
            "Parsed {} with {} error(s)",
            path.display(),
            doc.parsing_errors.len()
        );
    } else {
        debug!(
            "Parsed {} ({} pages, {} chars)",
            path.display(),
            doc.page_count,
            doc.text_content.len()
        );
    }

    doc
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(feature = "pdf")]
fn parse_pdf(path: &Path, doc: &mut ParsedDocument) {
    match pdf_extract::extract_text(path) {
        Ok(text) => {
            // pdf-extract separates pages with form feeds
            doc.page_count = text.matches('\x0c').count().max(1);
            doc.text_content = text.trim().to_string();
        }
        Err(e) => {
            doc.parsing_errors.push(format!("PDF parsing error: {}", e));
        }
    }
}

#[cfg(not(feature = "pdf"))]
fn parse_pdf(_path: &Path, doc: &mut ParsedDocument) {
    doc.parsing_errors.push(
        "PDF support not compiled in; rebuild with the 'pdf' feature".to_string(),
    );
}
