//! Upload staging
//!
//! Validates uploaded caption files before they reach the indexer: document id
//! format, extension allow-list, filename sanitization, UTF-8 body.

use crate::interface::{owned_lines, CapSearchError, LineStream};

/// Extensions accepted for upload (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: &[&str] = &["vtt", "srt", "txt"];

const MAX_DOC_ID_LENGTH: usize = 64;
const MAX_FILENAME_LENGTH: usize = 255;

/// An upload that passed validation and is ready for indexing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    doc_id: String,
    filename: String,
    text: String,
}

impl StagedUpload {
    /// Validate upload metadata and body.
    ///
    /// `filename` may carry client-side path components; only the final
    /// component is kept and characters outside `[A-Za-z0-9._-]` become `_`.
    pub fn validate(doc_id: &str, filename: &str, body: Vec<u8>) -> Result<Self, CapSearchError> {
        let doc_id = doc_id.trim();
        if !is_valid_doc_id(doc_id) {
            return Err(CapSearchError::InvalidInput(format!(
                "document id must match [A-Za-z0-9_-]{{1,{MAX_DOC_ID_LENGTH}}}, got '{doc_id}'"
            )));
        }

        let filename = sanitize_filename(filename)
            .ok_or_else(|| CapSearchError::InvalidInput("missing or empty filename".into()))?;

        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(CapSearchError::InvalidInput(format!(
                "file type '{extension}' not allowed (expected one of {})",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let text = String::from_utf8(body)
            .map_err(|_| CapSearchError::InvalidInput(format!("{filename} is not valid UTF-8")))?;
        let text = match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_owned(),
            None => text,
        };

        Ok(Self {
            doc_id: doc_id.to_owned(),
            filename,
            text,
        })
    }

    /// Read and validate a file from disk, using its name as the filename.
    pub fn from_path(doc_id: &str, path: &std::path::Path) -> Result<Self, CapSearchError> {
        let body = std::fs::read(path).map_err(|e| {
            CapSearchError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::validate(doc_id, &filename, body)
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the upload into `(doc_id, lines)`; the body is streamed, not copied.
    pub fn into_parts(self) -> (String, LineStream) {
        (self.doc_id, owned_lines(self.text))
    }
}

fn is_valid_doc_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_DOC_ID_LENGTH
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Keep the last path component, replace unsafe characters, drop leading dots.
fn sanitize_filename(raw: &str) -> Option<String> {
    let last = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(raw).trim();
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return None;
    }
    let truncated: String = cleaned.chars().take(MAX_FILENAME_LENGTH).collect();
    Some(truncated)
}
