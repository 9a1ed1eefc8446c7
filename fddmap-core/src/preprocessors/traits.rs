// Preprocessor abstraction for document loading
//
// This module defines the boundary between layout-parser output (Docling JSON, ...)
// and the section analysis. Everything after this point works with a Document and
// is format-agnostic.

use crate::error::{FddError, Result};
use crate::types::Document;
use std::path::Path;

/// Preprocessor trait - converts a parser export into a Document
pub trait Preprocessor {
    /// Parse an in-memory export.
    fn parse_str(&self, content: &str) -> Result<Document>;

    /// Parse raw bytes; non-UTF-8 input is an invalid document.
    fn parse_bytes(&self, bytes: &[u8]) -> Result<Document> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| FddError::invalid_document(format!("input is not UTF-8: {e}")))?;
        self.parse_str(content)
    }

    /// Convenience method: read a file and parse it
    fn process_file(&self, input: &Path) -> Result<Document> {
        let bytes = std::fs::read(input).map_err(|e| FddError::io(input, e))?;
        self.parse_bytes(&bytes)
    }

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}
