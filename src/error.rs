//! Structured error types for the certificate engine.
//!
//! Template misses and failed image fetches are not errors: they degrade to
//! the generic template and the placeholder seal. What remains is input
//! parsing, configuration, image decoding, and PDF assembly.

use thiserror::Error;

/// The unified error type returned by fallible public functions.
#[derive(Debug, Error)]
pub enum CertError {
    /// JSON input (certificate request or layout config) failed to parse.
    #[error("Failed to parse input: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// The layout config describes degenerate geometry or an unknown version.
    #[error("Invalid layout config: {0}")]
    InvalidConfig(String),
    /// An image could not be fetched or decoded.
    #[error("Image error: {0}")]
    Image(String),
    /// Layout or PDF generation failed.
    #[error("Render error: {0}")]
    Render(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for CertError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected schema. Check field names (camelCase) and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        CertError::Parse { source: e, hint }
    }
}
