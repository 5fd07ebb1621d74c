//! # Certificate Model
//!
//! The input records consumed by the engine and the results it hands back.
//! Inputs are produced elsewhere (a request workflow that has already
//! validated and persisted them) and arrive here as plain data; the engine
//! only ever borrows them.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One certificate instance to render.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateContentData {
    pub id: String,
    /// Free-text certificate type, e.g. "Certificate of Indigency".
    /// Drives template selection.
    #[serde(rename = "type")]
    pub certificate_type: String,
    /// Full name of the requesting resident.
    pub requested_by: String,
    pub purpose: String,
    /// Issuance date source. Unparsable values fall back to today.
    pub generated_on: String,

    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub age: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub income: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub income_year: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub employment_period: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub business_location: Option<String>,
    #[serde(default)]
    pub closure_date: Option<String>,
    #[serde(default)]
    pub closure_reason: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub non_residence_duration: Option<String>,
    #[serde(default)]
    pub support_details: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub allowance_amount: Option<String>,

    /// Externally hosted signature image.
    #[serde(default)]
    pub signature_url: Option<String>,
    /// Gate for rendering `signature_url`.
    #[serde(default)]
    pub has_signature: bool,
}

impl CertificateContentData {
    /// The signature source, only when the signature is gated in and the
    /// URL is non-blank.
    pub fn signature_source(&self) -> Option<&str> {
        if !self.has_signature {
            return None;
        }
        present(&self.signature_url)
    }
}

/// Treat an optional field as present only when it has non-blank content.
pub fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The signing official, resolved by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfficialInfo {
    pub name: String,
    pub position: String,
}

/// A request as accepted by the CLI and the wasm bindings.
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateRequest {
    pub certificate: CertificateContentData,
    pub official: OfficialInfo,
}

/// A successfully rendered certificate.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Suggested download name, e.g. `certificate-of-indigency-juan-dela-cruz.pdf`.
    pub filename: String,
    pub pdf: Vec<u8>,
    pub issued_on: NaiveDate,
}

/// Outcome of a vector render. Never an `Err`: failures are reported in
/// `error` with `success == false` and no bytes.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    #[serde(skip)]
    pub document: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn ok(document: RenderedDocument) -> Self {
        Self {
            success: true,
            document: Some(document.pdf),
            filename: Some(document.filename),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            document: None,
            filename: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringOrNumber::Text(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    }))
}

/// Lower-case ASCII alphanumerics joined by single dashes.
pub fn slugify(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_')
            && !last_dash
            && !result.is_empty()
        {
            result.push('-');
            last_dash = true;
        }
    }

    let trimmed = result.trim_matches('-');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
