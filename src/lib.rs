//! # Barangay Certificate
//!
//! A declarative layout engine for barangay certificates.
//!
//! One geometry config describes the page. One template registry turns a
//! certificate request into title and body text. Both are resolved into a
//! single display list, which two renderers draw: a vector PDF writer and an
//! HTML preview. Neither renderer decides where anything goes, so they
//! cannot drift apart.
//!
//! ## Architecture
//!
//! ```text
//! CertificateContentData + OfficialInfo
//!       ↓
//!   [template]  : certificate type → title lines + body paragraphs
//!       ↓
//!   [content]   : issuance date, signatory, footer, filename
//!       ↓
//!   [layout]    : config geometry → positioned display list
//!       ↓
//!   [pdf] / [preview]  : PDF bytes or HTML markup
//! ```

pub mod config;
pub mod content;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod preview;
pub mod render;
pub mod style;
pub mod template;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::CertError;
pub use preview::create_preview_markup;

use model::{CertificateContentData, CertificateRequest, GenerationResult, OfficialInfo};
use render::VectorRenderer;

/// Render a certificate to PDF with the built-in layout.
///
/// Never fails outward: any error is reported on the returned
/// [`GenerationResult`].
pub fn generate_document(
    data: &CertificateContentData,
    official: &OfficialInfo,
) -> GenerationResult {
    VectorRenderer::default().generate(data, official)
}

/// Parse a `{ "certificate": ..., "official": ... }` request.
pub fn parse_request(json: &str) -> Result<CertificateRequest, CertError> {
    Ok(serde_json::from_str(json)?)
}

/// Render a JSON request to PDF bytes.
pub fn render_request_json(json: &str) -> Result<Vec<u8>, CertError> {
    let request = parse_request(json)?;
    let document = VectorRenderer::default().render(&request.certificate, &request.official)?;
    Ok(document.pdf)
}
