use wasm_bindgen::prelude::*;

use crate::image_loader::SourceImageProvider;
use crate::render::VectorRenderer;

fn to_js(e: crate::CertError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// PDF bytes for a JSON request. Only inline and data-URI images load here.
#[wasm_bindgen]
pub fn render_certificate_pdf(json: &str) -> Result<Vec<u8>, JsValue> {
    let request = crate::parse_request(json).map_err(to_js)?;
    VectorRenderer::new(Box::new(SourceImageProvider))
        .render(&request.certificate, &request.official)
        .map(|document| document.pdf)
        .map_err(to_js)
}

#[wasm_bindgen]
pub fn render_certificate_preview(json: &str) -> Result<String, JsValue> {
    let request = crate::parse_request(json).map_err(to_js)?;
    Ok(crate::create_preview_markup(&request.certificate, &request.official))
}
