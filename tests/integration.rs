//! End-to-end tests for the certificate pipeline.
//!
//! These tests go from request data to finished output. They verify:
//! - The PDF and the preview print the same text in the same order
//! - Unknown certificate types fall back to the generic template
//! - A failed seal fetch degrades to the placeholder instead of failing
//! - Signature images are gated by `hasSignature`
//! - Layout overrides reach both renderers
//! - Names the standard fonts cannot print fail the PDF rather than change
//! - Rendering with the HTTP provider is safe inside an async runtime

use std::io::Cursor;

use barangay_certificate::config::CertificateLayoutConfig;
use barangay_certificate::error::CertError;
use barangay_certificate::image_loader::{ImageProvider, LoadedImage, SourceImageProvider};
use barangay_certificate::model::{CertificateContentData, OfficialInfo};
use barangay_certificate::preview::PreviewRenderer;
use barangay_certificate::render::VectorRenderer;
use barangay_certificate::{create_preview_markup, parse_request};
use miniz_oxide::inflate::decompress_to_vec_zlib;

// ─── Helpers ────────────────────────────────────────────────────

struct Unreachable;

impl ImageProvider for Unreachable {
    fn fetch(&self, src: &str) -> Result<LoadedImage, CertError> {
        Err(CertError::Image(format!("connection refused: {}", src)))
    }
}

fn indigency() -> CertificateContentData {
    CertificateContentData {
        id: "CERT-1".into(),
        certificate_type: "Certificate of Indigency".into(),
        requested_by: "Juan Dela Cruz".into(),
        purpose: "financial assistance".into(),
        generated_on: "2024-01-15".into(),
        address: Some("123 Purok 1".into()),
        ..Default::default()
    }
}

fn official() -> OfficialInfo {
    OfficialInfo {
        name: "Jesus De Una".into(),
        position: "Punong Barangay".into(),
    }
}

fn render_pdf(renderer: &VectorRenderer, data: &CertificateContentData) -> Vec<u8> {
    let result = renderer.generate(data, &official());
    assert!(result.success, "render failed: {:?}", result.error);
    result.document.unwrap()
}

/// Inflate the page content stream (the only stream with a bare `/Length` dict).
fn content_stream(pdf: &[u8]) -> String {
    let marker = b"<< /Length ";
    let start = pdf.windows(marker.len()).position(|w| w == marker).unwrap();
    let rest = &pdf[start + marker.len()..];
    let len_end = rest.iter().position(|b| *b == b' ').unwrap();
    let len: usize = std::str::from_utf8(&rest[..len_end]).unwrap().parse().unwrap();
    let data_start = rest.windows(7).position(|w| w == b"stream\n").unwrap() + 7;
    let inflated = decompress_to_vec_zlib(&rest[data_start..data_start + len]).unwrap();
    String::from_utf8(inflated).unwrap()
}

/// Every `(...) Tj` string in drawing order, unescaped.
fn pdf_texts(pdf: &[u8]) -> Vec<String> {
    content_stream(pdf)
        .lines()
        .filter_map(|line| line.strip_prefix('(')?.strip_suffix(") Tj"))
        .map(unescape_pdf)
        .collect()
}

fn unescape_pdf(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            if bytes[i + 1].is_ascii_digit() && i + 3 < bytes.len() {
                let code = u8::from_str_radix(&s[i + 1..i + 4], 8).unwrap();
                out.push(code as char);
                i += 4;
            } else {
                out.push(bytes[i + 1] as char);
                i += 2;
            }
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

/// Text of every preview text box in document order, unescaped.
fn preview_texts(html: &str) -> Vec<String> {
    let marker = "white-space:pre\">";
    html.match_indices(marker)
        .map(|(i, _)| {
            let rest = &html[i + marker.len()..];
            let end = rest.find("</div>").unwrap();
            rest[..end]
                .replace("&lt;", "<")
                .replace("&gt;", ">")
                .replace("&quot;", "\"")
                .replace("&#39;", "'")
                .replace("&amp;", "&")
        })
        .collect()
}

fn png_data_uri(width: u32, height: u32) -> String {
    use base64::Engine;
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([30, 58, 138, 128]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&buf)
    )
}

// ─── Content parity ─────────────────────────────────────────────

#[test]
fn test_indigency_scenario_pdf() {
    let pdf = render_pdf(&VectorRenderer::new(Box::new(Unreachable)), &indigency());
    assert!(pdf.starts_with(b"%PDF-1.7"));
    assert!(pdf.ends_with(b"%%EOF\n"));

    let texts = pdf_texts(&pdf);
    let joined = texts.join(" ");
    assert!(joined.contains("JUAN DELA CRUZ"));
    assert!(joined.contains("123 Purok 1"));

    let issuance = texts
        .iter()
        .position(|t| t.starts_with("Given this 15th day of January, 2024."))
        .expect("issuance paragraph");
    let name = texts.iter().position(|t| t == "JESUS DE UNA").unwrap();
    let position = texts.iter().position(|t| t == "Punong Barangay").unwrap();
    assert!(issuance < name, "signature follows the body");
    assert_eq!(position, name + 1);
}

#[test]
fn test_indigency_scenario_preview() {
    let html = create_preview_markup(&indigency(), &official());
    let texts = preview_texts(&html);
    let joined = texts.join(" ");
    assert!(joined.contains("JUAN DELA CRUZ"));
    assert!(joined.contains("123 Purok 1"));
    assert!(texts.iter().any(|t| t.starts_with("Given this 15th day of January, 2024.")));
    assert!(texts.iter().any(|t| t == "JESUS DE UNA"));
    assert!(texts.iter().any(|t| t == "Punong Barangay"));
}

#[test]
fn test_renderers_print_identical_text() {
    let mut data = indigency();
    data.age = Some("34".into());
    data.income = Some("4500".into());
    data.income_year = Some("2023".into());

    let pdf = render_pdf(&VectorRenderer::new(Box::new(Unreachable)), &data);
    let html = create_preview_markup(&data, &official());
    assert_eq!(pdf_texts(&pdf), preview_texts(&html));
}

#[test]
fn test_latin_names_print_identically() {
    let mut data = indigency();
    data.requested_by = "Jos\u{e9} Pe\u{f1}a".into();
    data.address = Some("Purok Ni\u{f1}o, Sta. Mar\u{ed}a".into());

    let pdf = render_pdf(&VectorRenderer::new(Box::new(Unreachable)), &data);
    let html = create_preview_markup(&data, &official());
    let texts = pdf_texts(&pdf);
    assert_eq!(texts, preview_texts(&html));
    assert!(texts.iter().any(|t| t.contains("PE\u{d1}A")), "{:?}", texts);
    assert!(!texts.iter().any(|t| t.contains('?')), "{:?}", texts);
}

#[test]
fn test_unprintable_name_fails_instead_of_substituting() {
    let mut data = indigency();
    data.requested_by = "Nguy\u{1ec5}n V\u{103}n An".into();

    let result = VectorRenderer::new(Box::new(Unreachable)).generate(&data, &official());
    assert!(!result.success);
    assert!(result.document.is_none());
    let error = result.error.unwrap();
    assert!(error.contains("cannot be printed"), "{}", error);
    assert!(error.contains("U+1EC5"), "{}", error);

    // The preview still shows the name as given.
    let html = create_preview_markup(&data, &official());
    assert!(html.contains("NGUY\u{1ec4}N"));
}

#[test]
fn test_every_registered_type_has_parity() {
    for certificate_type in [
        "Certificate of Non-Residency",
        "Certificate of Residency",
        "Good Moral Character",
        "Barangay Clearance",
        "Certificate of Unemployment",
        "Certificate of Employment",
        "Business Closure",
        "Certificate of Income",
        "Certificate of Support",
        "Pet Ownership",
    ] {
        let mut data = indigency();
        data.certificate_type = certificate_type.into();
        let pdf = render_pdf(&VectorRenderer::new(Box::new(Unreachable)), &data);
        let html = create_preview_markup(&data, &official());
        assert_eq!(pdf_texts(&pdf), preview_texts(&html), "{}", certificate_type);
    }
}

// ─── Templates ──────────────────────────────────────────────────

#[test]
fn test_generic_title_for_unknown_type() {
    let mut data = indigency();
    data.certificate_type = "Pet Ownership".into();

    let pdf = render_pdf(&VectorRenderer::new(Box::new(Unreachable)), &data);
    let texts = pdf_texts(&pdf);
    assert!(texts.iter().any(|t| t == "P E T  O W N E R S H I P"));
    assert!(texts.iter().all(|t| !t.contains("   ")));

    let html = create_preview_markup(&data, &official());
    assert!(html.contains("data-template=\"generic\""));
}

#[test]
fn test_missing_optional_fields_degrade_to_generic_phrasing() {
    let data = CertificateContentData {
        id: "CERT-9".into(),
        certificate_type: "Certificate of Employment".into(),
        requested_by: "Maria Santos".into(),
        purpose: "  ".into(),
        generated_on: "2024-03-05".into(),
        job_title: Some(String::new()),
        ..Default::default()
    };
    let pdf = render_pdf(&VectorRenderer::new(Box::new(Unreachable)), &data);
    let joined = pdf_texts(&pdf).join(" ");
    assert!(joined.contains("MARIA SANTOS"));
    assert!(joined.contains("of legal age"));
    assert!(joined.contains("Given this 5th day of March, 2024."));
}

// ─── Images ─────────────────────────────────────────────────────

#[test]
fn test_unreachable_seal_draws_placeholder() {
    let pdf = render_pdf(&VectorRenderer::new(Box::new(Unreachable)), &indigency());
    let stream = content_stream(&pdf);
    let dots = CertificateLayoutConfig::builtin().seal.placeholder.dots as usize;
    assert_eq!(stream.matches("h\nf\n").count(), dots);
    assert!(!stream.contains(" Do"));
    assert!(!String::from_utf8_lossy(&pdf).contains("/XObject <<"));
}

#[test]
fn test_inline_seal_is_embedded() {
    let mut config = CertificateLayoutConfig::default();
    config.seal.src = png_data_uri(8, 8);
    let renderer = VectorRenderer::with_config(config, Box::new(SourceImageProvider));

    let pdf = render_pdf(&renderer, &indigency());
    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("/Subtype /Image /Width 8 /Height 8"));
    assert!(text.contains("/SMask"));
    let stream = content_stream(&pdf);
    assert!(stream.contains("/Im0 Do"));
    assert!(!stream.contains("h\nf\n"));
}

#[test]
fn test_signature_embedded_only_when_gated() {
    let mut data = indigency();
    data.signature_url = Some(png_data_uri(40, 10));
    let renderer = VectorRenderer::new(Box::new(SourceImageProvider));

    let pdf = render_pdf(&renderer, &data);
    assert!(!String::from_utf8_lossy(&pdf).contains("/Width 40 /Height 10"));

    data.has_signature = true;
    let pdf = render_pdf(&renderer, &data);
    assert!(String::from_utf8_lossy(&pdf).contains("/Width 40 /Height 10"));
    assert!(content_stream(&pdf).contains(" Do"));
}

#[test]
fn test_broken_signature_is_omitted() {
    let mut data = indigency();
    data.signature_url = Some("data:image/png;base64,bm90IGFuIGltYWdl".into());
    data.has_signature = true;

    let pdf = render_pdf(&VectorRenderer::new(Box::new(SourceImageProvider)), &data);
    assert!(pdf_texts(&pdf).iter().any(|t| t == "JESUS DE UNA"));
}

// ─── Configuration ──────────────────────────────────────────────

#[test]
fn test_config_override_reaches_both_renderers() {
    let config = CertificateLayoutConfig::from_json_str(
        r##"{
            "footer": { "lines": [ { "text": "Ref. {id} / {issued}" } ] },
            "body": { "salutation": "" }
        }"##,
    )
    .unwrap();

    let pdf = render_pdf(
        &VectorRenderer::with_config(config.clone(), Box::new(Unreachable)),
        &indigency(),
    );
    let texts = pdf_texts(&pdf);
    assert!(texts.iter().any(|t| t == "Ref. CERT-1 / January 15, 2024"));
    assert!(!texts.iter().any(|t| t == "TO WHOM IT MAY CONCERN:"));

    let html = PreviewRenderer::with_config(config).render(&indigency(), &official());
    assert_eq!(texts, preview_texts(&html));
}

#[test]
fn test_degenerate_config_fails_without_bytes() {
    let mut config = CertificateLayoutConfig::default();
    config.margin.left = 400.0;
    config.margin.right = 400.0;
    let result = VectorRenderer::with_config(config, Box::new(Unreachable))
        .generate(&indigency(), &official());
    assert!(!result.success);
    assert!(result.document.is_none());
    assert!(result.filename.is_none());
    assert!(result.error.is_some());
}

#[test]
fn test_overflowing_body_still_renders() {
    let mut data = indigency();
    data.purpose = "continued medical treatment ".repeat(300);
    let pdf = render_pdf(&VectorRenderer::new(Box::new(Unreachable)), &data);
    assert!(pdf_texts(&pdf).iter().any(|t| t == "JESUS DE UNA"));
}

// ─── Requests ───────────────────────────────────────────────────

#[test]
fn test_parse_request_json() {
    let request = parse_request(
        r#"{
            "certificate": {
                "id": "CERT-2",
                "type": "Barangay Clearance",
                "requestedBy": "Pedro Reyes",
                "purpose": "employment",
                "generatedOn": "2024-02-01T09:30:00Z",
                "age": 41,
                "hasSignature": false
            },
            "official": { "name": "Jesus De Una", "position": "Punong Barangay" }
        }"#,
    )
    .unwrap();
    assert_eq!(request.certificate.age.as_deref(), Some("41"));
    assert_eq!(request.certificate.certificate_type, "Barangay Clearance");
}

#[test]
fn test_parse_request_reports_hint() {
    let err = parse_request(r#"{ "certificate": { "id": 1 } }"#).unwrap_err();
    assert!(matches!(err, CertError::Parse { .. }));
    assert!(err.to_string().contains("Hint"));
}

#[cfg(all(feature = "http", not(target_arch = "wasm32")))]
#[tokio::test(flavor = "multi_thread")]
async fn test_generate_document_inside_async_runtime() {
    use barangay_certificate::image_loader::HttpImageProvider;

    let unreachable = "http://127.0.0.1:9/signature.png";
    assert!(HttpImageProvider::new().fetch(unreachable).is_err());

    let mut data = indigency();
    data.signature_url = Some(unreachable.into());
    data.has_signature = true;
    let result = barangay_certificate::generate_document(&data, &official());
    assert!(result.success, "{:?}", result.error);
    assert!(result.document.unwrap().starts_with(b"%PDF-1.7"));
}
