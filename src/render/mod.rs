//! # Vector Renderer
//!
//! Resolves content, lays out the page, fetches the seal and signature
//! through the injected [`ImageProvider`], and serializes the PDF.
//!
//! Image failures degrade the page: the seal becomes a ring of dots and the
//! signature is left out. Anything else that goes wrong (bad config,
//! degenerate geometry, text the standard fonts cannot print) fails the
//! whole render, and [`VectorRenderer::generate`] reports it as
//! `success: false` with no bytes.

use std::borrow::Cow;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::config::CertificateLayoutConfig;
use crate::content::ResolvedCertificate;
use crate::error::CertError;
use crate::image_loader::{ImageProvider, LoadedImage};
use crate::layout::{CertificateLayout, DrawCommand, LayoutPage, Part};
use crate::model::{CertificateContentData, GenerationResult, OfficialInfo, RenderedDocument};
use crate::pdf::{DocumentInfo, PdfWriter};

/// The provider used when the caller does not inject one: HTTP-capable
/// when the `http` feature is on, local sources only otherwise.
pub fn default_image_provider() -> Box<dyn ImageProvider> {
    #[cfg(all(feature = "http", not(target_arch = "wasm32")))]
    {
        Box::new(crate::image_loader::HttpImageProvider::new())
    }
    #[cfg(not(all(feature = "http", not(target_arch = "wasm32"))))]
    {
        Box::new(crate::image_loader::SourceImageProvider)
    }
}

pub struct VectorRenderer {
    config: Cow<'static, CertificateLayoutConfig>,
    provider: Box<dyn ImageProvider>,
}

impl Default for VectorRenderer {
    fn default() -> Self {
        Self::new(default_image_provider())
    }
}

impl VectorRenderer {
    /// Renderer over the built-in layout.
    pub fn new(provider: Box<dyn ImageProvider>) -> Self {
        Self {
            config: Cow::Borrowed(CertificateLayoutConfig::builtin()),
            provider,
        }
    }

    pub fn with_config(
        config: CertificateLayoutConfig,
        provider: Box<dyn ImageProvider>,
    ) -> Self {
        Self {
            config: Cow::Owned(config),
            provider,
        }
    }

    pub fn config(&self) -> &CertificateLayoutConfig {
        &self.config
    }

    /// Render one certificate to PDF bytes.
    pub fn render(
        &self,
        data: &CertificateContentData,
        official: &OfficialInfo,
    ) -> Result<RenderedDocument, CertError> {
        self.config.validate()?;

        let content = ResolvedCertificate::resolve(data, official, &self.config);
        let page = CertificateLayout::new(&self.config).layout(&content);
        let images = self.fetch_images(&page);

        let info = DocumentInfo {
            title: Some(data.certificate_type.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            author: Some(official.name.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            subject: Some(data.id.trim())
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        };
        let pdf = PdfWriter::new().write(&page, &images, &info)?;

        log::info!(
            "rendered {} ({} template, {} bytes)",
            content.filename,
            content.template_id,
            pdf.len()
        );
        Ok(RenderedDocument {
            filename: content.filename,
            pdf,
            issued_on: content.issued_on,
        })
    }

    /// Render without ever failing outward: errors and panics become
    /// `success: false`.
    pub fn generate(
        &self,
        data: &CertificateContentData,
        official: &OfficialInfo,
    ) -> GenerationResult {
        match catch_unwind(AssertUnwindSafe(|| self.render(data, official))) {
            Ok(Ok(document)) => GenerationResult::ok(document),
            Ok(Err(e)) => {
                log::error!("failed to render certificate {:?}: {}", data.id, e);
                GenerationResult::failed(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                log::error!(
                    "renderer panicked on certificate {:?}: {}",
                    data.id,
                    message
                );
                GenerationResult::failed(format!("Renderer panicked: {}", message))
            }
        }
    }

    /// One provider call. A panicking provider counts as a failed fetch.
    fn fetch_one(&self, src: &str) -> Result<LoadedImage, CertError> {
        catch_unwind(AssertUnwindSafe(|| self.provider.fetch(src))).unwrap_or_else(|panic| {
            Err(CertError::Image(format!(
                "image provider panicked: {}",
                panic_message(panic.as_ref())
            )))
        })
    }

    /// Fetch each distinct image source once. Failures are logged and left
    /// out of the map, which makes the writer draw the element's fallback.
    fn fetch_images(&self, page: &LayoutPage) -> HashMap<String, LoadedImage> {
        let mut images = HashMap::new();
        let mut failed: Vec<&str> = Vec::new();

        for element in &page.elements {
            let DrawCommand::Image { src, .. } = &element.draw else {
                continue;
            };
            if images.contains_key(src) || failed.contains(&src.as_str()) {
                continue;
            }
            match self.fetch_one(src) {
                Ok(image) => {
                    log::debug!(
                        "loaded {:?} image ({}x{})",
                        element.part,
                        image.width_px,
                        image.height_px
                    );
                    images.insert(src.clone(), image);
                }
                Err(e) => {
                    match element.part {
                        Part::Seal => {
                            log::warn!("seal image unavailable, drawing placeholder: {}", e)
                        }
                        Part::Signature => {
                            log::warn!("signature image unavailable, omitting it: {}", e)
                        }
                        part => log::warn!("{:?} image unavailable: {}", part, e),
                    }
                    failed.push(src);
                }
            }
        }
        images
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // ─── Helpers ────────────────────────────────────────────────

    /// Fails every fetch and counts calls.
    struct FailingProvider(Arc<AtomicUsize>);

    impl ImageProvider for FailingProvider {
        fn fetch(&self, src: &str) -> Result<LoadedImage, CertError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(CertError::Image(format!("unreachable: {}", src)))
        }
    }

    struct PanickingProvider;

    impl ImageProvider for PanickingProvider {
        fn fetch(&self, _src: &str) -> Result<LoadedImage, CertError> {
            panic!("provider exploded")
        }
    }

    fn data() -> CertificateContentData {
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

    fn failing() -> (Box<dyn ImageProvider>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Box::new(FailingProvider(calls.clone())), calls)
    }

    // ─── Tests ──────────────────────────────────────────────────

    #[test]
    fn test_seal_failure_still_succeeds() {
        let (provider, calls) = failing();
        let result = VectorRenderer::new(provider).generate(&data(), &official());
        assert!(result.success, "{:?}", result.error);
        assert!(result.error.is_none());
        let pdf = result.document.unwrap();
        assert!(pdf.starts_with(b"%PDF-1.7"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            result.filename.as_deref(),
            Some("certificate-of-indigency-juan-dela-cruz.pdf")
        );
    }

    #[test]
    fn test_signature_fetched_only_when_gated() {
        let mut certificate = data();
        certificate.signature_url = Some("https://example.org/sig.png".into());

        let (provider, calls) = failing();
        let renderer = VectorRenderer::new(provider);
        assert!(renderer.generate(&certificate, &official()).success);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        certificate.has_signature = true;
        assert!(renderer.generate(&certificate, &official()).success);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_invalid_config_reports_failure() {
        let mut config = CertificateLayoutConfig::default();
        config.sidebar.gradient_steps = 0;
        let (provider, _) = failing();
        let result =
            VectorRenderer::with_config(config, provider).generate(&data(), &official());
        assert!(!result.success);
        assert!(result.document.is_none());
        assert!(result.error.unwrap().contains("gradientSteps"));
    }

    #[test]
    fn test_panicking_provider_falls_back_to_placeholder() {
        let renderer = VectorRenderer::new(Box::new(PanickingProvider));
        let result = renderer.generate(&data(), &official());
        assert!(result.success, "{:?}", result.error);
        assert!(result.document.unwrap().starts_with(b"%PDF-1.7"));
    }

    #[test]
    fn test_unencodable_text_fails_without_bytes() {
        let mut certificate = data();
        certificate.requested_by = "Nguy\u{1ec5}n V\u{103}n An".into();
        let (provider, _) = failing();
        let result = VectorRenderer::new(provider).generate(&certificate, &official());
        assert!(!result.success);
        assert!(result.document.is_none());
        assert!(result.error.unwrap().contains("cannot be printed"));
    }

    #[test]
    fn test_render_reports_issue_date() {
        let (provider, _) = failing();
        let document = VectorRenderer::new(provider)
            .render(&data(), &official())
            .unwrap();
        assert_eq!(document.issued_on.to_string(), "2024-01-15");
        let text = String::from_utf8_lossy(&document.pdf);
        assert!(text.contains("/Title (Certificate of Indigency)"));
        assert!(text.contains("/Author (Jesus De Una)"));
        assert!(text.contains("/Subject (CERT-1)"));
    }

    #[test]
    fn test_renderer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VectorRenderer>();
    }
}
