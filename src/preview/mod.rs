//! HTML preview of a certificate.
//!
//! Walks the same [`LayoutPage`] the PDF writer draws, so every element lands
//! at the same place: points become CSS pixels at 96/72 and each element is
//! an absolutely positioned box. Images are referenced by source and left to
//! the browser; nothing is fetched here.

use std::borrow::Cow;
use std::fmt::Write;

use htmlize::{escape_attribute, escape_text};

use crate::config::CertificateLayoutConfig;
use crate::content::ResolvedCertificate;
use crate::layout::{
    CertificateLayout, DrawCommand, ImageFallback, LayoutElement, LayoutPage, Part, TextAlign,
    TextRun,
};
use crate::model::{CertificateContentData, OfficialInfo};

/// CSS pixels per PDF point.
pub const PX_PER_PT: f64 = 96.0 / 72.0;

pub struct PreviewRenderer {
    config: Cow<'static, CertificateLayoutConfig>,
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self {
            config: Cow::Borrowed(CertificateLayoutConfig::builtin()),
        }
    }
}

impl PreviewRenderer {
    pub fn with_config(config: CertificateLayoutConfig) -> Self {
        Self {
            config: Cow::Owned(config),
        }
    }

    pub fn render(&self, data: &CertificateContentData, official: &OfficialInfo) -> String {
        let content = ResolvedCertificate::resolve(data, official, &self.config);
        let page = CertificateLayout::new(&self.config).layout(&content);
        render_page(&page, &content)
    }
}

/// Preview markup over the built-in layout.
pub fn create_preview_markup(data: &CertificateContentData, official: &OfficialInfo) -> String {
    PreviewRenderer::default().render(data, official)
}

/// Serialize a laid-out page. Consecutive elements of one section share a
/// full-page wrapper, so element coordinates stay page-absolute.
pub fn render_page(page: &LayoutPage, content: &ResolvedCertificate) -> String {
    let mut html = String::with_capacity(16 * 1024);
    let _ = write!(
        html,
        "<div class=\"certificate-preview\" data-template=\"{}\" title=\"{}\"{} style=\"position:relative;width:{};height:{};background:#ffffff;overflow:hidden;font-kerning:none\">",
        content.template_id,
        escape_attribute(content.preview_description.as_str()),
        if page.overflow { " data-overflow=\"true\"" } else { "" },
        px(page.width),
        px(page.height),
    );

    let mut open: Option<&str> = None;
    for element in &page.elements {
        let section = element.part.section();
        if open != Some(section) {
            if open.is_some() {
                html.push_str("</div>");
            }
            let _ = write!(
                html,
                "<div class=\"{}\" style=\"position:absolute;left:0;top:0;width:100%;height:100%\">",
                section
            );
            open = Some(section);
        }
        write_element(&mut html, element);
    }
    if open.is_some() {
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

fn write_element(html: &mut String, el: &LayoutElement) {
    let class = part_class(el.part);
    match &el.draw {
        DrawCommand::Rect { fill, stroke } => {
            // The PDF stroke straddles the box edge; grow the border box by half a stroke.
            let half = stroke.map_or(0.0, |s| s.width / 2.0);
            let _ = write!(
                html,
                "<div class=\"{}\" style=\"{};box-sizing:border-box",
                class,
                boxed(el.x - half, el.y - half, el.width + 2.0 * half, el.height + 2.0 * half),
            );
            if let Some(fill) = fill {
                let _ = write!(html, ";background:{}", fill.to_css_hex());
            }
            if let Some(stroke) = stroke {
                let _ = write!(
                    html,
                    ";border:{} solid {}",
                    px(stroke.width),
                    stroke.color.to_css_hex()
                );
            }
            html.push_str("\"></div>");
        }
        DrawCommand::Gradient { top, bottom, .. } => {
            let _ = write!(
                html,
                "<div class=\"{}\" style=\"{};background:linear-gradient(to bottom, {}, {})\"></div>",
                class,
                boxed(el.x, el.y, el.width, el.height),
                top.to_css_hex(),
                bottom.to_css_hex(),
            );
        }
        DrawCommand::Text(run) => write_text(html, el, class, run),
        DrawCommand::Image { src, fallback } => {
            let alt = match (el.part, fallback) {
                (Part::Seal, _) => "Barangay seal",
                (Part::Signature, _) => "Signature",
                (_, ImageFallback::DotRing { .. }) => "Seal",
                (_, ImageFallback::Omit) => "",
            };
            let position = if el.part == Part::Signature { "center bottom" } else { "center" };
            let _ = write!(
                html,
                "<img class=\"{}\" src=\"{}\" alt=\"{}\" style=\"{};object-fit:contain;object-position:{}\">",
                class,
                escape_attribute(src.as_str()),
                alt,
                boxed(el.x, el.y, el.width, el.height),
                position,
            );
        }
    }
}

fn write_text(html: &mut String, el: &LayoutElement, class: &str, run: &TextRun) {
    let (family, weight, style) = run.font.css();
    let align = match run.align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
    };
    let _ = write!(html, "<div class=\"{}\"", class);
    if let Some(index) = run.paragraph {
        let _ = write!(html, " data-paragraph=\"{}\"", index);
    }
    let _ = write!(
        html,
        " style=\"{};font-family:{};font-size:{};font-weight:{};font-style:{};color:{};text-align:{};line-height:{};white-space:pre\">{}</div>",
        boxed(el.x, el.y, el.width, el.height),
        family,
        px(run.font_size),
        weight,
        style,
        run.color.to_css_hex(),
        align,
        px(el.height),
        escape_text(run.text.as_str()),
    );
}

fn part_class(part: Part) -> &'static str {
    match part {
        Part::Border => "cert-border",
        Part::Seal => "cert-seal",
        Part::Header => "cert-header-line",
        Part::Ribbon => "cert-ribbon",
        Part::Divider => "cert-divider",
        Part::Sidebar => "cert-sidebar-item",
        Part::ContentBox => "cert-content-box",
        Part::Title => "cert-title",
        Part::Salutation => "cert-salutation",
        Part::Body => "cert-body-line",
        Part::Signature => "cert-signature",
        Part::Footer => "cert-footer-line",
    }
}

fn boxed(x: f64, y: f64, w: f64, h: f64) -> String {
    format!(
        "position:absolute;left:{};top:{};width:{};height:{}",
        px(x),
        px(y),
        px(w),
        px(h)
    )
}

fn px(pt: f64) -> String {
    format!("{:.2}px", pt * PX_PER_PT)
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_px_conversion() {
        assert_eq!(px(72.0), "96.00px");
        assert_eq!(px(28.0), "37.33px");
    }

    #[test]
    fn test_root_carries_template_and_page_size() {
        let html = create_preview_markup(&data(), &official());
        assert!(html.starts_with("<div class=\"certificate-preview\" data-template=\"indigency\""));
        assert!(html.contains("width:793.71px;height:1122.52px"));
        assert!(!html.contains("data-overflow"));
        assert!(html.ends_with("</div>"));
    }

    #[test]
    fn test_sections_in_page_order() {
        let html = create_preview_markup(&data(), &official());
        let sections = [
            "cert-page",
            "cert-header",
            "cert-sidebar",
            "cert-content",
            "cert-footer",
        ];
        let order: Vec<usize> = sections
            .iter()
            .map(|s| html.find(&format!("<div class=\"{}\"", s)).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{:?}", order);
    }

    #[test]
    fn test_content_matches_resolved_text() {
        let html = create_preview_markup(&data(), &official());
        assert!(html.contains("JUAN DELA CRUZ"));
        assert!(html.contains("Given this 15th day of January, 2024."));
        assert!(html.contains(">JESUS DE UNA</div>"));
        assert!(html.contains(">Punong Barangay</div>"));
        assert!(html.contains("TO WHOM IT MAY CONCERN:"));
        assert!(html.contains("Control No. CERT-1"));
    }

    #[test]
    fn test_sidebar_gradient_uses_config_colors() {
        let config = CertificateLayoutConfig::builtin();
        let html = create_preview_markup(&data(), &official());
        let expected = format!(
            "linear-gradient(to bottom, {}, {})",
            config.sidebar.color_top.to_css_hex(),
            config.sidebar.color_bottom.to_css_hex()
        );
        assert!(html.contains(&expected));
    }

    #[test]
    fn test_border_grows_by_half_stroke() {
        // Margin 28pt, stroke 2pt: the border box starts 1pt outside the margin.
        let html = create_preview_markup(&data(), &official());
        assert!(html.contains(
            "<div class=\"cert-border\" style=\"position:absolute;left:36.00px;top:36.00px;"
        ));
        assert!(html.contains("border:2.67px solid #1e3a8a"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut certificate = data();
        certificate.requested_by = "<script>alert(1)</script> & co".into();
        let html = create_preview_markup(&certificate, &official());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;SCRIPT&gt;"));
        assert!(html.contains("&amp; CO"));
    }

    #[test]
    fn test_seal_img_references_source() {
        let html = create_preview_markup(&data(), &official());
        assert!(html.contains("<img class=\"cert-seal\" src=\"./assets/barangay-seal.png\""));
        assert!(html.contains("object-fit:contain"));
    }

    #[test]
    fn test_signature_img_only_when_gated() {
        let mut certificate = data();
        certificate.signature_url = Some("https://example.org/sig.png?a=1&b=2".into());
        let html = create_preview_markup(&certificate, &official());
        assert!(!html.contains("cert-signature\" src="));

        certificate.has_signature = true;
        let html = create_preview_markup(&certificate, &official());
        assert!(html.contains(
            "<img class=\"cert-signature\" src=\"https://example.org/sig.png?a=1&amp;b=2\""
        ));
    }

    #[test]
    fn test_body_lines_tagged_with_paragraph() {
        let html = create_preview_markup(&data(), &official());
        assert!(html.contains("class=\"cert-body-line\" data-paragraph=\"0\""));
        assert!(html.contains("class=\"cert-body-line\" data-paragraph=\"2\""));
    }

    #[test]
    fn test_overflow_flagged_on_root() {
        let mut certificate = data();
        certificate.purpose = "a very long purpose ".repeat(400);
        let html = create_preview_markup(&certificate, &official());
        assert!(html.contains(" data-overflow=\"true\""));
    }
}
