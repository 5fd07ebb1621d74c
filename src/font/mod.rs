//! # Font Roles
//!
//! The layout config never names a concrete font. It names a `FontRole`,
//! and each renderer maps the role to what it can draw: a standard Type1
//! font for the PDF, a CSS font stack for the preview. The standard 14 PDF
//! fonts need no embedding, so metrics are all we carry.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use serde::{Deserialize, Serialize};

/// The closed set of typefaces a certificate may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontRole {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    Times,
    TimesBold,
}

impl FontRole {
    pub fn standard_font(self) -> StandardFont {
        match self {
            FontRole::Helvetica => StandardFont::Helvetica,
            FontRole::HelveticaBold => StandardFont::HelveticaBold,
            FontRole::HelveticaOblique => StandardFont::HelveticaOblique,
            FontRole::Times => StandardFont::TimesRoman,
            FontRole::TimesBold => StandardFont::TimesBold,
        }
    }

    pub fn metrics(self) -> &'static StandardFontMetrics {
        self.standard_font().metrics()
    }

    /// CSS `font-family`, `font-weight` and `font-style` for the preview.
    pub fn css(self) -> (&'static str, u32, &'static str) {
        const SANS: &str = "Helvetica, Arial, sans-serif";
        const SERIF: &str = "'Times New Roman', Times, serif";
        match self {
            FontRole::Helvetica => (SANS, 400, "normal"),
            FontRole::HelveticaBold => (SANS, 700, "normal"),
            FontRole::HelveticaOblique => (SANS, 400, "italic"),
            FontRole::Times => (SERIF, 400, "normal"),
            FontRole::TimesBold => (SERIF, 700, "normal"),
        }
    }

    /// Distance from the top of a text box to its baseline, in points.
    pub fn ascent(self, font_size: f64) -> f64 {
        self.metrics().ascender as f64 / 1000.0 * font_size
    }

    /// Height of capital letters, in points.
    pub fn cap_height(self, font_size: f64) -> f64 {
        self.metrics().cap_height as f64 / 1000.0 * font_size
    }
}

/// The standard PDF fonts backing the roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    TimesRoman,
    TimesBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            // Oblique shares the upright advance widths.
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
            Self::TimesRoman => &metrics::TIMES_ROMAN,
            Self::TimesBold => &metrics::TIMES_BOLD,
        }
    }
}

/// Anything that can measure a run of text at a given size.
///
/// Word wrapping is written against this trait so tests can plug in a
/// monospace metric and the renderers can plug in font roles.
pub trait FontMetric {
    fn text_width(&self, text: &str, font_size: f64) -> f64;
}

impl FontMetric for FontRole {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        self.metrics().measure_string(text, font_size, 0.0)
    }
}

impl<F> FontMetric for F
where
    F: Fn(&str, f64) -> f64,
{
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        self(text, font_size)
    }
}

/// Shared font context used by layout and PDF serialization.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, role: FontRole, font_size: f64) -> f64 {
        role.text_width(text, font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_helvetica_space() {
        let ctx = FontContext::new();
        let w = ctx.measure_string(" ", FontRole::Helvetica, 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_bold_wider_than_regular() {
        let ctx = FontContext::new();
        let regular = ctx.measure_string("ABCDEFG", FontRole::Times, 32.0);
        let bold = ctx.measure_string("ABCDEFG", FontRole::TimesBold, 32.0);
        assert!(bold > regular, "bold={bold}, regular={regular}");
    }

    #[test]
    fn test_oblique_measures_like_upright() {
        let upright = FontRole::Helvetica.text_width("Kagawad", 9.0);
        let oblique = FontRole::HelveticaOblique.text_width("Kagawad", 9.0);
        assert_eq!(upright, oblique);
    }

    #[test]
    fn test_closure_metric() {
        let mono = |text: &str, size: f64| text.chars().count() as f64 * size;
        assert_eq!(mono.text_width("abc", 2.0), 6.0);
    }

    #[test]
    fn test_roles_deserialize_from_camel_case() {
        let role: FontRole = serde_json::from_str("\"timesBold\"").unwrap();
        assert_eq!(role, FontRole::TimesBold);
        assert!(serde_json::from_str::<FontRole>("\"comicSans\"").is_err());
    }

    #[test]
    fn test_pdf_names() {
        assert_eq!(FontRole::Times.standard_font().pdf_name(), "Times-Roman");
        assert_eq!(
            FontRole::HelveticaOblique.standard_font().pdf_name(),
            "Helvetica-Oblique"
        );
    }
}
