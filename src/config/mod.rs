//! # Layout Config
//!
//! The single source of truth for certificate geometry. Both renderers read
//! every position from here; neither keeps a constant of its own.
//!
//! Conventions (all lengths in points):
//! - vertical offsets are measured downward from the top margin,
//! - horizontal offsets rightward from the left margin,
//! - fields named `bottom`/`bottom_offset` are measured up from the bottom
//!   margin, and `right_inset` leftward from the right margin.
//!
//! The built-in config lives in [`defaults`]. A JSON file may override any
//! subset of it: every struct is `#[serde(default)]`, so missing fields keep
//! their built-in values.

mod defaults;

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::CertError;
use crate::font::FontRole;
use crate::style::Color;

/// Current layout schema version.
pub const LAYOUT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificateLayoutConfig {
    pub version: u32,
    pub page: PageSpec,
    pub margin: Margins,
    pub border: BorderSpec,
    pub header: HeaderSpec,
    pub seal: SealSpec,
    pub sidebar: SidebarSpec,
    pub content: ContentBoxSpec,
    pub title: TitleSpec,
    pub body: BodySpec,
    pub signature: SignatureSpec,
    pub footer: FooterSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSpec {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// The outer border, stroked along the margin box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BorderSpec {
    pub width: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderSpec {
    /// Centered lines; `offset` is the baseline.
    pub lines: Vec<HeaderLine>,
    pub ribbon: RibbonSpec,
    pub divider: DividerSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderLine {
    pub text: String,
    pub offset: f64,
    pub font: FontRole,
    pub font_size: f64,
    pub color: Color,
}

/// Solid band with a centered label ("office ribbon").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RibbonSpec {
    pub offset: f64,
    pub height: f64,
    pub inset_x: f64,
    pub fill: Color,
    pub text: String,
    pub font: FontRole,
    pub font_size: f64,
    pub text_color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DividerSpec {
    pub offset: f64,
    pub thickness: f64,
    pub inset_x: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SealSpec {
    /// Image source: http(s) URL, data URI, base64, or local path.
    pub src: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub placeholder: PlaceholderSpec,
}

/// Ring of dots drawn when the seal image is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaceholderSpec {
    pub dots: u32,
    pub dot_radius: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SidebarSpec {
    pub x: f64,
    pub top: f64,
    /// Measured up from the bottom margin.
    pub bottom: f64,
    pub width: f64,
    pub color_top: Color,
    pub color_bottom: Color,
    /// Number of solid bands approximating the gradient in the PDF.
    pub gradient_steps: u32,
    pub padding_x: f64,
    pub padding_top: f64,
    pub title_lines: Vec<SidebarTitleLine>,
    pub title_font: FontRole,
    pub title_color: Color,
    /// Space between the title block and the first entry.
    pub title_gap: f64,
    pub entries: Vec<SidebarEntry>,
    pub entry_font: FontRole,
    pub text_color: Color,
    pub label_font: FontRole,
    pub label_size: f64,
    pub label_gap: f64,
    pub label_color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SidebarTitleLine {
    pub text: String,
    pub font_size: f64,
    pub margin_bottom: f64,
}

/// One official in the sidebar, with an optional italic label underneath.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SidebarEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub font_size: f64,
    pub margin_bottom: f64,
}

/// The bordered box holding title, body and signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentBoxSpec {
    /// Horizontal gap between the sidebar's right edge and the box.
    pub gap_from_sidebar: f64,
    pub top: f64,
    /// Measured up from the bottom margin.
    pub bottom: f64,
    pub right_inset: f64,
    pub padding: f64,
    pub border_width: f64,
    pub border_color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitleSpec {
    /// Distance from the content box's inner top to the first title line.
    pub offset_top: f64,
    pub font: FontRole,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BodySpec {
    /// Distance from the end of the title block to the body.
    pub offset_from_title: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salutation: Option<String>,
    pub salutation_font: FontRole,
    pub salutation_gap: f64,
    pub font: FontRole,
    pub font_size: f64,
    pub line_height: f64,
    pub paragraph_spacing: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignatureSpec {
    /// Distance from the end of the body to the signature rule.
    pub offset_from_body: f64,
    pub width: f64,
    /// Measured leftward from the content box's inner right edge.
    pub right_inset: f64,
    pub rule_thickness: f64,
    pub rule_color: Color,
    pub image_height: f64,
    /// Gap between the signature image and the rule.
    pub image_gap: f64,
    pub name_font: FontRole,
    pub name_size: f64,
    /// Baseline distance below the rule.
    pub name_offset: f64,
    pub position_font: FontRole,
    pub position_size: f64,
    pub position_offset: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FooterSpec {
    /// Baseline of the last line, up from the bottom margin.
    pub bottom_offset: f64,
    pub right_inset: f64,
    pub line_gap: f64,
    /// `{id}` and `{issued}` are substituted per certificate.
    pub lines: Vec<FooterLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FooterLine {
    pub text: String,
    pub font: FontRole,
    pub font_size: f64,
    pub color: Color,
}

static BUILTIN: OnceLock<CertificateLayoutConfig> = OnceLock::new();

impl CertificateLayoutConfig {
    /// The process-wide built-in config, constructed on first use.
    pub fn builtin() -> &'static CertificateLayoutConfig {
        BUILTIN.get_or_init(CertificateLayoutConfig::default)
    }

    /// Parse and validate a JSON config. Missing fields keep built-in values.
    pub fn from_json_str(json: &str) -> Result<Self, CertError> {
        let config: CertificateLayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CertError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, CertError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Left edge of the margin box.
    pub fn left(&self) -> f64 {
        self.margin.left
    }

    /// Top edge of the margin box.
    pub fn top(&self) -> f64 {
        self.margin.top
    }

    /// Right edge of the margin box.
    pub fn right(&self) -> f64 {
        self.page.width - self.margin.right
    }

    /// Bottom edge of the margin box.
    pub fn bottom(&self) -> f64 {
        self.page.height - self.margin.bottom
    }

    /// Reject geometry the renderers cannot place.
    pub fn validate(&self) -> Result<(), CertError> {
        let fail = |msg: String| Err(CertError::InvalidConfig(msg));

        if self.version != LAYOUT_VERSION {
            return fail(format!(
                "unsupported layout version {} (expected {})",
                self.version, LAYOUT_VERSION
            ));
        }
        if !(self.page.width > 0.0 && self.page.height > 0.0) {
            return fail(format!(
                "page size must be positive, got {}x{}",
                self.page.width, self.page.height
            ));
        }
        let m = &self.margin;
        if [m.top, m.right, m.bottom, m.left].iter().any(|v| *v < 0.0) {
            return fail("margins must not be negative".to_string());
        }
        if self.right() <= self.left() || self.bottom() <= self.top() {
            return fail("margins leave no printable area".to_string());
        }

        let sidebar_top = self.top() + self.sidebar.top;
        let sidebar_bottom = self.bottom() - self.sidebar.bottom;
        if self.sidebar.width <= 0.0 || sidebar_bottom <= sidebar_top {
            return fail("sidebar has no area".to_string());
        }
        if self.sidebar.gradient_steps == 0 {
            return fail("sidebar.gradientSteps must be at least 1".to_string());
        }

        let content_left =
            self.left() + self.sidebar.x + self.sidebar.width + self.content.gap_from_sidebar;
        let content_right = self.right() - self.content.right_inset;
        let inner_width = content_right - content_left - 2.0 * self.content.padding;
        if inner_width <= 0.0 {
            return fail(format!(
                "content box has no usable width ({:.2}pt)",
                inner_width
            ));
        }
        let content_top = self.top() + self.content.top;
        let content_bottom = self.bottom() - self.content.bottom;
        if content_bottom - content_top <= 2.0 * self.content.padding {
            return fail("content box has no usable height".to_string());
        }
        if self.signature.width <= 0.0 || self.signature.width > inner_width {
            return fail(format!(
                "signature width {:.2}pt does not fit the content width {:.2}pt",
                self.signature.width, inner_width
            ));
        }

        if self.body.font_size <= 0.0 || self.body.line_height <= 0.0 {
            return fail("body font size and line height must be positive".to_string());
        }
        let sizes = self
            .header
            .lines
            .iter()
            .map(|l| l.font_size)
            .chain(self.sidebar.title_lines.iter().map(|l| l.font_size))
            .chain(self.sidebar.entries.iter().map(|e| e.font_size))
            .chain(self.footer.lines.iter().map(|l| l.font_size))
            .chain([
                self.header.ribbon.font_size,
                self.sidebar.label_size,
                self.signature.name_size,
                self.signature.position_size,
            ]);
        for size in sizes {
            if size <= 0.0 {
                return fail(format!("font sizes must be positive, got {}", size));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        CertificateLayoutConfig::builtin().validate().unwrap();
    }

    #[test]
    fn test_builtin_is_a4() {
        let config = CertificateLayoutConfig::builtin();
        assert!((config.page.width - 595.28).abs() < 0.01);
        assert!((config.page.height - 841.89).abs() < 0.01);
        assert_eq!(config.sidebar.gradient_steps, 40);
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = CertificateLayoutConfig::builtin() as *const _;
        let b = CertificateLayoutConfig::builtin() as *const _;
        assert_eq!(a, b);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = CertificateLayoutConfig::from_json_str(
            r##"{ "sidebar": { "colorTop": "#000000", "gradientSteps": 12 } }"##,
        )
        .unwrap();
        let builtin = CertificateLayoutConfig::builtin();
        assert_eq!(config.sidebar.gradient_steps, 12);
        assert_eq!(config.sidebar.color_top, Color::BLACK);
        assert_eq!(config.sidebar.width, builtin.sidebar.width);
        assert_eq!(config.sidebar.entries, builtin.sidebar.entries);
        assert_eq!(config.body, builtin.body);
    }

    #[test]
    fn test_json_round_trip() {
        let builtin = CertificateLayoutConfig::builtin();
        let json = builtin.to_json_pretty().unwrap();
        let parsed = CertificateLayoutConfig::from_json_str(&json).unwrap();
        assert_eq!(&parsed, builtin);
    }

    #[test]
    fn test_rejects_bad_color() {
        let err = CertificateLayoutConfig::from_json_str(r#"{ "border": { "color": "blue" } }"#)
            .unwrap_err();
        assert!(matches!(err, CertError::Parse { .. }));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let err = CertificateLayoutConfig::from_json_str(r#"{ "version": 9 }"#).unwrap_err();
        assert!(err.to_string().contains("unsupported layout version 9"));
    }

    #[test]
    fn test_rejects_degenerate_geometry() {
        let mut config = CertificateLayoutConfig::default();
        config.sidebar.width = 600.0;
        assert!(matches!(config.validate(), Err(CertError::InvalidConfig(_))));

        let mut config = CertificateLayoutConfig::default();
        config.margin.left = 400.0;
        config.margin.right = 400.0;
        assert!(config.validate().is_err());

        let mut config = CertificateLayoutConfig::default();
        config.sidebar.gradient_steps = 0;
        assert!(config.validate().is_err());

        let mut config = CertificateLayoutConfig::default();
        config.body.line_height = 0.0;
        assert!(config.validate().is_err());
    }
}
