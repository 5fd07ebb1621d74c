//! # Certificate Layout
//!
//! Turns the layout config plus one resolved certificate into a display
//! list: every rectangle, text run and image on the page, with absolute
//! positions. Both renderers draw this list and nothing else, so the PDF and
//! the preview cannot disagree about where anything goes.
//!
//! Coordinates are points with the origin at the top-left corner of the
//! page and y growing downward. The PDF writer flips y on output.
//!
//! The page is laid out in drawing order: border, seal, header, sidebar,
//! content box, title, body, signature, footer. Title, body and signature
//! share one running cursor, so the signature follows the body's length.
//! There is exactly one page; a body too long for the content box is
//! flagged on [`LayoutPage::overflow`] and drawn anyway.

use serde::Serialize;

use crate::config::CertificateLayoutConfig;
use crate::content::ResolvedCertificate;
use crate::font::{FontContext, FontRole};
use crate::style::Color;
use crate::text::split_paragraph_into_lines;

/// A fully laid-out certificate page.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
    /// The body or signature runs past the content box.
    pub overflow: bool,
}

impl LayoutPage {
    pub fn elements_in(&self, part: Part) -> impl Iterator<Item = &LayoutElement> {
        self.elements.iter().filter(move |e| e.part == part)
    }

    /// Text runs in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.elements.iter().filter_map(|e| match &e.draw {
            DrawCommand::Text(run) => Some(run),
            _ => None,
        })
    }

    pub fn texts_in(&self, part: Part) -> impl Iterator<Item = &TextRun> {
        self.elements_in(part).filter_map(|e| match &e.draw {
            DrawCommand::Text(run) => Some(run),
            _ => None,
        })
    }

    /// Sources of every image on the page.
    pub fn image_sources(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match &e.draw {
            DrawCommand::Image { src, .. } => Some(src.as_str()),
            _ => None,
        })
    }
}

/// Which region of the certificate an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Border,
    Seal,
    Header,
    Ribbon,
    Divider,
    Sidebar,
    ContentBox,
    Title,
    Salutation,
    Body,
    Signature,
    Footer,
}

impl Part {
    /// The preview section this part is grouped under.
    pub fn section(self) -> &'static str {
        match self {
            Part::Border => "cert-page",
            Part::Seal | Part::Header | Part::Ribbon | Part::Divider => "cert-header",
            Part::Sidebar => "cert-sidebar",
            Part::ContentBox
            | Part::Title
            | Part::Salutation
            | Part::Body
            | Part::Signature => "cert-content",
            Part::Footer => "cert-footer",
        }
    }
}

/// A positioned element. `x`/`y` is the top-left corner of its box.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutElement {
    pub part: Part,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

/// What to draw inside an element's box.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawCommand {
    /// Filled and/or stroked rectangle. The stroke is centered on the box edge.
    Rect {
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// Vertical gradient filling the box.
    Gradient { top: Color, bottom: Color, steps: u32 },
    Text(TextRun),
    /// Raster image fitted into the box, preserving aspect ratio.
    Image { src: String, fallback: ImageFallback },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One line of text aligned within its element's box.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub text: String,
    pub font: FontRole,
    pub font_size: f64,
    pub color: Color,
    pub align: TextAlign,
    /// Absolute baseline y.
    pub baseline: f64,
    /// Measured width of `text`.
    pub text_width: f64,
    /// Index of the body paragraph this line belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<usize>,
}

/// What to draw when an image cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageFallback {
    /// Leave the box empty.
    Omit,
    /// A ring of `dots` filled circles inscribed in the box.
    DotRing { dots: u32, radius: f64, color: Color },
}

impl ImageFallback {
    /// Centers of the ring's dots for a box at `(x, y, size)`.
    pub fn dot_centers(dots: u32, radius: f64, x: f64, y: f64, size: f64) -> Vec<(f64, f64)> {
        let cx = x + size / 2.0;
        let cy = y + size / 2.0;
        let ring = (size / 2.0 - radius).max(0.0);
        (0..dots)
            .map(|i| {
                let angle = std::f64::consts::TAU * i as f64 / dots as f64;
                (cx + ring * angle.cos(), cy + ring * angle.sin())
            })
            .collect()
    }
}

/// Scale `(img_w, img_h)` to fit inside a box, centered. Returns `(x, y, w, h)`.
pub fn fit_contain(
    box_x: f64,
    box_y: f64,
    box_w: f64,
    box_h: f64,
    img_w: f64,
    img_h: f64,
) -> (f64, f64, f64, f64) {
    if img_w <= 0.0 || img_h <= 0.0 {
        return (box_x, box_y, box_w, box_h);
    }
    let scale = (box_w / img_w).min(box_h / img_h);
    let w = img_w * scale;
    let h = img_h * scale;
    (box_x + (box_w - w) / 2.0, box_y + (box_h - h) / 2.0, w, h)
}

/// Lays out certificates against one config.
pub struct CertificateLayout<'a> {
    config: &'a CertificateLayoutConfig,
    fonts: FontContext,
}

/// Collects elements in drawing order.
struct PageBuilder {
    elements: Vec<LayoutElement>,
}

impl PageBuilder {
    fn rect(&mut self, part: Part, x: f64, y: f64, width: f64, height: f64, draw: DrawCommand) {
        self.elements.push(LayoutElement {
            part,
            x,
            y,
            width,
            height,
            draw,
        });
    }

    /// Push a text run aligned within `[x, x + width]`.
    fn text(&mut self, part: Part, x: f64, width: f64, run: TextRun) {
        let metrics = run.font.metrics();
        let height = (metrics.ascender - metrics.descender) as f64 / 1000.0 * run.font_size;
        self.elements.push(LayoutElement {
            part,
            x,
            y: run.baseline - run.font.ascent(run.font_size),
            width,
            height,
            draw: DrawCommand::Text(run),
        });
    }
}

impl<'a> CertificateLayout<'a> {
    pub fn new(config: &'a CertificateLayoutConfig) -> Self {
        Self {
            config,
            fonts: FontContext::new(),
        }
    }

    fn run(
        &self,
        text: &str,
        font: FontRole,
        font_size: f64,
        color: Color,
        align: TextAlign,
        baseline: f64,
    ) -> TextRun {
        TextRun {
            text: text.to_string(),
            font,
            font_size,
            color,
            align,
            baseline,
            text_width: self.fonts.measure_string(text, font, font_size),
            paragraph: None,
        }
    }

    pub fn layout(&self, content: &ResolvedCertificate) -> LayoutPage {
        let cfg = self.config;
        let mut page = PageBuilder {
            elements: Vec::new(),
        };

        let left = cfg.left();
        let top = cfg.top();
        let right = cfg.right();
        let bottom = cfg.bottom();
        let inner_width = right - left;

        // Border
        page.rect(
            Part::Border,
            left,
            top,
            inner_width,
            bottom - top,
            DrawCommand::Rect {
                fill: None,
                stroke: Some(Stroke {
                    color: cfg.border.color,
                    width: cfg.border.width,
                }),
            },
        );

        // Seal
        let seal = &cfg.seal;
        page.rect(
            Part::Seal,
            left + seal.x,
            top + seal.y,
            seal.size,
            seal.size,
            DrawCommand::Image {
                src: seal.src.clone(),
                fallback: ImageFallback::DotRing {
                    dots: seal.placeholder.dots,
                    radius: seal.placeholder.dot_radius,
                    color: seal.placeholder.color,
                },
            },
        );

        self.layout_header(&mut page, left, top, inner_width);
        self.layout_sidebar(&mut page, left, top, bottom);

        // Content box
        let content_box = &cfg.content;
        let box_left = left + cfg.sidebar.x + cfg.sidebar.width + content_box.gap_from_sidebar;
        let box_top = top + content_box.top;
        let box_right = right - content_box.right_inset;
        let box_bottom = bottom - content_box.bottom;
        page.rect(
            Part::ContentBox,
            box_left,
            box_top,
            box_right - box_left,
            box_bottom - box_top,
            DrawCommand::Rect {
                fill: None,
                stroke: Some(Stroke {
                    color: content_box.border_color,
                    width: content_box.border_width,
                }),
            },
        );

        let text_left = box_left + content_box.padding;
        let text_width = box_right - box_left - 2.0 * content_box.padding;
        let text_bottom = box_bottom - content_box.padding;

        let mut cursor = box_top + content_box.padding + cfg.title.offset_top;
        for line in &content.title_lines {
            let baseline = cursor + line.font_size;
            let run = self.run(
                &line.text,
                cfg.title.font,
                line.font_size,
                cfg.title.color,
                TextAlign::Center,
                baseline,
            );
            page.text(Part::Title, text_left, text_width, run);
            cursor += line.font_size + line.margin_bottom;
        }

        cursor = self.layout_body(&mut page, content, text_left, text_width, cursor);
        let body_end = cursor;

        let signature_end =
            self.layout_signature(&mut page, content, text_left, text_width, body_end);
        self.layout_footer(&mut page, content, left, right, bottom);

        let overflow = body_end > text_bottom || signature_end > text_bottom;
        if overflow {
            log::warn!(
                "certificate body overflows the content box: body ends at {:.1}pt, signature at {:.1}pt, box ends at {:.1}pt",
                body_end,
                signature_end,
                text_bottom
            );
        }
        log::debug!(
            "laid out {} elements, body ends at {:.1}pt",
            page.elements.len(),
            body_end
        );

        LayoutPage {
            width: cfg.page.width,
            height: cfg.page.height,
            elements: page.elements,
            overflow,
        }
    }

    fn layout_header(&self, page: &mut PageBuilder, left: f64, top: f64, inner_width: f64) {
        let header = &self.config.header;
        for line in &header.lines {
            let run = self.run(
                &line.text,
                line.font,
                line.font_size,
                line.color,
                TextAlign::Center,
                top + line.offset,
            );
            page.text(Part::Header, left, inner_width, run);
        }

        let ribbon = &header.ribbon;
        let ribbon_x = left + ribbon.inset_x;
        let ribbon_y = top + ribbon.offset;
        let ribbon_w = inner_width - 2.0 * ribbon.inset_x;
        page.rect(
            Part::Ribbon,
            ribbon_x,
            ribbon_y,
            ribbon_w,
            ribbon.height,
            DrawCommand::Rect {
                fill: Some(ribbon.fill),
                stroke: None,
            },
        );
        if !ribbon.text.trim().is_empty() {
            // Cap height centered in the band.
            let baseline =
                ribbon_y + (ribbon.height + ribbon.font.cap_height(ribbon.font_size)) / 2.0;
            let run = self.run(
                &ribbon.text,
                ribbon.font,
                ribbon.font_size,
                ribbon.text_color,
                TextAlign::Center,
                baseline,
            );
            page.text(Part::Ribbon, ribbon_x, ribbon_w, run);
        }

        let divider = &header.divider;
        page.rect(
            Part::Divider,
            left + divider.inset_x,
            top + divider.offset,
            inner_width - 2.0 * divider.inset_x,
            divider.thickness,
            DrawCommand::Rect {
                fill: Some(divider.color),
                stroke: None,
            },
        );
    }

    fn layout_sidebar(&self, page: &mut PageBuilder, left: f64, top: f64, bottom: f64) {
        let sidebar = &self.config.sidebar;
        let x = left + sidebar.x;
        let y = top + sidebar.top;
        let height = bottom - sidebar.bottom - y;
        page.rect(
            Part::Sidebar,
            x,
            y,
            sidebar.width,
            height,
            DrawCommand::Gradient {
                top: sidebar.color_top,
                bottom: sidebar.color_bottom,
                steps: sidebar.gradient_steps,
            },
        );

        let text_x = x + sidebar.padding_x;
        let text_w = sidebar.width - 2.0 * sidebar.padding_x;
        let mut cursor = y + sidebar.padding_top;

        for line in &sidebar.title_lines {
            let run = self.run(
                &line.text,
                sidebar.title_font,
                line.font_size,
                sidebar.title_color,
                TextAlign::Center,
                cursor + line.font_size,
            );
            page.text(Part::Sidebar, text_x, text_w, run);
            cursor += line.font_size + line.margin_bottom;
        }
        cursor += sidebar.title_gap;

        for entry in &sidebar.entries {
            let baseline = cursor + entry.font_size;
            let run = self.run(
                &entry.name,
                sidebar.entry_font,
                entry.font_size,
                sidebar.text_color,
                TextAlign::Left,
                baseline,
            );
            page.text(Part::Sidebar, text_x, text_w, run);
            if let Some(label) = entry.label.as_deref().filter(|l| !l.trim().is_empty()) {
                let run = self.run(
                    label,
                    sidebar.label_font,
                    sidebar.label_size,
                    sidebar.label_color,
                    TextAlign::Left,
                    baseline + sidebar.label_gap,
                );
                page.text(Part::Sidebar, text_x, text_w, run);
            }
            cursor += entry.font_size + entry.margin_bottom;
        }
    }

    /// Salutation and wrapped paragraphs. Returns the cursor after the body.
    fn layout_body(
        &self,
        page: &mut PageBuilder,
        content: &ResolvedCertificate,
        text_left: f64,
        text_width: f64,
        title_end: f64,
    ) -> f64 {
        let body = &self.config.body;
        let mut cursor = title_end + body.offset_from_title;

        if let Some(salutation) = &content.salutation {
            let run = self.run(
                salutation,
                body.salutation_font,
                body.font_size,
                body.color,
                TextAlign::Left,
                cursor + body.font_size,
            );
            page.text(Part::Salutation, text_left, text_width, run);
            cursor += body.line_height + body.salutation_gap;
        }

        let count = content.paragraphs.len();
        for (index, paragraph) in content.paragraphs.iter().enumerate() {
            let lines =
                split_paragraph_into_lines(paragraph, &body.font, body.font_size, text_width);
            for line in &lines {
                let mut run = self.run(
                    line,
                    body.font,
                    body.font_size,
                    body.color,
                    TextAlign::Left,
                    cursor + body.font_size,
                );
                run.paragraph = Some(index);
                page.text(Part::Body, text_left, text_width, run);
                cursor += body.line_height;
            }
            if index + 1 < count {
                cursor += body.paragraph_spacing;
            }
        }
        cursor
    }

    /// Rule, optional signature image, name and position. Returns the
    /// lowest point drawn.
    fn layout_signature(
        &self,
        page: &mut PageBuilder,
        content: &ResolvedCertificate,
        text_left: f64,
        text_width: f64,
        body_end: f64,
    ) -> f64 {
        let sig = &self.config.signature;
        let x = text_left + text_width - sig.right_inset - sig.width;
        let rule_y = body_end + sig.offset_from_body;

        if let Some(src) = &content.signature_src {
            page.rect(
                Part::Signature,
                x,
                rule_y - sig.image_gap - sig.image_height,
                sig.width,
                sig.image_height,
                DrawCommand::Image {
                    src: src.clone(),
                    fallback: ImageFallback::Omit,
                },
            );
        }

        page.rect(
            Part::Signature,
            x,
            rule_y - sig.rule_thickness / 2.0,
            sig.width,
            sig.rule_thickness,
            DrawCommand::Rect {
                fill: Some(sig.rule_color),
                stroke: None,
            },
        );

        let name = self.run(
            &content.signatory_name,
            sig.name_font,
            sig.name_size,
            sig.color,
            TextAlign::Center,
            rule_y + sig.name_offset,
        );
        page.text(Part::Signature, x, sig.width, name);

        let position_baseline = rule_y + sig.position_offset;
        let position = self.run(
            &content.signatory_position,
            sig.position_font,
            sig.position_size,
            sig.color,
            TextAlign::Center,
            position_baseline,
        );
        page.text(Part::Signature, x, sig.width, position);

        let descent = -(sig.position_font.metrics().descender as f64) / 1000.0 * sig.position_size;
        position_baseline + descent
    }

    fn layout_footer(
        &self,
        page: &mut PageBuilder,
        content: &ResolvedCertificate,
        left: f64,
        right: f64,
        bottom: f64,
    ) {
        let footer = &self.config.footer;
        let last_baseline = bottom - footer.bottom_offset;
        let count = footer.lines.len().min(content.footer_lines.len());
        let width = right - footer.right_inset - left;

        for (i, (spec, text)) in footer.lines.iter().zip(&content.footer_lines).enumerate() {
            let baseline = last_baseline - (count - 1 - i) as f64 * footer.line_gap;
            let run = self.run(
                text,
                spec.font,
                spec.font_size,
                spec.color,
                TextAlign::Right,
                baseline,
            );
            page.text(Part::Footer, left, width, run);
        }
    }
}
