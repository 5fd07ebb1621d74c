//! # PDF Serializer
//!
//! Writes one laid-out certificate page as a PDF 1.7 file.
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- Catalog, Pages, fonts, images, content, page, info
//! ...
//! xref                <- byte offsets of each object
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Only the standard Type1 fonts are used, so nothing is embedded: page text
//! is encoded as WinAnsi, and a character outside it fails the write rather
//! than printing something the preview would not. The whole file is
//! assembled in memory; callers get complete bytes or an error.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::CertError;
use crate::font::FontRole;
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{
    fit_contain, DrawCommand, ImageFallback, LayoutElement, LayoutPage, TextAlign, TextRun,
};
use crate::style::{gradient_bands, Color};

/// Cubic bezier control distance for a quarter circle of radius 1.
const KAPPA: f64 = 0.5522847498;

/// Document information dictionary entries.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Font roles in resource order: `/F0`, `/F1`, ...
    font_objects: Vec<(FontRole, usize)>,
    /// Image source -> registered XObject.
    image_objects: HashMap<String, ImageRef>,
}

#[derive(Debug, Clone, Copy)]
struct ImageRef {
    /// Resource index: `/ImN`.
    index: usize,
    obj_id: usize,
    width_px: u32,
    height_px: u32,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }

    fn font_index(&self, role: FontRole) -> usize {
        self.font_objects
            .iter()
            .position(|(r, _)| *r == role)
            .unwrap_or(0)
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize `page`. Images are looked up by source; a source missing
    /// from `images` is drawn with its element's fallback.
    pub fn write(
        &self,
        page: &LayoutPage,
        images: &HashMap<String, LoadedImage>,
        info: &DocumentInfo,
    ) -> Result<Vec<u8>, CertError> {
        Self::check_geometry(page)?;

        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: HashMap::new(),
        };

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        for _ in 0..3 {
            builder.push(Vec::new());
        }

        self.register_fonts(&mut builder, page);
        self.register_images(&mut builder, page, images);

        let content = self.build_content_stream(page, &builder)?;
        let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
        let mut content_data: Vec<u8> = Vec::new();
        let _ = write!(
            content_data,
            "<< /Length {} /Filter /FlateDecode >>\nstream\n",
            compressed.len()
        );
        content_data.extend_from_slice(&compressed);
        content_data.extend_from_slice(b"\nendstream");
        let content_obj_id = builder.push(content_data);

        let font_resources = builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, id))| format!("/F{} {} 0 R", i, id))
            .collect::<Vec<_>>()
            .join(" ");
        let mut images_sorted: Vec<(usize, usize)> = builder
            .image_objects
            .values()
            .map(|r| (r.index, r.obj_id))
            .collect();
        images_sorted.sort_unstable();
        let resources = if images_sorted.is_empty() {
            format!("/Font << {} >>", font_resources)
        } else {
            let xobjects = images_sorted
                .iter()
                .map(|(idx, id)| format!("/Im{} {} 0 R", idx, id))
                .collect::<Vec<_>>()
                .join(" ");
            format!("/Font << {} >> /XObject << {} >>", font_resources, xobjects)
        };
        let page_dict = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Contents {} 0 R /Resources << {} >> >>",
            page.width, page.height, content_obj_id, resources
        );
        let page_obj_id = builder.push(page_dict.into_bytes());

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        builder.objects[2].data =
            format!("<< /Type /Pages /Kids [{} 0 R] /Count 1 >>", page_obj_id).into_bytes();

        let mut dict = String::from("<< ");
        if let Some(title) = &info.title {
            let _ = write!(dict, "/Title {} ", info_string(title));
        }
        if let Some(author) = &info.author {
            let _ = write!(dict, "/Author {} ", info_string(author));
        }
        if let Some(subject) = &info.subject {
            let _ = write!(dict, "/Subject {} ", info_string(subject));
        }
        let _ = write!(
            dict,
            "/Producer (barangay-certificate {}) /Creator (certgen) >>",
            env!("CARGO_PKG_VERSION")
        );
        let info_obj_id = builder.push(dict.into_bytes());

        Ok(self.serialize(&builder, info_obj_id))
    }

    /// Reject pages the serializer would print as garbage.
    fn check_geometry(page: &LayoutPage) -> Result<(), CertError> {
        if !(page.width.is_finite() && page.height.is_finite())
            || page.width <= 0.0
            || page.height <= 0.0
        {
            return Err(CertError::Render(format!(
                "invalid page size {}x{}",
                page.width, page.height
            )));
        }
        for element in &page.elements {
            let finite = [element.x, element.y, element.width, element.height]
                .iter()
                .all(|v| v.is_finite());
            if !finite || element.width < 0.0 || element.height < 0.0 {
                return Err(CertError::Render(format!(
                    "invalid geometry for {:?} element at ({}, {}) size {}x{}",
                    element.part, element.x, element.y, element.width, element.height
                )));
            }
        }
        Ok(())
    }

    /// One Type1 font object per role used on the page.
    fn register_fonts(&self, builder: &mut PdfBuilder, page: &LayoutPage) {
        let mut roles: BTreeSet<FontRole> = page.texts().map(|run| run.font).collect();
        if roles.is_empty() {
            roles.insert(FontRole::Helvetica);
        }
        for role in roles {
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                role.standard_font().pdf_name()
            );
            let id = builder.push(font_dict.into_bytes());
            builder.font_objects.push((role, id));
        }
    }

    fn register_images(
        &self,
        builder: &mut PdfBuilder,
        page: &LayoutPage,
        images: &HashMap<String, LoadedImage>,
    ) {
        for src in page.image_sources() {
            if builder.image_objects.contains_key(src) {
                continue;
            }
            if let Some(image) = images.get(src) {
                let index = builder.image_objects.len();
                let obj_id = Self::write_image_xobject(builder, image);
                builder.image_objects.insert(
                    src.to_string(),
                    ImageRef {
                        index,
                        obj_id,
                        width_px: image.width_px,
                        height_px: image.height_px,
                    },
                );
            }
        }
    }

    fn build_content_stream(
        &self,
        page: &LayoutPage,
        builder: &PdfBuilder,
    ) -> Result<String, CertError> {
        let mut stream = String::new();
        for element in &page.elements {
            self.write_element(&mut stream, element, page.height, builder)?;
        }
        Ok(stream)
    }

    /// Write a single layout element as PDF operators.
    fn write_element(
        &self,
        stream: &mut String,
        element: &LayoutElement,
        page_height: f64,
        builder: &PdfBuilder,
    ) -> Result<(), CertError> {
        let x = element.x;
        let y = page_height - element.y - element.height;
        let w = element.width;
        let h = element.height;

        match &element.draw {
            DrawCommand::Rect { fill, stroke } => {
                if let Some(fill) = fill {
                    let _ = write!(
                        stream,
                        "q\n{} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        rgb(fill),
                        x,
                        y,
                        w,
                        h
                    );
                }
                if let Some(stroke) = stroke.filter(|s| s.width > 0.0) {
                    let _ = write!(
                        stream,
                        "q\n{} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                        rgb(&stroke.color),
                        stroke.width,
                        x,
                        y,
                        w,
                        h
                    );
                }
            }

            DrawCommand::Gradient { top, bottom, steps } => {
                let bands = gradient_bands(*top, *bottom, *steps);
                let band_h = h / bands.len().max(1) as f64;
                let _ = writeln!(stream, "q");
                for (i, color) in bands.iter().enumerate() {
                    let band_top = element.y + i as f64 * band_h;
                    // Overlap the next band to hide anti-aliasing seams.
                    let overlap = if i + 1 < bands.len() { 0.5 } else { 0.0 };
                    let band_y = page_height - band_top - band_h;
                    let _ = write!(
                        stream,
                        "{} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\n",
                        rgb(color),
                        x,
                        band_y - overlap,
                        w,
                        band_h + overlap
                    );
                }
                let _ = writeln!(stream, "Q");
            }

            DrawCommand::Text(run) => {
                self.write_text(stream, element, run, page_height, builder)?;
            }

            DrawCommand::Image { src, fallback } => match builder.image_objects.get(src) {
                Some(image) => {
                    let (fx, fy, fw, fh) = fit_contain(
                        element.x,
                        element.y,
                        w,
                        h,
                        image.width_px as f64,
                        image.height_px as f64,
                    );
                    let _ = write!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        fw,
                        fh,
                        fx,
                        page_height - fy - fh,
                        image.index
                    );
                }
                None => {
                    if let ImageFallback::DotRing {
                        dots,
                        radius,
                        color,
                    } = fallback
                    {
                        let _ = write!(stream, "q\n{} rg\n", rgb(color));
                        let size = w.min(h);
                        for (cx, cy) in
                            ImageFallback::dot_centers(*dots, *radius, element.x, element.y, size)
                        {
                            write_circle(stream, cx, page_height - cy, *radius);
                            let _ = writeln!(stream, "f");
                        }
                        let _ = writeln!(stream, "Q");
                    }
                }
            },
        }
        Ok(())
    }

    fn write_text(
        &self,
        stream: &mut String,
        element: &LayoutElement,
        run: &TextRun,
        page_height: f64,
        builder: &PdfBuilder,
    ) -> Result<(), CertError> {
        if run.text.is_empty() {
            return Ok(());
        }
        let encoded = encode_text(&run.text).map_err(|ch| {
            CertError::Render(format!(
                "{:?} text {:?} contains {:?} (U+{:04X}), which cannot be printed with the standard fonts",
                element.part, run.text, ch, ch as u32
            ))
        })?;
        let start_x = match run.align {
            TextAlign::Left => element.x,
            TextAlign::Center => element.x + (element.width - run.text_width) / 2.0,
            TextAlign::Right => element.x + element.width - run.text_width,
        };
        let _ = write!(
            stream,
            "BT\n{} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
            rgb(&run.color),
            builder.font_index(run.font),
            run.font_size,
            start_x,
            page_height - run.baseline,
            encoded
        );
        Ok(())
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.push(obj_data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed = compress_to_vec_zlib(alpha_data, 6);
                    let mut smask: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask,
                        "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode \
                         /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed.len()
                    );
                    smask.extend_from_slice(&compressed);
                    smask.extend_from_slice(b"\nendstream");
                    builder.push(smask)
                });

                let compressed = compress_to_vec_zlib(rgb, 6);
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode \
                     /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed);
                obj_data.extend_from_slice(b"\nendstream");
                builder.push(obj_data)
            }
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

fn rgb(color: &Color) -> String {
    format!("{:.3} {:.3} {:.3}", color.r, color.g, color.b)
}

/// Closed circle path centered at `(cx, cy)` in PDF coordinates.
fn write_circle(stream: &mut String, cx: f64, cy: f64, r: f64) {
    let k = KAPPA * r;
    let _ = write!(
        stream,
        "{:.2} {:.2} m\n\
         {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n\
         {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n\
         {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n\
         {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\nh\n",
        cx + r,
        cy,
        cx + r,
        cy + k,
        cx + k,
        cy + r,
        cx,
        cy + r,
        cx - k,
        cy + r,
        cx - r,
        cy + k,
        cx - r,
        cy,
        cx - r,
        cy - k,
        cx - k,
        cy - r,
        cx,
        cy - r,
        cx + k,
        cy - r,
        cx + r,
        cy - k,
        cx + r,
        cy
    );
}

/// Encode text as the body of a PDF literal string in WinAnsi. Fails with
/// the first character WinAnsi has no code for.
fn encode_text(text: &str) -> Result<String, char> {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match unicode_to_winansi(ch).ok_or(ch)? {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b @ 0x20..=0x7E => out.push(b as char),
            b => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    Ok(out)
}

/// A document-info string: a WinAnsi literal when possible, otherwise
/// UTF-16BE hex with a byte order mark.
fn info_string(text: &str) -> String {
    match encode_text(text) {
        Ok(literal) => format!("({})", literal),
        Err(_) => {
            let mut hex = String::from("<FEFF");
            for unit in text.encode_utf16() {
                let _ = write!(hex, "{:04X}", unit);
            }
            hex.push('>');
            hex
        }
    }
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Most codepoints in
/// 0x20..=0x7E and 0xA0..=0xFF map directly; 0x80..=0x9F holds smart
/// quotes, dashes and a few letters.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82), // Single low-9 quotation mark
        0x0192 => Some(0x83), // Latin small letter f with hook
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86), // Dagger
        0x2021 => Some(0x87), // Double dagger
        0x02C6 => Some(0x88), // Modifier letter circumflex accent
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Latin capital letter S with caron
        0x2039 => Some(0x8B), // Single left-pointing angle quotation
        0x0152 => Some(0x8C), // Latin capital ligature OE
        0x017D => Some(0x8E), // Latin capital letter Z with caron
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98), // Small tilde
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // Latin small letter s with caron
        0x203A => Some(0x9B), // Single right-pointing angle quotation
        0x0153 => Some(0x9C), // Latin small ligature oe
        0x017E => Some(0x9E), // Latin small letter z with caron
        0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
        _ => None,
    }
}
