//! # Colors
//!
//! Colors in the layout config are written as CSS hex strings so the preview
//! can reuse them verbatim; the PDF side needs normalized channels. `Color`
//! holds both views of the same value.
//!
//! The vector target has no native gradients here, so the sidebar gradient
//! is approximated by `gradient_bands`: N solid bands, linearly interpolated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Parse `#RRGGBB` or `#RGB` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let [r, g, b] = hex_to_rgb_tuple(hex)?;
        Some(Self { r, g, b })
    }

    pub fn to_tuple(self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// Lower-case `#rrggbb`.
    pub fn to_css_hex(self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }

    pub fn lerp(self, other: Color, ratio: f64) -> Color {
        let [r, g, b] = interpolate_color(self.to_tuple(), other.to_tuple(), ratio);
        Color { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid hex color '{}'", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_css_hex()
    }
}

/// Convert a hex color string to normalized `[r, g, b]`.
pub fn hex_to_rgb_tuple(hex: &str) -> Option<[f64; 3]> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let (r, g, b) = match hex.len() {
        3 => (
            u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?,
            u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?,
            u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?,
        ),
        6 => (
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        ),
        _ => return None,
    };
    Some([r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0])
}

/// Linear interpolation between two colors. `ratio` is clamped to `[0, 1]`.
pub fn interpolate_color(from: [f64; 3], to: [f64; 3], ratio: f64) -> [f64; 3] {
    let t = ratio.clamp(0.0, 1.0);
    [
        from[0] + (to[0] - from[0]) * t,
        from[1] + (to[1] - from[1]) * t,
        from[2] + (to[2] - from[2]) * t,
    ]
}

/// Colors of `steps` bands from `top` to `bottom`, inclusive of both ends.
pub fn gradient_bands(top: Color, bottom: Color, steps: u32) -> Vec<Color> {
    match steps {
        0 => Vec::new(),
        1 => vec![top],
        n => (0..n)
            .map(|i| top.lerp(bottom, i as f64 / (n - 1) as f64))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(hex_to_rgb_tuple("#ffffff"), Some([1.0, 1.0, 1.0]));
        assert_eq!(hex_to_rgb_tuple("000000"), Some([0.0, 0.0, 0.0]));
        let [r, g, b] = hex_to_rgb_tuple("#1e3a8a").unwrap();
        assert!((r - 30.0 / 255.0).abs() < 1e-9);
        assert!((g - 58.0 / 255.0).abs() < 1e-9);
        assert!((b - 138.0 / 255.0).abs() < 1e-9);
        assert_eq!(hex_to_rgb_tuple("#fff"), Some([1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert_eq!(hex_to_rgb_tuple("#12345"), None);
        assert_eq!(hex_to_rgb_tuple("#gggggg"), None);
        assert_eq!(hex_to_rgb_tuple("#ééé"), None);
        assert_eq!(hex_to_rgb_tuple(""), None);
    }

    #[test]
    fn test_interpolation_endpoints() {
        let a = [0.1, 0.7, 0.3];
        let b = [0.9, 0.2, 0.55];
        assert!(close(interpolate_color(a, b, 0.0), a));
        assert!(close(interpolate_color(a, b, 1.0), b));
        assert!(close(interpolate_color(a, b, 0.5), [0.5, 0.45, 0.425]));
    }

    #[test]
    fn test_interpolation_clamps_ratio() {
        let a = [0.0, 0.0, 0.0];
        let b = [1.0, 1.0, 1.0];
        assert!(close(interpolate_color(a, b, -2.0), a));
        assert!(close(interpolate_color(a, b, 7.0), b));
    }

    #[test]
    fn test_gradient_bands_span_both_colors() {
        let top = Color::from_hex("#1e3a8a").unwrap();
        let bottom = Color::from_hex("#3b82f6").unwrap();
        let bands = gradient_bands(top, bottom, 40);
        assert_eq!(bands.len(), 40);
        assert_eq!(bands[0], top);
        assert!(close(bands[39].to_tuple(), bottom.to_tuple()));
        assert_eq!(gradient_bands(top, bottom, 1), vec![top]);
        assert!(gradient_bands(top, bottom, 0).is_empty());
    }

    #[test]
    fn test_css_hex_round_trip_through_serde() {
        let color: Color = serde_json::from_str("\"#D4A017\"").unwrap();
        assert_eq!(color.to_css_hex(), "#d4a017");
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#d4a017\"");
        assert!(serde_json::from_str::<Color>("\"red\"").is_err());
    }
}
