//! # Text Layout
//!
//! Greedy word wrapping against a pluggable font metric, plus the date
//! helpers that produce the closing issuance paragraph.

pub mod date;

pub use date::{issuance_paragraph, ordinal_suffix, resolve_issuance_date};

use crate::font::FontMetric;

/// Break a paragraph into lines no wider than `max_width`.
///
/// Words are separated by any whitespace and re-joined with single spaces.
/// A word that is wider than `max_width` on its own stays alone on its
/// line; there is no hyphenation. Words are never dropped or reordered.
pub fn split_paragraph_into_lines<M>(
    text: &str,
    metric: &M,
    font_size: f64,
    max_width: f64,
) -> Vec<String>
where
    M: FontMetric + ?Sized,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if metric.text_width(&candidate, font_size) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
