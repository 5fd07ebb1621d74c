//! # Template Registry
//!
//! Maps a free-text certificate type to its title block and body builder.
//!
//! The registry is an ordered rule table: each rule pairs a predicate on the
//! lower-cased type with a paragraph builder. Rules are tried top to bottom
//! and the first match wins, so overlapping types must be listed narrowest
//! first ("non-residency" before "residency", "unemployment" before
//! "employment"). Anything unmatched gets a generic template titled after
//! the type itself. Lookup never fails.

pub mod builders;

use serde::Serialize;

use crate::model::CertificateContentData;

pub use builders::LOCALITY;

/// One line of the title block, already in display form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleLine {
    pub text: String,
    pub font_size: f64,
    pub margin_bottom: f64,
}

/// Title line as written in the rule table, in plain words.
#[derive(Debug, Clone, Copy)]
pub struct TitleLineSpec {
    pub text: &'static str,
    pub font_size: f64,
    pub margin_bottom: f64,
}

const fn line(text: &'static str, font_size: f64, margin_bottom: f64) -> TitleLineSpec {
    TitleLineSpec {
        text,
        font_size,
        margin_bottom,
    }
}

type BodyBuilder = fn(&CertificateContentData) -> Vec<String>;

/// A registered template.
pub struct CertificateTemplate {
    pub id: &'static str,
    /// Predicate on the lower-cased certificate type.
    pub matches: fn(&str) -> bool,
    pub title_lines: &'static [TitleLineSpec],
    pub build_body: BodyBuilder,
    pub preview_description: &'static str,
}

/// The template chosen for one certificate type.
#[derive(Clone)]
pub struct ResolvedTemplate {
    pub id: &'static str,
    pub title_lines: Vec<TitleLine>,
    pub preview_description: String,
    /// True when no registered rule matched.
    pub is_fallback: bool,
    builder: BodyBuilder,
}

impl ResolvedTemplate {
    /// Body paragraphs, without the issuance paragraph.
    pub fn build_body(&self, data: &CertificateContentData) -> Vec<String> {
        (self.builder)(data)
    }

    fn from_registered(template: &CertificateTemplate) -> Self {
        Self {
            id: template.id,
            title_lines: template
                .title_lines
                .iter()
                .map(|spec| TitleLine {
                    text: spaced_uppercase(spec.text),
                    font_size: spec.font_size,
                    margin_bottom: spec.margin_bottom,
                })
                .collect(),
            preview_description: template.preview_description.to_string(),
            is_fallback: false,
            builder: template.build_body,
        }
    }

    fn generic(certificate_type: &str) -> Self {
        let name = certificate_type.trim();
        let name = if name.is_empty() { "Certification" } else { name };
        Self {
            id: GENERIC_ID,
            title_lines: vec![TitleLine {
                text: spaced_uppercase(name),
                font_size: 18.0,
                margin_bottom: 0.0,
            }],
            preview_description: format!("{} issued by the barangay.", name),
            is_fallback: true,
            builder: builders::generic,
        }
    }
}

impl std::fmt::Debug for ResolvedTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedTemplate")
            .field("id", &self.id)
            .field("title_lines", &self.title_lines)
            .field("is_fallback", &self.is_fallback)
            .finish()
    }
}

pub const GENERIC_ID: &str = "generic";

const CERTIFICATE: TitleLineSpec = line("Certificate", 20.0, 4.0);
const OF: TitleLineSpec = line("of", 12.0, 4.0);

/// Registered templates in match order.
pub static TEMPLATES: &[CertificateTemplate] = &[
    CertificateTemplate {
        id: "non-residency",
        matches: |t| {
            t.contains("non-residen") || t.contains("non residen") || t.contains("nonresiden")
        },
        title_lines: &[CERTIFICATE, OF, line("Non-Residency", 18.0, 0.0)],
        build_body: builders::non_residency,
        preview_description: "Certifies that the requester is not a resident of the barangay.",
    },
    CertificateTemplate {
        id: "residency",
        matches: |t| t.contains("residen"),
        title_lines: &[CERTIFICATE, OF, line("Residency", 20.0, 0.0)],
        build_body: builders::residency,
        preview_description: "Certifies that the requester resides in the barangay.",
    },
    CertificateTemplate {
        id: "indigency",
        matches: |t| t.contains("indigen"),
        title_lines: &[CERTIFICATE, OF, line("Indigency", 20.0, 0.0)],
        build_body: builders::indigency,
        preview_description: "Certifies that the requester belongs to an indigent family.",
    },
    CertificateTemplate {
        id: "good-moral",
        matches: |t| t.contains("good moral") || t.contains("moral character"),
        title_lines: &[CERTIFICATE, OF, line("Good Moral Character", 14.0, 0.0)],
        build_body: builders::good_moral,
        preview_description: "Attests to the requester's good moral character.",
    },
    CertificateTemplate {
        id: "clearance",
        matches: |t| t.contains("clearance"),
        title_lines: &[line("Barangay", 16.0, 4.0), line("Clearance", 22.0, 0.0)],
        build_body: builders::clearance,
        preview_description: "Clears the requester of pending cases and derogatory records.",
    },
    CertificateTemplate {
        id: "unemployment",
        matches: |t| t.contains("unemploy"),
        title_lines: &[CERTIFICATE, OF, line("Unemployment", 18.0, 0.0)],
        build_body: builders::unemployment,
        preview_description: "Certifies that the requester is currently unemployed.",
    },
    CertificateTemplate {
        id: "employment",
        matches: |t| t.contains("employ"),
        title_lines: &[CERTIFICATE, OF, line("Employment", 20.0, 0.0)],
        build_body: builders::employment,
        preview_description: "Describes the requester's employment.",
    },
    CertificateTemplate {
        id: "business-closure",
        matches: |t| {
            t.contains("closure") || t.contains("business clos") || t.contains("cessation")
        },
        title_lines: &[CERTIFICATE, OF, line("Business Closure", 16.0, 0.0)],
        build_body: builders::business_closure,
        preview_description: "Certifies that the requester's business has ceased operations.",
    },
    CertificateTemplate {
        id: "income",
        matches: |t| t.contains("income"),
        title_lines: &[CERTIFICATE, OF, line("Income", 20.0, 0.0)],
        build_body: builders::income,
        preview_description: "Declares the requester's income.",
    },
    CertificateTemplate {
        id: "support",
        matches: |t| t.contains("support"),
        title_lines: &[CERTIFICATE, OF, line("Support", 20.0, 0.0)],
        build_body: builders::support,
        preview_description: "Certifies the support the requester provides to dependents.",
    },
];

/// Resolve the template for a certificate type. First match wins; unmatched
/// types get the generic template.
pub fn get_certificate_template_config(certificate_type: &str) -> ResolvedTemplate {
    let normalized = certificate_type.trim().to_lowercase();
    match TEMPLATES.iter().find(|t| (t.matches)(&normalized)) {
        Some(template) => {
            log::debug!("certificate type {:?} -> template {}", certificate_type, template.id);
            ResolvedTemplate::from_registered(template)
        }
        None => {
            log::debug!("certificate type {:?} -> generic template", certificate_type);
            ResolvedTemplate::generic(certificate_type)
        }
    }
}

/// Upper-case `text` and put one space between characters. Word gaps end up
/// as exactly two spaces: `"Pet Ownership"` → `"P E T  O W N E R S H I P"`.
pub fn spaced_uppercase(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let spaced: String = words
        .join(" ")
        .to_uppercase()
        .chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = String::with_capacity(spaced.len());
    let mut run = 0;
    for c in spaced.chars() {
        if c == ' ' {
            run += 1;
            if run > 2 {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(c);
    }
    out
}
