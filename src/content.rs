//! Everything a certificate prints, resolved once per render.
//!
//! Both renderers consume a `ResolvedCertificate`, so title, body, signature
//! and footer text cannot differ between the PDF and the preview.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::CertificateLayoutConfig;
use crate::model::{slugify, CertificateContentData, OfficialInfo};
use crate::template::{get_certificate_template_config, TitleLine};
use crate::text::date::{issuance_paragraph, resolve_issuance_date, resolve_issuance_date_or};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCertificate {
    pub template_id: &'static str,
    pub preview_description: String,
    pub title_lines: Vec<TitleLine>,
    pub salutation: Option<String>,
    /// Template paragraphs followed by the issuance paragraph.
    pub paragraphs: Vec<String>,
    /// Upper-cased official name.
    pub signatory_name: String,
    pub signatory_position: String,
    pub signature_src: Option<String>,
    pub footer_lines: Vec<String>,
    pub issued_on: NaiveDate,
    pub filename: String,
}

impl ResolvedCertificate {
    pub fn resolve(
        data: &CertificateContentData,
        official: &OfficialInfo,
        config: &CertificateLayoutConfig,
    ) -> Self {
        let issued_on = resolve_issuance_date(Some(&data.generated_on));
        Self::build(data, official, config, issued_on)
    }

    /// Resolve with a fixed "today" for unparsable issuance dates.
    pub fn resolve_on(
        data: &CertificateContentData,
        official: &OfficialInfo,
        config: &CertificateLayoutConfig,
        today: NaiveDate,
    ) -> Self {
        let issued_on = resolve_issuance_date_or(Some(&data.generated_on), today);
        Self::build(data, official, config, issued_on)
    }

    fn build(
        data: &CertificateContentData,
        official: &OfficialInfo,
        config: &CertificateLayoutConfig,
        issued_on: NaiveDate,
    ) -> Self {
        let template = get_certificate_template_config(&data.certificate_type);

        let mut paragraphs = template.build_body(data);
        paragraphs.push(issuance_paragraph(issued_on));

        let issued = issued_on.format("%B %-d, %Y").to_string();
        let footer_lines = config
            .footer
            .lines
            .iter()
            .map(|line| {
                line.text
                    .replace("{id}", data.id.trim())
                    .replace("{issued}", &issued)
            })
            .collect();

        let salutation = config
            .body
            .salutation
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let filename = format!(
            "{}-{}.pdf",
            slugify(&data.certificate_type, "certificate"),
            slugify(&data.requested_by, "document")
        );

        Self {
            template_id: template.id,
            preview_description: template.preview_description,
            title_lines: template.title_lines,
            salutation,
            paragraphs,
            signatory_name: official.name.trim().to_uppercase(),
            signatory_position: official.position.trim().to_string(),
            signature_src: data.signature_source().map(str::to_string),
            footer_lines,
            issued_on,
            filename,
        }
    }
}
