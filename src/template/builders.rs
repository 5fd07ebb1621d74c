//! Paragraph builders, one per registered template.
//!
//! Every builder returns the residence paragraph (with a type-specific
//! clause appended) followed by the purpose paragraph. Optional fields are
//! substituted when present; when absent the sentence falls back to
//! generic wording instead of leaving a gap.

use crate::model::{present, CertificateContentData};

/// The issuing barangay, as printed in every residence sentence.
pub const LOCALITY: &str = "Barangay San Isidro, Municipality of Santa Cruz, Province of Laguna";

const DEFAULT_PURPOSE: &str = "whatever legal purpose it may serve";

fn subject_name(data: &CertificateContentData) -> String {
    let name = data.requested_by.trim();
    if name.is_empty() {
        "THE BEARER".to_string()
    } else {
        name.to_uppercase()
    }
}

fn age_phrase(data: &CertificateContentData) -> String {
    match present(&data.age) {
        Some(age) if age.chars().all(|c| c.is_ascii_digit()) => format!("{} years of age", age),
        Some(age) => age.to_string(),
        None => "of legal age".to_string(),
    }
}

/// Prefix bare numbers with the currency code; leave formatted amounts alone.
fn peso(amount: &str) -> String {
    if amount.starts_with(|c: char| c.is_ascii_digit()) {
        format!("PHP {}", amount)
    } else {
        amount.to_string()
    }
}

/// `This is to certify that <NAME>, <age> [and residing at <address>], ...`
fn identity(data: &CertificateContentData) -> String {
    let mut s = format!(
        "This is to certify that {}, {}",
        subject_name(data),
        age_phrase(data)
    );
    if let Some(address) = present(&data.address) {
        s.push_str(" and residing at ");
        s.push_str(address);
    }
    s
}

/// First sentence of paragraph one.
pub fn residence_sentence(data: &CertificateContentData) -> String {
    format!("{}, is a resident of {}.", identity(data), LOCALITY)
}

pub fn purpose_paragraph(data: &CertificateContentData) -> String {
    let purpose = data.purpose.trim().trim_end_matches('.').trim_end();
    let purpose = if purpose.is_empty() {
        DEFAULT_PURPOSE
    } else {
        purpose
    };
    format!(
        "This certification is issued upon the request of the above-named person for {}.",
        purpose
    )
}

fn with_clause(data: &CertificateContentData, clause: String) -> Vec<String> {
    vec![
        format!("{} {}", residence_sentence(data), clause),
        purpose_paragraph(data),
    ]
}

pub fn generic(data: &CertificateContentData) -> Vec<String> {
    vec![residence_sentence(data), purpose_paragraph(data)]
}

pub fn non_residency(data: &CertificateContentData) -> Vec<String> {
    let first = match present(&data.non_residence_duration) {
        Some(duration) => format!(
            "{}, is not a resident of {}. Per the records of this office, the above-named \
             person has not resided within this barangay for {}.",
            identity(data),
            LOCALITY,
            duration
        ),
        None => format!(
            "{}, is not a resident of {}. Per the records of this office, the above-named \
             person has no record of residence within this barangay.",
            identity(data),
            LOCALITY
        ),
    };
    vec![first, purpose_paragraph(data)]
}

pub fn residency(data: &CertificateContentData) -> Vec<String> {
    let clause = match present(&data.occupation) {
        Some(occupation) => format!(
            "The above-named person is a bona fide resident of this barangay and works as {}.",
            occupation
        ),
        None => "The above-named person is a bona fide resident of this barangay.".to_string(),
    };
    with_clause(data, clause)
}

pub fn indigency(data: &CertificateContentData) -> Vec<String> {
    let clause = match (present(&data.income), present(&data.income_year)) {
        (Some(income), Some(year)) => format!(
            "The above-named person belongs to an indigent family of this barangay, with a \
             declared income of {} for the year {}.",
            peso(income),
            year
        ),
        (Some(income), None) => format!(
            "The above-named person belongs to an indigent family of this barangay, with a \
             declared income of {}.",
            peso(income)
        ),
        _ => "The above-named person belongs to an indigent family of this barangay and has \
              no sufficient means of income."
            .to_string(),
    };
    with_clause(data, clause)
}

pub fn good_moral(data: &CertificateContentData) -> Vec<String> {
    let clause = "The above-named person is known to be of good moral character and has no \
                  derogatory record filed with this office."
        .to_string();
    with_clause(data, clause)
}

pub fn clearance(data: &CertificateContentData) -> Vec<String> {
    let clause = match present(&data.occupation) {
        Some(occupation) => format!(
            "The above-named person, working as {}, has no pending case or derogatory \
             record filed with this office.",
            occupation
        ),
        None => "The above-named person has no pending case or derogatory record filed with \
                 this office."
            .to_string(),
    };
    with_clause(data, clause)
}

pub fn unemployment(data: &CertificateContentData) -> Vec<String> {
    let clause = match present(&data.employment_period) {
        Some(period) => format!(
            "The above-named person has been unemployed for {} and has no regular source of \
             income.",
            period
        ),
        None => "The above-named person is currently unemployed and has no regular source of \
                 income."
            .to_string(),
    };
    with_clause(data, clause)
}

pub fn employment(data: &CertificateContentData) -> Vec<String> {
    let mut clause = match present(&data.job_title) {
        Some(job) => format!("The above-named person is employed as {}", job),
        None => "The above-named person is gainfully employed".to_string(),
    };
    if let Some(employer) = present(&data.business_name) {
        clause.push_str(" at ");
        clause.push_str(employer);
    }
    if let Some(period) = present(&data.employment_period) {
        clause.push_str(" for the period of ");
        clause.push_str(period);
    }
    clause.push('.');
    with_clause(data, clause)
}

pub fn business_closure(data: &CertificateContentData) -> Vec<String> {
    let mut clause = match present(&data.business_name) {
        Some(name) => format!("The business {}, owned by the above-named person", name),
        None => "The business owned by the above-named person".to_string(),
    };
    if let Some(location) = present(&data.business_location) {
        clause.push_str(" and located at ");
        clause.push_str(location);
    }
    if present(&data.business_name).is_some() {
        clause.push(',');
    }
    clause.push_str(" has ceased operations");
    if let Some(date) = present(&data.closure_date) {
        clause.push_str(" effective ");
        clause.push_str(date);
    }
    if let Some(reason) = present(&data.closure_reason) {
        clause.push_str(" due to ");
        clause.push_str(reason.trim_end_matches('.'));
    }
    clause.push('.');
    with_clause(data, clause)
}

pub fn income(data: &CertificateContentData) -> Vec<String> {
    let mut clause = "The above-named person".to_string();
    if let Some(occupation) = present(&data.occupation) {
        clause.push_str(", working as ");
        clause.push_str(occupation);
        clause.push(',');
    }
    match present(&data.income) {
        Some(amount) => {
            clause.push_str(" has a declared income of ");
            clause.push_str(&peso(amount));
            if let Some(year) = present(&data.income_year) {
                clause.push_str(" for the year ");
                clause.push_str(year);
            }
        }
        None => clause.push_str(" has no fixed income on record with this office"),
    }
    clause.push('.');
    with_clause(data, clause)
}

pub fn support(data: &CertificateContentData) -> Vec<String> {
    let mut clause = match present(&data.relationship) {
        Some(relationship) => format!(
            "The above-named person provides financial support to their {}",
            relationship
        ),
        None => "The above-named person provides financial support to their dependents"
            .to_string(),
    };
    if let Some(amount) = present(&data.allowance_amount) {
        clause.push_str(" in the amount of ");
        clause.push_str(&peso(amount));
    }
    clause.push('.');
    if let Some(details) = present(&data.support_details) {
        clause.push(' ');
        clause.push_str(details);
        if !details.ends_with(['.', '!', '?']) {
            clause.push('.');
        }
    }
    with_clause(data, clause)
}
