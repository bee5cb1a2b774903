//! Output file naming.

use super::html::format_date;
use chrono::{NaiveDate, NaiveDateTime};

const GUIDE_LABEL: &str = "Small Group Discussion Guide";

/// Replace characters that are not safe in file names.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "guide".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Name of the PDF for one guide.
///
/// Dated guides are named by week; undated ones fall back to the input
/// identifier plus a local timestamp so repeated runs never collide.
pub fn output_file_name(
    org: &str,
    date: Option<NaiveDate>,
    identifier: &str,
    now: NaiveDateTime,
) -> String {
    let org = sanitize_component(org);
    match date {
        Some(date) => format!("{} - {} - Week of {}.pdf", org, GUIDE_LABEL, format_date(date)),
        None => format!(
            "{} - {} - {} - {}.pdf",
            org,
            GUIDE_LABEL,
            sanitize_component(identifier),
            now.format("%Y%m%d-%H%M%S")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 2)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    #[test]
    fn test_dated_name() {
        let name = output_file_name(
            "Kings Church",
            NaiveDate::from_ymd_opt(2024, 12, 29),
            "ignored",
            now(),
        );
        assert_eq!(
            name,
            "Kings Church - Small Group Discussion Guide - Week of December 29, 2024.pdf"
        );
    }

    #[test]
    fn test_undated_name() {
        let name = output_file_name("Kings Church", None, "dQw4w9WgXcQ", now());
        assert_eq!(
            name,
            "Kings Church - Small Group Discussion Guide - dQw4w9WgXcQ - 20250302-090507.pdf"
        );
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_component("  ..  "), "guide");
        assert_eq!(sanitize_component("sermon 12.29.24"), "sermon 12.29.24");
    }
}
