use vitibrasil_api::types::Section;

use crate::error::DataError;
use crate::year_range::YearRange;

pub const MAX_SUBSECTION_CODE_LENGTH: usize = 32;

/// Years the site could plausibly publish; anything else is a typo.
pub const MIN_PLAUSIBLE_YEAR: i32 = 1900;
pub const MAX_PLAUSIBLE_YEAR: i32 = 2100;

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, DataError> {
    if input.len() > max_len {
        return Err(DataError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(DataError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

pub fn validate_section(input: &str) -> Result<Section, DataError> {
    input.parse::<Section>().map_err(|_| {
        DataError::InvalidInput(format!(
            "unknown section '{}'. Valid: production, processing, commercialization, import, export \
             (or producao, processamento, comercializacao, importacao, exportacao)",
            input.trim()
        ))
    })
}

/// Subsection codes are short identifiers such as `subopt_01`.
pub fn validate_subsection_code(input: &str) -> Result<String, DataError> {
    let code = sanitize_text(input, MAX_SUBSECTION_CODE_LENGTH)?;
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DataError::InvalidInput(format!(
            "invalid subsection code '{}': use letters, digits and underscores (e.g. subopt_01)",
            code
        )));
    }
    Ok(code)
}

pub fn validate_year(year: i32) -> Result<i32, DataError> {
    if !(MIN_PLAUSIBLE_YEAR..=MAX_PLAUSIBLE_YEAR).contains(&year) {
        return Err(DataError::InvalidInput(format!(
            "year must be between {} and {}",
            MIN_PLAUSIBLE_YEAR, MAX_PLAUSIBLE_YEAR
        )));
    }
    Ok(year)
}

/// Checks `year` against a resolved range. An incomplete range accepts nothing;
/// callers report that case separately, so it is returned as `None`.
pub fn ensure_year_in_range(year: i32, range: &YearRange) -> Option<Result<i32, DataError>> {
    let (min_year, max_year) = range.bounds()?;
    if range.contains(year) {
        Some(Ok(year))
    } else {
        Some(Err(DataError::YearOutOfRange {
            year,
            min_year,
            max_year,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Text sanitization --

    #[test]
    fn sanitize_strips_control_chars() {
        assert_eq!(sanitize_text("sub\u{0}opt\t_01\n", 32).unwrap(), "subopt_01");
    }

    #[test]
    fn sanitize_rejects_too_long() {
        assert!(sanitize_text(&"a".repeat(40), 32).is_err());
    }

    #[test]
    fn sanitize_rejects_blank() {
        assert!(sanitize_text(" \n ", 32).is_err());
    }

    // -- Section validation --

    #[test]
    fn section_by_english_name() {
        assert_eq!(validate_section("Import").unwrap(), Section::Import);
    }

    #[test]
    fn section_by_portuguese_slug() {
        assert_eq!(validate_section("exportacao").unwrap(), Section::Export);
    }

    #[test]
    fn section_unknown() {
        let err = validate_section("wine").unwrap_err();
        assert!(err.to_string().contains("unknown section 'wine'"));
    }

    // -- Subsection code validation --

    #[test]
    fn subsection_code_valid() {
        assert_eq!(validate_subsection_code(" subopt_03 ").unwrap(), "subopt_03");
    }

    #[test]
    fn subsection_code_rejects_punctuation() {
        assert!(validate_subsection_code("subopt_01&opcao=opt_02").is_err());
    }

    // -- Year validation --

    #[test]
    fn year_plausible() {
        assert_eq!(validate_year(1970).unwrap(), 1970);
    }

    #[test]
    fn year_implausible() {
        assert!(validate_year(23).is_err());
        assert!(validate_year(20230).is_err());
    }

    #[test]
    fn year_in_range_accepts_bounds() {
        let range = YearRange::new(1970, 2023);
        assert!(matches!(ensure_year_in_range(1970, &range), Some(Ok(1970))));
        assert!(matches!(ensure_year_in_range(2023, &range), Some(Ok(2023))));
    }

    #[test]
    fn year_out_of_range_reports_bounds() {
        let range = YearRange::new(1970, 2023);
        match ensure_year_in_range(2024, &range) {
            Some(Err(DataError::YearOutOfRange {
                year,
                min_year,
                max_year,
            })) => assert_eq!((year, min_year, max_year), (2024, 1970, 2023)),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn year_against_unknown_range_is_undecided() {
        assert!(ensure_year_in_range(2000, &YearRange::unknown()).is_none());
    }
}
