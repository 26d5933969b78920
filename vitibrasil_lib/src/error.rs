//! Error types for the extraction engine.

use vitibrasil_api::types::Section;

/// Errors produced by the extraction engine, wrapping fetcher failures and
/// adding caller-contract and range-resolution failures.
///
/// Structural surprises on a page (no range label, no table, no rows) are not
/// errors; they surface as absent values or empty record lists.
#[derive(thiserror::Error, Debug)]
pub enum DataError {
    /// The page fetcher failed after any retries it was allowed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] vitibrasil_api::Error),
    /// Neither a year nor "all years" was requested.
    #[error("No year specified: pass a year or request all years")]
    NoYearSpecified,
    /// The landing page did not advertise a usable year range.
    #[error("Could not determine the year range for {}", scope(.section, .subsection.as_deref()))]
    YearRangeUnavailable {
        section: Section,
        subsection: Option<String>,
    },
    /// The requested year lies outside the advertised range.
    #[error("Year {year} is outside the available range [{min_year}-{max_year}]")]
    YearOutOfRange {
        year: i32,
        min_year: i32,
        max_year: i32,
    },
    /// A subsection was given for a section the site does not split.
    #[error("Section {0} has no subsections")]
    SubsectionsUnsupported(Section),
    /// The subsection code is not among the ones listed for the section.
    #[error("Subsection '{code}' not found for {section}")]
    SubsectionNotFound { section: Section, code: String },
    /// User-provided input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
    /// A background task ended abnormally.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification an API layer maps onto response statuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request from the caller (4xx).
    ClientInput,
    /// Something the caller asked for does not exist upstream (404).
    NotFound,
    /// The upstream site failed or could not be reached (503).
    Upstream,
    /// Misconfiguration or a bug on our side (500).
    Internal,
}

impl DataError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoYearSpecified
            | Self::YearOutOfRange { .. }
            | Self::SubsectionsUnsupported(_)
            | Self::InvalidInput(_) => ErrorKind::ClientInput,
            Self::YearRangeUnavailable { .. } | Self::SubsectionNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::Fetch(_) => ErrorKind::Upstream,
            Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub(crate) fn scope(section: &Section, subsection: Option<&str>) -> String {
    match subsection {
        Some(code) => format!("{}/{}", section, code),
        None => section.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_unavailable_message_includes_subsection() {
        let err = DataError::YearRangeUnavailable {
            section: Section::Import,
            subsection: Some("subopt_02".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Could not determine the year range for import/subopt_02"
        );
    }

    #[test]
    fn out_of_range_message_reports_bounds() {
        let err = DataError::YearOutOfRange {
            year: 1960,
            min_year: 1970,
            max_year: 2023,
        };
        assert_eq!(
            err.to_string(),
            "Year 1960 is outside the available range [1970-2023]"
        );
    }

    #[test]
    fn kinds_separate_caller_faults_from_upstream_faults() {
        assert_eq!(DataError::NoYearSpecified.kind(), ErrorKind::ClientInput);
        assert_eq!(
            DataError::SubsectionNotFound {
                section: Section::Export,
                code: "subopt_99".to_string()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DataError::from(vitibrasil_api::Error::Transport {
                message: "timed out".to_string()
            })
            .kind(),
            ErrorKind::Upstream
        );
        assert_eq!(DataError::Config("x".into()).kind(), ErrorKind::Internal);
    }
}
