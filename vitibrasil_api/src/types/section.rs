//! Report sections exposed by the site.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the five top-level report categories.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    /// Grape, wine and derivative production.
    #[serde(rename = "production")]
    Production,

    /// Grapes processed, by cultivar class.
    #[serde(rename = "processing")]
    Processing,

    /// Wine and derivative sales on the domestic market.
    #[serde(rename = "commercialization")]
    Commercialization,

    /// Imports by product class and country.
    #[serde(rename = "import")]
    Import,

    /// Exports by product class and country.
    #[serde(rename = "export")]
    Export,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Production,
        Section::Processing,
        Section::Commercialization,
        Section::Import,
        Section::Export,
    ];

    /// Site code sent as the `opcao` query parameter.
    pub fn code(&self) -> &'static str {
        match self {
            Section::Production => "opt_02",
            Section::Processing => "opt_03",
            Section::Commercialization => "opt_04",
            Section::Import => "opt_05",
            Section::Export => "opt_06",
        }
    }

    /// Whether the site splits this section into subsections.
    pub fn supports_subsections(&self) -> bool {
        matches!(
            self,
            Section::Processing | Section::Import | Section::Export
        )
    }

    /// Portuguese slug, as used in the site's menu and the public API routes.
    pub fn slug_pt(&self) -> &'static str {
        match self {
            Section::Production => "producao",
            Section::Processing => "processamento",
            Section::Commercialization => "comercializacao",
            Section::Import => "importacao",
            Section::Export => "exportacao",
        }
    }

    /// Human-readable Portuguese name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Section::Production => "Produção",
            Section::Processing => "Processamento",
            Section::Commercialization => "Comercialização",
            Section::Import => "Importação",
            Section::Export => "Exportação",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Section::Production => "production",
                Section::Processing => "processing",
                Section::Commercialization => "commercialization",
                Section::Import => "import",
                Section::Export => "export",
            }
        )
    }
}

/// Returned when text names no known section.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown section '{0}' (expected one of: production, processing, commercialization, import, export)")]
pub struct ParseSectionError(pub String);

impl FromStr for Section {
    type Err = ParseSectionError;

    /// Accepts the English name, the Portuguese slug, or the site code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Section::ALL
            .into_iter()
            .find(|section| {
                section.to_string() == needle
                    || section.slug_pt() == needle
                    || section.code() == needle
            })
            .ok_or_else(|| ParseSectionError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_and_ordered() {
        let codes: Vec<&str> = Section::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes, vec!["opt_02", "opt_03", "opt_04", "opt_05", "opt_06"]);
    }

    #[test]
    fn only_processing_import_export_have_subsections() {
        assert!(!Section::Production.supports_subsections());
        assert!(Section::Processing.supports_subsections());
        assert!(!Section::Commercialization.supports_subsections());
        assert!(Section::Import.supports_subsections());
        assert!(Section::Export.supports_subsections());
    }

    #[test]
    fn parse_accepts_names_slugs_and_codes() {
        assert_eq!("production".parse::<Section>(), Ok(Section::Production));
        assert_eq!("Importacao".parse::<Section>(), Ok(Section::Import));
        assert_eq!(" opt_06 ".parse::<Section>(), Ok(Section::Export));
        assert_eq!("comercializacao".parse::<Section>(), Ok(Section::Commercialization));
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "wine".parse::<Section>().unwrap_err();
        assert_eq!(err, ParseSectionError("wine".to_string()));
    }

    #[test]
    fn serde_uses_english_names() {
        let json = serde_json::to_string(&Section::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let back: Section = serde_json::from_str("\"export\"").unwrap();
        assert_eq!(back, Section::Export);
    }
}
