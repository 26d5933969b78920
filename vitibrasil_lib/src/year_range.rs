//! Year-range discovery from a section's landing page.
//!
//! The site prints the span of published years in a search label such as
//! `Ano: [1970-2023]`.

use std::ops::RangeInclusive;
use std::sync::OnceLock;

use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};

/// Inclusive bounds advertised by the site. Either bound may be unknown.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct YearRange {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

impl YearRange {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self {
            min_year: Some(min_year),
            max_year: Some(max_year),
        }
    }

    /// A range with neither bound known.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Both bounds, when both are known.
    pub fn bounds(&self) -> Option<(i32, i32)> {
        Some((self.min_year?, self.max_year?))
    }

    pub fn years(&self) -> Option<RangeInclusive<i32>> {
        self.bounds().map(|(min, max)| min..=max)
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years().is_some_and(|years| years.contains(&year))
    }
}

fn range_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:ano|year)\s*:\s*\[\s*(\d{4})\s*-\s*(\d{4})\s*\]")
            .expect("year range pattern compiles")
    })
}

fn parse_range(text: &str) -> Option<YearRange> {
    let caps = range_pattern().captures(text)?;
    let min_year = caps.get(1)?.as_str().parse::<i32>();
    let max_year = caps.get(2)?.as_str().parse::<i32>();
    match (min_year, max_year) {
        (Ok(min), Ok(max)) => Some(YearRange::new(min, max)),
        _ => Some(YearRange::unknown()),
    }
}

/// Extracts the advertised year range from a landing page.
///
/// Looks at the `lbl_pesq` search labels first, then at every text node in the
/// document. No match yields [`YearRange::unknown`]; the caller decides whether
/// that is a not-found condition.
pub fn resolve_year_range(doc: &Html) -> YearRange {
    let labelled = doc
        .select(selector!(".lbl_pesq"))
        .find_map(|label| parse_range(&label.text().collect::<String>()));
    if let Some(range) = labelled {
        return range;
    }

    let fallback = doc.root_element().text().find_map(parse_range);
    match fallback {
        Some(range) => {
            tracing::debug!("Year range found outside search labels");
            range
        }
        None => YearRange::unknown(),
    }
}
