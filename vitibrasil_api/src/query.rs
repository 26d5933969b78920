//! Query-string builders for the Vitibrasil page endpoint.

use url::Url;

use crate::types::Section;

/// Trait implemented by query builders. Provides URL serialization.
pub trait Query {
    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;
}

/// Parameters of a single page request.
///
/// Without a year the site answers with the section's landing page, which carries the
/// year-range label and the subsection buttons. With a year it answers with the data table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageQuery {
    pub section_code: String,
    pub year: Option<i32>,
    pub subsection_code: Option<String>,
}

impl PageQuery {
    /// Landing-page query for a section.
    pub fn new(section: Section) -> Self {
        Self {
            section_code: section.code().to_string(),
            year: None,
            subsection_code: None,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_subsection(mut self, subsection_code: &str) -> Self {
        self.subsection_code = Some(subsection_code.to_string());
        self
    }

    /// Sets the subsection only when one is given.
    pub fn with_optional_subsection(self, subsection_code: Option<&str>) -> Self {
        match subsection_code {
            Some(code) => self.with_subsection(code),
            None => self,
        }
    }
}

impl Query for PageQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("opcao", &self.section_code);
        if let Some(year) = self.year {
            url.query_pairs_mut().append_pair("ano", &year.to_string());
        }
        if let Some(subsection_code) = &self.subsection_code {
            url.query_pairs_mut()
                .append_pair("subopcao", subsection_code.as_str());
        }
        url
    }
}
