//! Fetch orchestration: range checks, subsection enrichment, multi-year fan-out.

use std::sync::Arc;

use scraper::Html;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use vitibrasil_api::types::{Section, Subsection};
use vitibrasil_api::{Client, PageQuery};

use crate::config::{ScraperConfig, MAX_CONCURRENCY};
use crate::error::{scope, DataError};
use crate::locate::TableLocator;
use crate::record::DataRecord;
use crate::retry::{with_retry, RetryConfig};
use crate::subsections::resolve_subsections;
use crate::table::extract_with;
use crate::validation::ensure_year_in_range;
use crate::year_range::{resolve_year_range, YearRange};

/// What the caller wants fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataRequest {
    pub section: Section,
    pub subsection: Option<String>,
    pub year: Option<i32>,
    pub all_years: bool,
}

impl DataRequest {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            subsection: None,
            year: None,
            all_years: false,
        }
    }

    pub fn with_subsection(mut self, code: &str) -> Self {
        self.subsection = Some(code.to_string());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_all_years(mut self) -> Self {
        self.all_years = true;
        self
    }
}

/// What a landing page tells us before any data page is requested.
struct Landing {
    range: YearRange,
    subsections: Vec<Subsection>,
}

/// Entry point for data extraction.
///
/// Cloning is cheap: the HTTP pool and the locator chain are shared, which is
/// how each per-year task gets its own handle.
#[derive(Clone, Debug)]
pub struct DataClient {
    inner: Client,
    page_path: String,
    retry: RetryConfig,
    max_concurrency: usize,
    locator: Arc<TableLocator>,
}

impl DataClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, DataError> {
        config.validate()?;
        let inner = Client::new(&config.client_config())?;
        Ok(Self {
            inner,
            page_path: config.page_path.clone(),
            retry: config.retry.clone(),
            max_concurrency: config.max_concurrency,
            locator: Arc::new(TableLocator::default()),
        })
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    /// GET with retries; the body comes back unparsed.
    async fn fetch_page(&self, query: &PageQuery, label: &str) -> Result<String, DataError> {
        with_retry(&self.retry, label, || {
            self.inner.fetch_text(&self.page_path, query)
        })
        .await
        .map_err(DataError::from)
    }

    async fn landing(
        &self,
        section: Section,
        subsection: Option<&str>,
    ) -> Result<Landing, DataError> {
        let query = PageQuery::new(section).with_optional_subsection(subsection);
        let label = scope(&section, subsection);
        let body = self.fetch_page(&query, &label).await?;

        let doc = Html::parse_document(&body);
        Ok(Landing {
            range: resolve_year_range(&doc),
            subsections: resolve_subsections(&doc),
        })
    }

    /// Fetches one data page and normalizes its table.
    async fn fetch_records(
        &self,
        section: Section,
        year: i32,
        subsection: Option<&str>,
        subsection_name: Option<&str>,
    ) -> Result<Vec<DataRecord>, DataError> {
        let query = PageQuery::new(section)
            .with_year(year)
            .with_optional_subsection(subsection);
        let label = format!("{} {}", scope(&section, subsection), year);
        let body = self.fetch_page(&query, &label).await?;

        let doc = Html::parse_document(&body);
        let records = extract_with(&self.locator, &doc, year, subsection_name);
        tracing::debug!("{}: {} records", label, records.len());
        Ok(records)
    }

    /// The year range the site advertises for a section (and subsection).
    /// An unknown range is returned as is, not as an error.
    pub async fn year_range(
        &self,
        section: Section,
        subsection: Option<&str>,
    ) -> Result<YearRange, DataError> {
        ensure_subsections_supported(section, subsection)?;
        Ok(self.landing(section, subsection).await?.range)
    }

    /// Subsections listed for a section, in page order.
    pub async fn subsections(&self, section: Section) -> Result<Vec<Subsection>, DataError> {
        if !section.supports_subsections() {
            return Err(DataError::SubsectionsUnsupported(section));
        }
        let subsections = self.landing(section, None).await?.subsections;
        if subsections.is_empty() {
            tracing::warn!("No subsections found for {}", section);
        }
        Ok(subsections)
    }

    /// Looks up a subsection by code; a missing one is a not-found error.
    pub async fn find_subsection(
        &self,
        section: Section,
        code: &str,
    ) -> Result<Subsection, DataError> {
        self.subsections(section)
            .await?
            .into_iter()
            .find(|sub| sub.code == code)
            .ok_or_else(|| DataError::SubsectionNotFound {
                section,
                code: code.to_string(),
            })
    }

    /// Dispatches on the request shape: all years, one year, or an error when
    /// neither is given.
    pub async fn fetch(&self, request: &DataRequest) -> Result<Vec<DataRecord>, DataError> {
        let subsection = request.subsection.as_deref();
        if request.all_years {
            self.fetch_all_years(request.section, subsection).await
        } else if let Some(year) = request.year {
            self.fetch_year(request.section, year, subsection).await
        } else {
            Err(DataError::NoYearSpecified)
        }
    }

    /// Records for a single year. The year is checked against the advertised
    /// range before the data page is requested.
    pub async fn fetch_year(
        &self,
        section: Section,
        year: i32,
        subsection: Option<&str>,
    ) -> Result<Vec<DataRecord>, DataError> {
        ensure_subsections_supported(section, subsection)?;
        let landing = self.landing(section, subsection).await?;

        match ensure_year_in_range(year, &landing.range) {
            Some(result) => result?,
            None => return Err(range_unavailable(section, subsection)),
        };

        let name = subsection_name(section, &landing.subsections, subsection);
        self.fetch_records(section, year, subsection, name.as_deref())
            .await
    }

    /// Records for the most recent year the site advertises.
    pub async fn fetch_latest_year(
        &self,
        section: Section,
        subsection: Option<&str>,
    ) -> Result<Vec<DataRecord>, DataError> {
        ensure_subsections_supported(section, subsection)?;
        let landing = self.landing(section, subsection).await?;
        let (_, max_year) = landing
            .range
            .bounds()
            .ok_or_else(|| range_unavailable(section, subsection))?;

        let name = subsection_name(section, &landing.subsections, subsection);
        self.fetch_records(section, max_year, subsection, name.as_deref())
            .await
    }

    /// Records for every advertised year, fetched concurrently.
    ///
    /// A year that fails after retries is logged and left out; the rest are
    /// returned in ascending year order.
    pub async fn fetch_all_years(
        &self,
        section: Section,
        subsection: Option<&str>,
    ) -> Result<Vec<DataRecord>, DataError> {
        ensure_subsections_supported(section, subsection)?;
        let landing = self.landing(section, subsection).await?;
        let (min_year, max_year) = landing
            .range
            .bounds()
            .ok_or_else(|| range_unavailable(section, subsection))?;
        let name = subsection_name(section, &landing.subsections, subsection);

        tracing::info!(
            "Fetching {} years ({}-{}) for {}",
            max_year - min_year + 1,
            min_year,
            max_year,
            scope(&section, subsection)
        );

        let permits = self.max_concurrency.clamp(1, MAX_CONCURRENCY);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut join_set = JoinSet::new();

        for year in min_year..=max_year {
            let client = self.clone();
            let sem = Arc::clone(&semaphore);
            let code = subsection.map(str::to_string);
            let name = name.clone();
            join_set.spawn(async move {
                let _permit = match sem.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (year, Err(DataError::Internal("semaphore closed".into())));
                    }
                };
                let result = client
                    .fetch_records(section, year, code.as_deref(), name.as_deref())
                    .await;
                (year, result)
            });
        }

        let mut by_year: Vec<(i32, Vec<DataRecord>)> = Vec::new();
        let mut failed = 0usize;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((year, Ok(records))) => by_year.push((year, records)),
                Ok((year, Err(e))) => {
                    failed += 1;
                    tracing::warn!(
                        "Skipping {} year {}: {}",
                        scope(&section, subsection),
                        year,
                        e
                    );
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!("Year task for {} failed: {}", scope(&section, subsection), e);
                }
            }
        }

        if failed > 0 {
            tracing::warn!(
                "{} of {} years failed for {}",
                failed,
                max_year - min_year + 1,
                scope(&section, subsection)
            );
        }

        by_year.sort_by_key(|(year, _)| *year);
        Ok(by_year.into_iter().flat_map(|(_, records)| records).collect())
    }
}

fn ensure_subsections_supported(
    section: Section,
    subsection: Option<&str>,
) -> Result<(), DataError> {
    if subsection.is_some() && !section.supports_subsections() {
        return Err(DataError::SubsectionsUnsupported(section));
    }
    Ok(())
}

fn range_unavailable(section: Section, subsection: Option<&str>) -> DataError {
    DataError::YearRangeUnavailable {
        section,
        subsection: subsection.map(str::to_string),
    }
}

/// Display name for a subsection code. An unlisted code is fetched anyway,
/// without a name.
fn subsection_name(
    section: Section,
    listed: &[Subsection],
    code: Option<&str>,
) -> Option<String> {
    let code = code?;
    match listed.iter().find(|sub| sub.code == code) {
        Some(sub) => Some(sub.name.clone()),
        None => {
            tracing::warn!("Subsection {} not listed for {}", code, section);
            None
        }
    }
}
