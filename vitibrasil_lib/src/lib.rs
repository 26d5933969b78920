//! Extraction engine for the Vitibrasil statistics site.
//!
//! Wraps the `vitibrasil_api` page fetcher with retrying, year-range and
//! subsection discovery, table location, row normalization, and the
//! concurrent multi-year fan-out.

#[macro_use]
mod macros;

pub mod client;
pub mod config;
pub mod error;
pub mod locate;
pub mod record;
pub mod retry;
pub mod subsections;
pub mod table;
mod text;
pub mod validation;
pub mod year_range;

pub use vitibrasil_api;
pub use vitibrasil_api::types;
pub use vitibrasil_api::types::{Section, Subsection};

pub use client::{DataClient, DataRequest};
pub use config::ScraperConfig;
pub use error::{DataError, ErrorKind};
pub use locate::{locate_table, TableLocator, TableStrategy};
pub use record::{DataRecord, DataResponse, Metrics};
pub use retry::RetryConfig;
pub use subsections::resolve_subsections;
pub use table::{extract_records, normalize_table};
pub use year_range::{resolve_year_range, YearRange};
