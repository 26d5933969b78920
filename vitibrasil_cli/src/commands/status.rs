use std::time::Instant;

use anyhow::{bail, Result};
use clap::Args;
use vitibrasil_lib::validation;
use vitibrasil_lib::{DataClient, Section};

use crate::output::{
    print_json, print_rows_csv, print_rows_markdown, print_rows_table, OutputFormat, StatusRow,
};

#[derive(Args)]
pub struct StatusArgs {
    /// Check a single section instead of all five
    pub section: Option<String>,
}

/// Fetches each section's landing page and reports whether it answered and
/// which years it advertises.
pub async fn run(args: &StatusArgs, client: &DataClient, format: &OutputFormat) -> Result<()> {
    let sections = match &args.section {
        Some(section) => vec![validation::validate_section(section)?],
        None => Section::ALL.to_vec(),
    };

    let mut rows = Vec::with_capacity(sections.len());
    let mut failures = 0usize;
    for section in sections {
        let started = Instant::now();
        let result = client.year_range(section, None).await;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let (status, years) = match result {
            Ok(range) => match range.bounds() {
                Some((min, max)) => ("ok".to_string(), format!("{}-{}", min, max)),
                None => ("ok (no year range)".to_string(), String::new()),
            },
            Err(e) => {
                failures += 1;
                tracing::warn!("Status check for {} failed: {}", section, e);
                (format!("error: {}", e), String::new())
            }
        };
        rows.push(StatusRow {
            section: section.to_string(),
            status,
            years,
            latency_ms,
        });
    }

    match format {
        OutputFormat::Table => print_rows_table(&rows),
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Csv => print_rows_csv(&rows)?,
        OutputFormat::Markdown => print_rows_markdown(&rows),
    }

    if failures > 0 {
        bail!(
            "{} of {} sections unreachable at {}",
            failures,
            rows.len(),
            client.base_url()
        );
    }
    Ok(())
}
