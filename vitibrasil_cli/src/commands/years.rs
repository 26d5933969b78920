use anyhow::Result;
use clap::Args;
use vitibrasil_lib::validation;
use vitibrasil_lib::DataClient;

use crate::output::{
    build_years_row, print_json, print_rows_csv, print_rows_markdown, print_rows_table,
    OutputFormat,
};

#[derive(Args)]
pub struct YearsArgs {
    /// Section: production, processing, commercialization, import, export
    /// (Portuguese slugs and opt_0N codes are accepted too)
    pub section: String,

    /// Subsection code (e.g. subopt_01)
    #[arg(long)]
    pub subsection: Option<String>,
}

pub async fn run(args: &YearsArgs, client: &DataClient, format: &OutputFormat) -> Result<()> {
    let section = validation::validate_section(&args.section)?;
    let subsection = args
        .subsection
        .as_deref()
        .map(validation::validate_subsection_code)
        .transpose()?;

    let range = client.year_range(section, subsection.as_deref()).await?;
    if range.bounds().is_none() {
        eprintln!("The site did not advertise a year range for {}.", section);
    }

    let rows = vec![build_years_row(section, subsection.as_deref(), &range)];
    match format {
        OutputFormat::Table => print_rows_table(&rows),
        OutputFormat::Json => print_json(&range),
        OutputFormat::Csv => print_rows_csv(&rows)?,
        OutputFormat::Markdown => print_rows_markdown(&rows),
    }
    Ok(())
}
