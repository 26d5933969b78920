use anyhow::Result;
use clap::Args;
use vitibrasil_lib::validation;
use vitibrasil_lib::{DataClient, DataRequest, DataResponse};

use crate::output::{
    print_json, print_records_csv, print_records_markdown, print_records_table, OutputFormat,
};

#[derive(Args)]
pub struct FetchArgs {
    /// Section: production, processing, commercialization, import, export
    /// (Portuguese slugs and opt_0N codes are accepted too)
    pub section: String,

    /// Subsection code (e.g. subopt_01); only processing, import and export have them
    #[arg(long)]
    pub subsection: Option<String>,

    /// Year to fetch; defaults to the latest year the site publishes
    #[arg(long, conflicts_with = "all")]
    pub year: Option<i32>,

    /// Fetch every published year
    #[arg(long)]
    pub all: bool,
}

pub async fn run(args: &FetchArgs, client: &DataClient, format: &OutputFormat) -> Result<()> {
    let section = validation::validate_section(&args.section)?;
    let subsection = args
        .subsection
        .as_deref()
        .map(validation::validate_subsection_code)
        .transpose()?;

    let mut request = DataRequest::new(section);
    if let Some(code) = &subsection {
        request = request.with_subsection(code);
    }

    let records = if args.all {
        client.fetch(&request.with_all_years()).await?
    } else if let Some(year) = args.year {
        let year = validation::validate_year(year)?;
        client.fetch(&request.with_year(year)).await?
    } else {
        client
            .fetch_latest_year(section, subsection.as_deref())
            .await?
    };

    if records.is_empty() {
        eprintln!("No data rows found.");
    }

    match format {
        OutputFormat::Table => print_records_table(&records),
        OutputFormat::Json => print_json(&DataResponse::from(records)),
        OutputFormat::Csv => print_records_csv(&records)?,
        OutputFormat::Markdown => print_records_markdown(&records),
    }
    Ok(())
}
