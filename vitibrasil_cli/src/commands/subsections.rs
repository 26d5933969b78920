use anyhow::Result;
use clap::Args;
use vitibrasil_lib::validation;
use vitibrasil_lib::DataClient;

use crate::output::{
    print_json, print_subsections_csv, print_subsections_markdown, print_subsections_table,
    OutputFormat,
};

#[derive(Args)]
pub struct SubsectionsArgs {
    /// Section with subsections: processing, import, export
    pub section: String,
}

pub async fn run(args: &SubsectionsArgs, client: &DataClient, format: &OutputFormat) -> Result<()> {
    let section = validation::validate_section(&args.section)?;
    let subsections = client.subsections(section).await?;

    if subsections.is_empty() {
        eprintln!("No subsections listed for {}.", section);
    }

    match format {
        OutputFormat::Table => print_subsections_table(&subsections),
        OutputFormat::Json => print_json(&subsections),
        OutputFormat::Csv => print_subsections_csv(&subsections)?,
        OutputFormat::Markdown => print_subsections_markdown(&subsections),
    }
    Ok(())
}
