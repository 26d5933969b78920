mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use vitibrasil_lib::{DataClient, ScraperConfig};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "vitibrasil")]
#[command(about = "Extract grape, wine and derivative statistics from Embrapa Vitibrasil")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// TOML config file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Site root, overriding config and TARGET_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Maximum concurrent page fetches for --all
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the range of years a section publishes
    Years(commands::years::YearsArgs),
    /// List a section's subsections
    Subsections(commands::subsections::SubsectionsArgs),
    /// Fetch data rows for one year, the latest year, or all years
    Fetch(commands::fetch::FetchArgs),
    /// Check that the site answers for each section
    Status(commands::status::StatusArgs),
}

fn load_config(cli: &Cli) -> Result<ScraperConfig> {
    let mut config = ScraperConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.max_concurrency = concurrency;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vitibrasil=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let client = DataClient::new(&config)?;

    match &cli.command {
        Commands::Years(args) => commands::years::run(args, &client, &cli.output).await?,
        Commands::Subsections(args) => {
            commands::subsections::run(args, &client, &cli.output).await?
        }
        Commands::Fetch(args) => commands::fetch::run(args, &client, &cli.output).await?,
        Commands::Status(args) => commands::status::run(args, &client, &cli.output).await?,
    }

    Ok(())
}
