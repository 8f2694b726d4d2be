//! WebSearch-RS command line entry point
//!
//! Results go to stdout; every diagnostic goes to stderr through tracing.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use websearch_rs::{
    config::{self, Settings},
    network::HttpClient,
    results::OutputFormat,
    Search, SearchQuery,
};

/// Search the web using the Serper API with DuckDuckGo fallback
#[derive(Parser, Debug)]
#[command(name = "websearch-rs")]
#[command(version)]
#[command(about = "Search using Serper API with DuckDuckGo fallback", long_about = None)]
struct Cli {
    /// Search query
    #[arg(value_name = "QUERY")]
    query: String,

    /// Maximum number of results (default: 10)
    #[arg(long)]
    max_results: Option<usize>,

    /// Maximum number of retry attempts (default: 3)
    #[arg(long)]
    max_retries: Option<u32>,

    /// Path to a YAML settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Search failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = config::load(cli.config.as_deref())?;
    let query = build_query(&cli, &settings)?;

    let client = HttpClient::with_settings(&settings.outgoing)?;
    let search = Search::from_settings(&settings, client);

    let response = search.search_with_source(&query).await?;
    info!(
        "{} results from {} provider",
        response.results.len(),
        response.source
    );

    print!("{}", cli.format.render(&response.results)?);
    Ok(())
}

fn build_query(cli: &Cli, settings: &Settings) -> Result<SearchQuery> {
    let max_results = cli.max_results.unwrap_or(settings.search.max_results);
    let max_retries = cli.max_retries.unwrap_or(settings.search.max_retries);

    Ok(SearchQuery::new(cli.query.as_str())?
        .with_max_results(max_results)?
        .with_max_retries(max_retries))
}

/// Sets up the tracing subscriber on stderr; `RUST_LOG` takes precedence
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("websearch_rs=info,warn"),
                1 => EnvFilter::new("websearch_rs=debug,info"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
