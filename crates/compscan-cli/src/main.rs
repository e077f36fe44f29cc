mod scan;
mod suggest;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use compscan_pipeline::DEFAULT_RADIUS_MILES;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "compscan")]
#[command(about = "Competitor discovery and price suggestion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find nearby competitors and scrape their advertised prices.
    Scan {
        /// Street address or a literal "lat,lng" pair.
        #[arg(long)]
        address: String,
        /// Search radius in miles.
        #[arg(long, default_value_t = DEFAULT_RADIUS_MILES, value_parser = parse_radius)]
        radius: f64,
        #[arg(long)]
        facility_name: Option<String>,
    },
    /// Recommend a price from a saved competitor list.
    Suggest {
        /// JSON file holding `{"competitors": [...]}` or a bare array.
        #[arg(long)]
        file: PathBuf,
    },
}

fn parse_radius(raw: &str) -> Result<f64, String> {
    let radius: f64 = raw
        .parse()
        .map_err(|e| format!("invalid radius '{raw}': {e}"))?;
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(format!("radius must be a positive number of miles, got {raw}"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pipeable JSON.
    let fallback = std::env::var("COMPSCAN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan {
            address,
            radius,
            facility_name,
        } => scan::run_scan(&address, radius, facility_name).await,
        Commands::Suggest { file } => suggest::run_suggest(&file),
    }
}
