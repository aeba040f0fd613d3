mod recognize;
mod recommend;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wardrobe_core::ai::{AiConfig, ModelGateway, OpenAiCompatibleClient};

#[derive(Parser)]
#[command(name = "wardrobe")]
#[command(about = "Wardrobe AI CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one or more garment photos
    Recognize {
        /// Image URLs to classify
        #[arg(required = true)]
        urls: Vec<String>,
        /// Skip URLs that do not answer a HEAD request with an image
        #[arg(long)]
        check_url: bool,
        /// Seed for the fallback attribute generator
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Re-classify a stored garment's photo
    Reanalyze {
        /// Image URL of the stored garment
        url: String,
        /// Seed for the fallback attribute generator
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Recommend an outfit from a JSON garment pool
    Recommend {
        /// JSON file holding an array of garments
        #[arg(long)]
        pool: PathBuf,
        #[arg(long)]
        occasion: Option<String>,
        /// Season name, or "auto" for today's season
        #[arg(long)]
        season: Option<String>,
        /// Preferred style
        #[arg(long)]
        style: Option<String>,
        /// Weather description
        #[arg(long)]
        weather: Option<String>,
        /// Temperature in °C
        #[arg(long, allow_negative_numbers = true)]
        temperature: Option<f64>,
        /// Garment ids to leave out
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<i64>,
    },
}

/// Console logging on stderr, filtered by RUST_LOG (default "info").
fn init_telemetry() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn build_gateway() -> Result<ModelGateway> {
    let config = AiConfig::from_env().context("Failed to load AI configuration")?;
    tracing::debug!(
        model = %config.model,
        base_url = %config.base_url,
        "Loaded AI configuration"
    );
    let client = OpenAiCompatibleClient::new(config.clone()).context("Failed to build AI client")?;
    Ok(ModelGateway::new(Arc::new(client), &config))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry();
    let cli = Cli::parse();

    match cli.command {
        Commands::Recognize {
            urls,
            check_url,
            seed,
        } => {
            recognize::recognize(build_gateway()?, &urls, check_url, seed).await?;
        }
        Commands::Reanalyze { url, seed } => {
            recognize::reanalyze(build_gateway()?, &url, seed).await?;
        }
        Commands::Recommend {
            pool,
            occasion,
            season,
            style,
            weather,
            temperature,
            exclude,
        } => {
            let args = recommend::RecommendArgs {
                pool,
                occasion,
                season,
                style,
                weather,
                temperature,
                exclude,
            };
            recommend::recommend(build_gateway()?, args).await?;
        }
    }

    Ok(())
}
