//! Score news headlines and write the sentiment file the environment loads.
//!
//! Usage:
//!   cargo run --bin score_news -- --input simulated_news.csv --output news_with_sentiment.csv

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rust_sentiment_portfolio::{
    data::{load_headlines, write_scored_news},
    sentiment::{score_headlines, KeywordScorer, SentimentScorer},
    utils::AppConfig,
};

#[derive(Parser, Debug)]
#[command(name = "score_news")]
#[command(about = "Attach a sentiment score to every news headline")]
struct Args {
    /// Headline file with `date,headline` columns
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file with `date,headline,sentiment` columns
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite the output file if it already exists
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = AppConfig::from_env();
    let input = args
        .input
        .unwrap_or_else(|| PathBuf::from(&config.data.headlines_file));
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.data.sentiment_file));

    if output.exists() && !args.force {
        info!(
            path = %output.display(),
            "sentiment file already exists, skipping (use --force to rescore)"
        );
        return Ok(());
    }

    let headlines = load_headlines(&input)?;
    let scorer = KeywordScorer::new();
    info!(count = headlines.len(), scorer = scorer.name(), "scoring headlines");

    let scored = score_headlines(&scorer, &headlines);
    for item in &scored {
        println!("{:>6.2}  {}  {}", item.sentiment, item.timestamp.format("%Y-%m-%d"), item.text);
    }

    write_scored_news(&output, &scored)?;
    info!(path = %output.display(), "sentiment scores saved");

    Ok(())
}
