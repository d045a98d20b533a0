//! Evaluate a baseline allocation policy on the held-out part of the price history.
//!
//! Usage:
//!   cargo run --bin evaluate -- --prices stock_prices.csv \
//!       --sentiment news_with_sentiment.csv --policy tilt

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rust_sentiment_portfolio::{
    agent::{EqualWeight, Policy, RandomPolicy, SentimentTilt, SingleAsset},
    backtest::{buy_and_hold_curve, run_episode, write_results_csv},
    data::{load_price_table, load_sentiment_series, AlignedFrame},
    environment::{Environment, PortfolioEnv},
    utils::{calculate_cumulative_return, AppConfig},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyKind {
    /// Uniform allocation
    Equal,
    /// Everything in the first asset
    Single,
    /// Sentiment-driven tilt between a risk asset and a haven asset
    Tilt,
    /// Seeded random logits
    Random,
}

#[derive(Parser, Debug)]
#[command(name = "evaluate")]
#[command(about = "Run a baseline policy through the portfolio environment")]
struct Args {
    /// JSON configuration file (defaults plus PORTFOLIO_* variables otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Price CSV (overrides the configuration)
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Scored news CSV (overrides the configuration)
    #[arg(long)]
    sentiment: Option<PathBuf>,

    /// Policy to evaluate
    #[arg(short, long, value_enum, default_value = "equal")]
    policy: PolicyKind,

    /// Fraction of price rows reserved for training
    #[arg(long)]
    train_fraction: Option<f64>,

    /// Benchmark ticker for the buy-and-hold comparison
    #[arg(long)]
    benchmark: Option<String>,

    /// Risk asset for the tilt policy
    #[arg(long, default_value = "QQQ")]
    risk_ticker: String,

    /// Haven asset for the tilt policy
    #[arg(long, default_value = "GLD")]
    haven_ticker: String,

    /// Seed for the random policy
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Results CSV (overrides the configuration)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn ticker_index(frame: &AlignedFrame, ticker: &str, fallback: usize) -> usize {
    frame.asset_index(ticker).unwrap_or_else(|| {
        warn!(ticker, fallback, "ticker not in price table, using fallback column");
        fallback
    })
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AppConfig::from_env(),
    };

    let price_path = args
        .prices
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.data.price_file));
    let sentiment_path = args
        .sentiment
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.data.sentiment_file));

    let prices = load_price_table(&price_path)
        .with_context(|| format!("loading prices from {}", price_path.display()))?;
    let sentiment = load_sentiment_series(&sentiment_path)
        .with_context(|| format!("loading sentiment from {}", sentiment_path.display()))?;

    let train_fraction = args.train_fraction.unwrap_or(config.data.train_fraction);
    let (train, test) = prices.split_at_fraction(train_fraction);
    info!(
        train_rows = train.len(),
        test_rows = test.len(),
        "split price history"
    );

    let mut env = PortfolioEnv::from_tables(&test, &sentiment, config.environment)?;
    let n_assets = env.action_size();
    let mut policy: Box<dyn Policy> = match args.policy {
        PolicyKind::Equal => Box::new(EqualWeight::new(n_assets)),
        PolicyKind::Single => Box::new(SingleAsset::new(n_assets, 0)),
        PolicyKind::Tilt => Box::new(SentimentTilt::new(
            n_assets,
            ticker_index(env.frame(), &args.risk_ticker, 0),
            ticker_index(env.frame(), &args.haven_ticker, n_assets - 1),
            2.0,
        )),
        PolicyKind::Random => Box::new(RandomPolicy::new(n_assets, args.seed)),
    };

    println!("Evaluating {} on {} test rows...", policy.name(), test.len());
    let record = run_episode(&mut env, policy.as_mut())?;

    let summary = record.summary(
        config.evaluation.periods_per_year,
        config.evaluation.risk_free_rate,
    );
    println!("\n{}\n", summary);

    let benchmark_ticker = args
        .benchmark
        .clone()
        .or_else(|| config.evaluation.benchmark.clone())
        .unwrap_or_else(|| env.tickers()[0].clone());
    let benchmark_asset = ticker_index(env.frame(), &benchmark_ticker, 0);
    let benchmark = buy_and_hold_curve(
        &test,
        benchmark_asset,
        config.environment.initial_capital,
        &record.timestamps,
    )?;
    let benchmark_return = calculate_cumulative_return(&benchmark);

    println!(
        "=== Comparison to Buy & Hold ({}, bought on first test row) ===",
        env.tickers()[benchmark_asset]
    );
    println!("Strategy Return:  {:>10.2}%", summary.total_return * 100.0);
    println!("Benchmark Return: {:>10.2}%", benchmark_return * 100.0);
    println!(
        "Alpha:            {:>10.2}%",
        (summary.total_return - benchmark_return) * 100.0
    );

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.evaluation.results_file));
    write_results_csv(&output, &record, Some(benchmark.as_slice()))?;
    println!("\nDetailed results saved to {}", output.display());

    Ok(())
}
