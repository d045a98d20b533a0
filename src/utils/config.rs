//! Application configuration for the command-line tools.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::environment::EpisodeConfig;
use crate::error::Result;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input/output files
    pub data: DataConfig,
    /// Episode parameters
    pub environment: EpisodeConfig,
    /// Evaluation settings
    pub evaluation: EvaluationConfig,
}

/// Data file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Wide CSV of adjusted closes, one column per ticker
    pub price_file: String,
    /// Raw `date,headline` news file
    pub headlines_file: String,
    /// Scored `date,headline,sentiment` news file
    pub sentiment_file: String,
    /// Fraction of price rows used for training; evaluation runs on the rest
    pub train_fraction: f64,
}

/// Evaluation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Periods per year used to annualise the Sharpe ratio
    pub periods_per_year: f64,
    /// Annual risk-free rate
    pub risk_free_rate: f64,
    /// Buy-and-hold benchmark ticker (first ticker when unset)
    pub benchmark: Option<String>,
    /// Where the per-step results CSV is written
    pub results_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                price_file: "stock_prices.csv".to_string(),
                headlines_file: "simulated_news.csv".to_string(),
                sentiment_file: "news_with_sentiment.csv".to_string(),
                train_fraction: 0.8,
            },
            environment: EpisodeConfig::default(),
            evaluation: EvaluationConfig {
                periods_per_year: 252.0,
                risk_free_rate: 0.0,
                benchmark: Some("SPY".to_string()),
                results_file: "backtest_results.csv".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Defaults overridden by `PORTFOLIO_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("PORTFOLIO_PRICE_FILE") {
            self.data.price_file = path;
        }
        if let Some(path) = lookup("PORTFOLIO_SENTIMENT_FILE") {
            self.data.sentiment_file = path;
        }
        if let Some(path) = lookup("PORTFOLIO_HEADLINES_FILE") {
            self.data.headlines_file = path;
        }
        if let Some(raw) = lookup("PORTFOLIO_WINDOW_SIZE") {
            match raw.parse() {
                Ok(v) => self.environment.window_size = v,
                Err(_) => warn!(value = %raw, "ignoring unparseable PORTFOLIO_WINDOW_SIZE"),
            }
        }
        if let Some(raw) = lookup("PORTFOLIO_INITIAL_CAPITAL") {
            match raw.parse() {
                Ok(v) => self.environment.initial_capital = v,
                Err(_) => warn!(value = %raw, "ignoring unparseable PORTFOLIO_INITIAL_CAPITAL"),
            }
        }
        if let Some(raw) = lookup("PORTFOLIO_TRANSACTION_COST") {
            match raw.parse() {
                Ok(v) => self.environment.transaction_cost_pct = v,
                Err(_) => warn!(value = %raw, "ignoring unparseable PORTFOLIO_TRANSACTION_COST"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.environment.window_size, 30);
        assert_eq!(config.environment.initial_capital, 100_000.0);
        assert_eq!(config.data.train_fraction, 0.8);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.evaluation.benchmark = None;
        config.to_file(&path).unwrap();

        assert_eq!(AppConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PORTFOLIO_WINDOW_SIZE", "20"),
            ("PORTFOLIO_TRANSACTION_COST", "not-a-number"),
            ("PORTFOLIO_PRICE_FILE", "prices.csv"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.environment.window_size, 20);
        assert_eq!(config.environment.transaction_cost_pct, 0.001);
        assert_eq!(config.data.price_file, "prices.csv");
    }
}
