//! # Rust Sentiment Portfolio
//!
//! A deterministic portfolio-allocation environment over historical prices
//! augmented with a news-sentiment signal, for training and evaluating
//! reinforcement learning agents.
//!
//! ## Modules
//!
//! - `environment` - Episode controller with a Gym-like reset/step interface
//! - `data` - Price/sentiment loading and alignment
//! - `sentiment` - Headline scoring
//! - `agent` - Baseline allocation policies
//! - `backtest` - Episode evaluation and reporting
//! - `utils` - Configuration and performance metrics

pub mod agent;
pub mod backtest;
pub mod data;
pub mod environment;
pub mod error;
pub mod sentiment;
pub mod utils;

pub use agent::Policy;
pub use data::{AlignedFrame, PriceTable, SentimentSeries};
pub use environment::{
    Environment, EpisodeConfig, Observation, PortfolioEnv, StepInfo, StepResult,
};
pub use error::{Error, Result};
