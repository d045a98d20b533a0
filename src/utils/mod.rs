//! Utility functions and helpers.

mod config;
mod metrics;

pub use config::{AppConfig, DataConfig, EvaluationConfig};
pub use metrics::{
    calculate_cumulative_return, calculate_max_drawdown, calculate_sharpe, simple_returns,
};
