//! Running a policy through one episode and summarising the result.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::agent::Policy;
use crate::data::PriceTable;
use crate::environment::{Environment, TerminationReason};
use crate::error::{Error, Result};
use crate::utils::{
    calculate_cumulative_return, calculate_max_drawdown, calculate_sharpe, simple_returns,
};

/// Trajectory of one evaluated episode.
///
/// `timestamps[0]`/`values[0]` come from reset; every step appends one point.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRecord {
    pub policy: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
    pub rewards: Vec<f64>,
    pub costs: Vec<f64>,
    pub termination: Option<TerminationReason>,
}

impl EpisodeRecord {
    fn new(policy: &str, timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            policy: policy.to_string(),
            timestamps: vec![timestamp],
            values: vec![value],
            rewards: Vec::new(),
            costs: Vec::new(),
            termination: None,
        }
    }

    /// Number of steps taken
    pub fn steps(&self) -> usize {
        self.rewards.len()
    }

    pub fn final_value(&self) -> f64 {
        self.values.last().copied().unwrap_or_default()
    }

    /// Performance summary of the trajectory
    pub fn summary(&self, periods_per_year: f64, risk_free_rate: f64) -> PerformanceSummary {
        let returns = simple_returns(&self.values);
        PerformanceSummary {
            policy: self.policy.clone(),
            total_return: calculate_cumulative_return(&self.values),
            sharpe_ratio: calculate_sharpe(&returns, risk_free_rate, periods_per_year),
            max_drawdown: calculate_max_drawdown(&self.values),
            steps: self.steps(),
            final_value: self.final_value(),
            total_costs: self.costs.iter().sum(),
            cumulative_log_reward: self.rewards.iter().sum(),
        }
    }
}

/// Headline performance figures for an episode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub policy: String,
    pub total_return: f64,
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough decline, as a positive fraction
    pub max_drawdown: f64,
    pub steps: usize,
    pub final_value: f64,
    pub total_costs: f64,
    pub cumulative_log_reward: f64,
}

impl std::fmt::Display for PerformanceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Performance ({}):", self.policy)?;
        writeln!(f, "  Total Return:   {:>10.2}%", self.total_return * 100.0)?;
        writeln!(f, "  Sharpe Ratio:   {:>10.2}", self.sharpe_ratio)?;
        writeln!(f, "  Max Drawdown:   {:>10.2}%", -self.max_drawdown * 100.0)?;
        writeln!(f, "  Final Value:    {:>10.2}", self.final_value)?;
        writeln!(f, "  Total Costs:    {:>10.2}", self.total_costs)?;
        write!(f, "  Steps:          {:>10}", self.steps)
    }
}

/// Reset the environment and step `policy` until the episode ends.
pub fn run_episode<E, P>(env: &mut E, policy: &mut P) -> Result<EpisodeRecord>
where
    E: Environment + ?Sized,
    P: Policy + ?Sized,
{
    let (mut observation, info) = env.reset(None);
    let mut record = EpisodeRecord::new(policy.name(), info.timestamp, info.portfolio_value);

    loop {
        let action = policy.act(&observation);
        let result = env.step(&action)?;

        record.timestamps.push(result.info.timestamp);
        record.values.push(result.info.portfolio_value);
        record.rewards.push(result.reward);
        record.costs.push(result.info.transaction_cost);

        if result.done {
            record.termination = result.info.termination_reason;
            break;
        }
        observation = result.observation;
    }

    info!(
        policy = %record.policy,
        steps = record.steps(),
        final_value = record.final_value(),
        "evaluation episode complete"
    );
    Ok(record)
}

/// Value of buying `asset` on the first row of `prices` and holding it, at each of `timestamps`.
///
/// Prices are forward-filled the way alignment fills them, so the curve can be
/// read off at any aligned timestamp. The base is the first available price,
/// which may precede the episode start.
pub fn buy_and_hold_curve(
    prices: &PriceTable,
    asset: usize,
    initial_capital: f64,
    timestamps: &[DateTime<Utc>],
) -> Result<Vec<f64>> {
    let Some(ticker) = prices.tickers().get(asset) else {
        return Err(Error::Configuration(format!(
            "benchmark asset {} out of range for {} assets",
            asset,
            prices.tickers().len()
        )));
    };
    if timestamps.is_empty() {
        return Ok(Vec::new());
    }

    let mut last = None;
    let filled: Vec<Option<f64>> = prices
        .rows()
        .iter()
        .map(|row| {
            if let Some(price) = row[asset].filter(|p| p.is_finite() && *p > 0.0) {
                last = Some(price);
            }
            last
        })
        .collect();
    let base = filled
        .iter()
        .flatten()
        .next()
        .copied()
        .ok_or_else(|| Error::DataAlignment(format!("no prices for benchmark {}", ticker)))?;

    timestamps
        .iter()
        .map(|ts| {
            let price = prices
                .timestamps()
                .binary_search(ts)
                .ok()
                .and_then(|row| filled[row])
                .ok_or_else(|| {
                    Error::DataAlignment(format!("no {} price at {}", ticker, ts))
                })?;
            Ok(initial_capital * price / base)
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct ResultRow {
    timestamp: String,
    portfolio_value: f64,
    reward: Option<f64>,
    benchmark_value: Option<f64>,
}

/// Write the trajectory (and an optional benchmark curve of the same length) as CSV.
pub fn write_results_csv<P: AsRef<Path>>(
    path: P,
    record: &EpisodeRecord,
    benchmark: Option<&[f64]>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for (i, (ts, value)) in record.timestamps.iter().zip(&record.values).enumerate() {
        writer.serialize(ResultRow {
            timestamp: ts.to_rfc3339(),
            portfolio_value: *value,
            reward: i.checked_sub(1).and_then(|j| record.rewards.get(j).copied()),
            benchmark_value: benchmark.and_then(|b| b.get(i).copied()),
        })?;
    }

    writer.flush()?;
    Ok(())
}
