//! Portfolio allocation environment implementation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data::{AlignedFrame, PriceTable, SentimentSeries};
use crate::environment::{
    build_observation, gross_returns, observation_size, turnover, update_value, AllocationMapper,
    Environment, EpisodePhase, Observation, PortfolioState, Softmax, TerminationPolicy,
    TerminationReason, TransactionCostModel,
};
use crate::error::{Error, Result};

/// Episode configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeConfig {
    /// Number of trailing ticks in each observation
    pub window_size: usize,
    /// Starting portfolio value
    pub initial_capital: f64,
    /// Cost per unit of turnover (0.001 = 0.1%)
    pub transaction_cost_pct: f64,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            window_size: 30,
            initial_capital: 100_000.0,
            transaction_cost_pct: 0.001,
        }
    }
}

impl EpisodeConfig {
    /// Check the frame-independent parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::Configuration(
                "window_size must be positive".to_string(),
            ));
        }
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(Error::Configuration(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !(0.0..1.0).contains(&self.transaction_cost_pct) {
            return Err(Error::Configuration(format!(
                "transaction_cost_pct must be in [0, 1), got {}",
                self.transaction_cost_pct
            )));
        }
        Ok(())
    }
}

/// Additional information returned with every observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Portfolio value after the step
    pub portfolio_value: f64,
    /// Weights after the step
    pub weights: Array1<f64>,
    /// Timestamp of the current tick (clamped to the last row once the frame is exhausted)
    pub timestamp: DateTime<Utc>,
    /// Current tick index
    pub tick: usize,
    /// Turnover traded this step
    pub turnover: f64,
    /// Transaction cost charged this step
    pub transaction_cost: f64,
    /// Set on the step that ends the episode
    pub termination_reason: Option<TerminationReason>,
}

/// Step result returned by the environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Observation for the new tick
    pub observation: Observation,
    /// ln(value after / value before)
    pub reward: f64,
    /// Whether the episode has ended
    pub done: bool,
    /// Always false: time limits are not distinguished from termination
    pub truncated: bool,
    /// Additional info
    pub info: StepInfo,
}

/// Portfolio allocation environment over an aligned price/sentiment frame.
///
/// The frame is shared read-only; each instance owns its portfolio state.
#[derive(Debug, Clone)]
pub struct PortfolioEnv<M = Softmax> {
    frame: Arc<AlignedFrame>,
    config: EpisodeConfig,
    mapper: M,
    costs: TransactionCostModel,
    termination: TerminationPolicy,
    state: PortfolioState,
    phase: EpisodePhase,
}

impl PortfolioEnv<Softmax> {
    /// Create an environment over an aligned frame with softmax allocation.
    pub fn new(frame: Arc<AlignedFrame>, config: EpisodeConfig) -> Result<Self> {
        Self::with_mapper(frame, config, Softmax)
    }

    /// Align raw prices and sentiment, then create the environment.
    ///
    /// A window that cannot fit the raw price table is a configuration error;
    /// one that only fails because alignment dropped rows is an alignment error.
    pub fn from_tables(
        prices: &PriceTable,
        sentiment: &SentimentSeries,
        config: EpisodeConfig,
    ) -> Result<Self> {
        config.validate()?;
        if config.window_size >= prices.len() {
            return Err(Error::Configuration(format!(
                "window_size {} must be smaller than the {} price rows",
                config.window_size,
                prices.len()
            )));
        }

        let frame = AlignedFrame::align(prices, sentiment)?;
        if frame.len() < config.window_size + 1 {
            return Err(Error::DataAlignment(format!(
                "{} usable rows after alignment, need at least {}",
                frame.len(),
                config.window_size + 1
            )));
        }

        Self::new(Arc::new(frame), config)
    }
}

impl<M: AllocationMapper> PortfolioEnv<M> {
    /// Create an environment with a custom allocation mapper.
    pub fn with_mapper(frame: Arc<AlignedFrame>, config: EpisodeConfig, mapper: M) -> Result<Self> {
        config.validate()?;
        let last_tick = match frame.last_tick() {
            Some(last) if config.window_size <= last => last,
            _ => {
                return Err(Error::Configuration(format!(
                    "window_size {} must be smaller than the frame length {}",
                    config.window_size,
                    frame.len()
                )))
            }
        };

        Ok(Self {
            costs: TransactionCostModel::new(config.transaction_cost_pct),
            termination: TerminationPolicy::new(last_tick, config.initial_capital),
            state: PortfolioState::initial(
                config.window_size,
                config.initial_capital,
                frame.asset_count(),
            ),
            phase: EpisodePhase::Idle,
            frame,
            config,
            mapper,
        })
    }

    pub fn config(&self) -> &EpisodeConfig {
        &self.config
    }

    pub fn frame(&self) -> &Arc<AlignedFrame> {
        &self.frame
    }

    pub fn tickers(&self) -> &[String] {
        self.frame.tickers()
    }

    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, EpisodePhase::Done(_))
    }

    /// First tick of every episode.
    pub fn start_tick(&self) -> usize {
        self.config.window_size
    }

    fn observation(&self) -> Observation {
        build_observation(
            &self.frame,
            self.state.tick,
            self.config.window_size,
            self.state.weights.view(),
        )
    }

    fn info(
        &self,
        turnover: f64,
        transaction_cost: f64,
        termination_reason: Option<TerminationReason>,
    ) -> StepInfo {
        let safe_tick = self.state.tick.min(self.termination.last_tick());
        StepInfo {
            portfolio_value: self.state.portfolio_value,
            weights: self.state.weights.clone(),
            timestamp: self.frame.timestamp(safe_tick),
            tick: self.state.tick,
            turnover,
            transaction_cost,
            termination_reason,
        }
    }

    fn check_action(&self, action: &[f64]) -> Result<()> {
        if action.len() != self.frame.asset_count() {
            return Err(Error::InvalidAction(format!(
                "expected {} components, got {}",
                self.frame.asset_count(),
                action.len()
            )));
        }
        if let Some(i) = action.iter().position(|a| !a.is_finite()) {
            return Err(Error::InvalidAction(format!(
                "component {} is not finite ({})",
                i, action[i]
            )));
        }
        Ok(())
    }
}

impl<M: AllocationMapper> Environment for PortfolioEnv<M> {
    fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo) {
        self.state = PortfolioState::initial(
            self.config.window_size,
            self.config.initial_capital,
            self.frame.asset_count(),
        );
        self.phase = EpisodePhase::Active;

        debug!(
            ?seed,
            tick = self.state.tick,
            value = self.state.portfolio_value,
            "environment reset"
        );

        (self.observation(), self.info(0.0, 0.0, None))
    }

    fn step(&mut self, action: &[f64]) -> Result<StepResult> {
        match self.phase {
            EpisodePhase::Active => {}
            EpisodePhase::Idle => {
                return Err(Error::InvalidCall(
                    "step() called before reset()".to_string(),
                ))
            }
            EpisodePhase::Done(reason) => {
                return Err(Error::InvalidCall(format!(
                    "step() called after the episode ended ({})",
                    reason
                )))
            }
        }
        self.check_action(action)?;

        let old_value = self.state.portfolio_value;
        let target = self.mapper.allocate(ArrayView1::from(action));
        let turnover = turnover(self.state.weights.view(), target.view());
        let cost = self.costs.cost(old_value, turnover);
        self.state.weights = target;

        let tick = self.state.tick;
        let gross = gross_returns(self.frame.price_row(tick - 1), self.frame.price_row(tick));
        let update = update_value(old_value, self.state.weights.view(), gross.view(), cost);
        if update.value <= 0.0 {
            warn!(tick, value = update.value, "portfolio value is no longer positive");
        }
        self.state.portfolio_value = update.value;

        self.state.tick += 1;
        let termination = self
            .termination
            .evaluate(self.state.tick, self.state.portfolio_value);

        debug!(
            tick = self.state.tick,
            value = self.state.portfolio_value,
            turnover,
            cost,
            reward = update.reward,
            "environment step"
        );

        if let Some(reason) = termination {
            self.phase = EpisodePhase::Done(reason);
            info!(
                %reason,
                tick = self.state.tick,
                final_value = self.state.portfolio_value,
                "episode finished"
            );
        }

        Ok(StepResult {
            observation: self.observation(),
            reward: update.reward,
            done: termination.is_some(),
            truncated: false,
            info: self.info(turnover, cost, termination),
        })
    }

    fn observation_size(&self) -> usize {
        observation_size(self.config.window_size, self.frame.asset_count())
    }

    fn action_size(&self) -> usize {
        self.frame.asset_count()
    }
}
