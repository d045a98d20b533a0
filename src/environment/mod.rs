//! Portfolio allocation environment implementing a Gym-like reset/step interface.

mod allocation;
mod costs;
mod observation;
mod portfolio;
mod portfolio_env;
mod termination;
mod traits;

pub use allocation::{softmax, AllocationMapper, Softmax, MIN_WEIGHT};
pub use costs::{turnover, TransactionCostModel};
pub use observation::{build_observation, observation_size, Observation};
pub use portfolio::{gross_returns, log_reward, update_value, PortfolioState, ValueUpdate};
pub use portfolio_env::{EpisodeConfig, PortfolioEnv, StepInfo, StepResult};
pub use termination::{
    EpisodePhase, TerminationPolicy, TerminationReason, DRAWDOWN_STOP_FRACTION,
};
pub use traits::Environment;
