//! Portfolio state and value updates.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Mutable per-episode portfolio state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    /// Current tick in the frame
    pub tick: usize,
    /// Portfolio value in account currency
    pub portfolio_value: f64,
    /// Weights after the most recent allocation (all zero before the first one)
    pub weights: Array1<f64>,
}

impl PortfolioState {
    /// Fresh state: undeployed capital at `tick`.
    pub fn initial(tick: usize, initial_capital: f64, n_assets: usize) -> Self {
        Self {
            tick,
            portfolio_value: initial_capital,
            weights: Array1::zeros(n_assets),
        }
    }
}

/// Outcome of advancing the portfolio by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueUpdate {
    /// Value after returns and costs
    pub value: f64,
    /// Gross portfolio return ratio (weights · price relatives)
    pub return_ratio: f64,
    /// ln(new value / old value)
    pub reward: f64,
}

/// Per-asset price relatives `current / previous`.
pub fn gross_returns(previous: ArrayView1<'_, f64>, current: ArrayView1<'_, f64>) -> Array1<f64> {
    &current / &previous
}

/// Log-return reward.
pub fn log_reward(old_value: f64, new_value: f64) -> f64 {
    (new_value / old_value).ln()
}

/// Grow `old_value` by the weighted price relatives and subtract the transaction cost.
pub fn update_value(
    old_value: f64,
    weights: ArrayView1<'_, f64>,
    gross: ArrayView1<'_, f64>,
    transaction_cost: f64,
) -> ValueUpdate {
    let return_ratio = weights.dot(&gross);
    let value = old_value * return_ratio - transaction_cost;

    ValueUpdate {
        value,
        return_ratio,
        reward: log_reward(old_value, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_log_reward_one_percent() {
        assert_abs_diff_eq!(log_reward(100_000.0, 101_000.0), 0.00995033, epsilon = 1e-6);
    }

    #[test]
    fn test_update_value_weighted_returns() {
        let prev = array![100.0, 50.0];
        let curr = array![110.0, 45.0];
        let gross = gross_returns(prev.view(), curr.view());
        assert_abs_diff_eq!(gross[0], 1.1, epsilon = 1e-12);
        assert_abs_diff_eq!(gross[1], 0.9, epsilon = 1e-12);

        let weights = array![0.5, 0.5];
        let update = update_value(1_000.0, weights.view(), gross.view(), 2.0);
        assert_abs_diff_eq!(update.return_ratio, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(update.value, 998.0, epsilon = 1e-9);
        assert_abs_diff_eq!(update.reward, (0.998f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_initial_state_is_undeployed() {
        let state = PortfolioState::initial(30, 100_000.0, 3);
        assert_eq!(state.tick, 30);
        assert_eq!(state.weights.to_vec(), vec![0.0; 3]);
    }
}
