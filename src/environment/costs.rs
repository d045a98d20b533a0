//! Turnover-proportional transaction costs.

use ndarray::ArrayView1;

/// L1 distance between consecutive weight vectors, in [0, 2].
pub fn turnover(previous: ArrayView1<'_, f64>, target: ArrayView1<'_, f64>) -> f64 {
    previous
        .iter()
        .zip(target.iter())
        .map(|(p, t)| (t - p).abs())
        .sum()
}

/// Charges `value_before * turnover * pct` once per rebalance, whichever way it trades.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionCostModel {
    pct: f64,
}

impl TransactionCostModel {
    pub fn new(pct: f64) -> Self {
        Self { pct }
    }

    pub fn pct(&self) -> f64 {
        self.pct
    }

    pub fn cost(&self, value_before: f64, turnover: f64) -> f64 {
        value_before * turnover * self.pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_initial_deployment_cost() {
        let previous = array![0.0, 0.0, 0.0];
        let target = array![1.0, 0.0, 0.0];
        let t = turnover(previous.view(), target.view());
        assert_eq!(t, 1.0);

        let model = TransactionCostModel::new(0.001);
        assert_abs_diff_eq!(model.cost(100_000.0, t), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_full_rotation_turnover_is_two() {
        let previous = array![1.0, 0.0];
        let target = array![0.0, 1.0];
        assert_eq!(turnover(previous.view(), target.view()), 2.0);
    }

    #[test]
    fn test_no_rebalance_is_free() {
        let weights = array![0.2, 0.3, 0.5];
        let t = turnover(weights.view(), weights.view());
        assert_eq!(t, 0.0);
        assert_eq!(TransactionCostModel::new(0.01).cost(50_000.0, t), 0.0);
    }
}
