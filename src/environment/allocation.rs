//! Mapping of unconstrained actions onto portfolio weights.

use ndarray::{Array1, ArrayView1};

/// Smallest weight a mapper may hand out; keeps every allocation strictly positive.
pub const MIN_WEIGHT: f64 = f64::MIN_POSITIVE;

/// Converts a real-valued action vector into weights on the probability simplex.
///
/// Implementations must return one strictly positive weight per action
/// component, summing to 1.
pub trait AllocationMapper {
    fn allocate(&self, action: ArrayView1<'_, f64>) -> Array1<f64>;
}

/// Numerically stabilised softmax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Softmax;

impl AllocationMapper for Softmax {
    fn allocate(&self, action: ArrayView1<'_, f64>) -> Array1<f64> {
        softmax(action)
    }
}

/// Softmax with max subtraction.
///
/// Components that underflow to zero are lifted to [`MIN_WEIGHT`] before
/// normalising, so extreme inputs still map to a strictly positive allocation.
pub fn softmax(x: ArrayView1<'_, f64>) -> Array1<f64> {
    let max = x.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let mut weights = x.mapv(|v| (v - max).exp());
    if weights.iter().any(|&w| w <= 0.0) {
        weights.mapv_inplace(|w| w.max(MIN_WEIGHT));
    }
    let total = weights.sum();
    weights / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn assert_simplex(weights: &Array1<f64>) {
        assert!(weights.iter().all(|&w| w > 0.0), "non-positive weight in {weights}");
        assert_abs_diff_eq!(weights.sum(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_softmax_uniform_for_equal_inputs() {
        let weights = softmax(array![3.0, 3.0, 3.0, 3.0].view());
        for &w in weights.iter() {
            assert_abs_diff_eq!(w, 0.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_softmax_matches_reference_values() {
        let weights = softmax(array![1.0, 2.0, 3.0].view());
        assert_abs_diff_eq!(weights[0], 0.09003057317038046, epsilon = 1e-12);
        assert_abs_diff_eq!(weights[1], 0.24472847105479764, epsilon = 1e-12);
        assert_abs_diff_eq!(weights[2], 0.6652409557748219, epsilon = 1e-12);
    }

    #[test]
    fn test_softmax_extreme_inputs_stay_positive() {
        let weights = softmax(array![1e308, -1e308, 0.0].view());
        assert_simplex(&weights);
        assert_abs_diff_eq!(weights[0], 1.0, epsilon = 1e-12);

        let weights = softmax(array![-5000.0, 0.0].view());
        assert_simplex(&weights);
    }

    #[test]
    fn test_softmax_single_asset() {
        let weights = softmax(array![-42.0].view());
        assert_eq!(weights.to_vec(), vec![1.0]);
    }

    #[test]
    fn test_softmax_random_actions_are_simplex() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let n = rng.gen_range(1..12);
            let scale = 10f64.powi(rng.gen_range(0..6));
            let action: Array1<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0) * scale).collect();
            assert_simplex(&Softmax.allocate(action.view()));
        }
    }
}
