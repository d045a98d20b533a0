//! Baseline allocation policies.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agent::Policy;
use crate::environment::Observation;

/// Logit given to the held asset by [`SingleAsset`]; leaves ~1e-9 on every other asset.
pub const HOLD_LOGIT: f64 = 20.0;

/// Uniform allocation across all assets.
#[derive(Debug, Clone)]
pub struct EqualWeight {
    n_assets: usize,
}

impl EqualWeight {
    pub fn new(n_assets: usize) -> Self {
        Self { n_assets }
    }
}

impl Policy for EqualWeight {
    fn act(&mut self, _observation: &Observation) -> Vec<f64> {
        vec![0.0; self.n_assets]
    }

    fn name(&self) -> &str {
        "equal-weight"
    }
}

/// Near-total allocation to one asset (a buy-and-hold proxy).
#[derive(Debug, Clone)]
pub struct SingleAsset {
    n_assets: usize,
    index: usize,
}

impl SingleAsset {
    /// `index` is clamped to the last asset.
    pub fn new(n_assets: usize, index: usize) -> Self {
        Self {
            n_assets,
            index: index.min(n_assets.saturating_sub(1)),
        }
    }
}

impl Policy for SingleAsset {
    fn act(&mut self, _observation: &Observation) -> Vec<f64> {
        let mut logits = vec![0.0; self.n_assets];
        if let Some(logit) = logits.get_mut(self.index) {
            *logit = HOLD_LOGIT;
        }
        logits
    }

    fn name(&self) -> &str {
        "single-asset"
    }
}

/// Shifts weight from a haven asset to a risk asset when sentiment is positive, and back
/// when it is negative.
///
/// Reads the sentiment from the last observation entry.
#[derive(Debug, Clone)]
pub struct SentimentTilt {
    n_assets: usize,
    risk_asset: usize,
    haven_asset: usize,
    strength: f64,
}

impl SentimentTilt {
    pub fn new(n_assets: usize, risk_asset: usize, haven_asset: usize, strength: f64) -> Self {
        Self {
            n_assets,
            risk_asset,
            haven_asset,
            strength,
        }
    }
}

impl Policy for SentimentTilt {
    fn act(&mut self, observation: &Observation) -> Vec<f64> {
        let sentiment = observation
            .len()
            .checked_sub(1)
            .map_or(0.0, |i| f64::from(observation[i]));
        let mut logits = vec![0.0; self.n_assets];
        if let Some(logit) = logits.get_mut(self.risk_asset) {
            *logit += self.strength * sentiment;
        }
        if let Some(logit) = logits.get_mut(self.haven_asset) {
            *logit -= self.strength * sentiment;
        }
        logits
    }

    fn name(&self) -> &str {
        "sentiment-tilt"
    }
}

/// Uniform random logits in [-1, 1), reproducible for a given seed.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    n_assets: usize,
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(n_assets: usize, seed: u64) -> Self {
        Self {
            n_assets,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &Observation) -> Vec<f64> {
        (0..self.n_assets)
            .map(|_| self.rng.gen_range(-1.0..1.0))
            .collect()
    }

    fn name(&self) -> &str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::softmax;
    use ndarray::{array, Array1};

    #[test]
    fn test_single_asset_concentrates_weight() {
        let mut policy = SingleAsset::new(3, 1);
        let logits = Array1::from(policy.act(&Observation::zeros(4)));
        let weights = softmax(logits.view());
        assert!(weights[1] > 0.999_999);
    }

    #[test]
    fn test_sentiment_tilt_direction() {
        let mut policy = SentimentTilt::new(2, 0, 1, 2.0);
        let logits = policy.act(&array![1.0f32, 1.0, 0.5, 0.5, -0.5]);
        assert!(logits[0] < 0.0);
        assert!(logits[1] > 0.0);
    }

    #[test]
    fn test_random_policy_is_reproducible() {
        let obs = Observation::zeros(4);
        let mut a = RandomPolicy::new(3, 42);
        let mut b = RandomPolicy::new(3, 42);
        for _ in 0..10 {
            let action = a.act(&obs);
            assert_eq!(action, b.act(&obs));
            assert!(action.iter().all(|x| (-1.0..1.0).contains(x)));
        }
    }
}
