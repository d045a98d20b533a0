//! Observation vector construction.
//!
//! Layout, in order:
//! 1. the `window_size × n_assets` price window `[t - window_size, t)`, each
//!    asset divided by its price on the first window row, flattened row-major;
//! 2. the current weights (`n_assets`);
//! 3. the sentiment at `t - 1`.

use ndarray::{s, Array1, ArrayView1};

use crate::data::AlignedFrame;

/// Observation handed to the policy; `f32` matches the learner's input dtype.
pub type Observation = Array1<f32>;

/// Observation length for a window and asset count.
pub fn observation_size(window_size: usize, n_assets: usize) -> usize {
    window_size * n_assets + n_assets + 1
}

/// Build the observation for `tick`. Requires `window_size <= tick <= frame.len()`.
pub fn build_observation(
    frame: &AlignedFrame,
    tick: usize,
    window_size: usize,
    weights: ArrayView1<'_, f64>,
) -> Observation {
    debug_assert!(window_size > 0 && window_size <= tick && tick <= frame.len());

    let n_assets = frame.asset_count();
    let mut values = Vec::with_capacity(observation_size(window_size, n_assets));

    let window = frame.prices().slice(s![tick - window_size..tick, ..]);
    let base = window.row(0);
    for row in window.rows() {
        values.extend(row.iter().zip(base.iter()).map(|(p, b)| (p / b) as f32));
    }

    values.extend(weights.iter().map(|&w| w as f32));
    values.push(frame.sentiment_at(tick - 1) as f32);

    Array1::from(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use ndarray::{array, Array2};

    fn frame() -> AlignedFrame {
        let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        AlignedFrame::new(
            vec!["A".to_string(), "B".to_string()],
            (0..4).map(|i| start + Duration::days(i)).collect(),
            Array2::from_shape_vec((4, 2), vec![10.0, 20.0, 11.0, 25.0, 12.0, 30.0, 13.0, 35.0])
                .unwrap(),
            array![0.1, 0.2, 0.3, 0.4],
        )
        .unwrap()
    }

    #[test]
    fn test_observation_layout() {
        let weights = array![0.25, 0.75];
        let obs = build_observation(&frame(), 3, 2, weights.view());

        assert_eq!(obs.len(), observation_size(2, 2));
        let expected: Vec<f32> = vec![1.0, 1.0, 12.0 / 11.0, 30.0 / 25.0, 0.25, 0.75, 0.3];
        for (got, want) in obs.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6, "{got} != {want}");
        }
    }

    #[test]
    fn test_observation_at_end_of_frame() {
        let weights = array![0.5, 0.5];
        let obs = build_observation(&frame(), 4, 3, weights.view());
        assert_eq!(obs.len(), 9);
        assert_eq!(obs[0], 1.0);
        assert!((obs[8] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_observation_size_formula() {
        assert_eq!(observation_size(30, 3), 94);
    }
}
