//! Allocation policies that drive the environment.

mod baselines;
mod traits;

pub use baselines::{EqualWeight, RandomPolicy, SentimentTilt, SingleAsset, HOLD_LOGIT};
pub use traits::Policy;
