//! Environment trait definition.

use crate::environment::{Observation, StepInfo, StepResult};
use crate::error::Result;

/// Reset/step contract consumed by learning and evaluation drivers.
pub trait Environment {
    /// Start a new episode, returning the first observation and its info
    fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo);

    /// Apply one action and advance one tick
    fn step(&mut self, action: &[f64]) -> Result<StepResult>;

    /// Length of every observation
    fn observation_size(&self) -> usize;

    /// Length of every action
    fn action_size(&self) -> usize;
}
