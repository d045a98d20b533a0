//! Policy trait definition.

use crate::environment::Observation;

/// Anything that maps an observation to an action vector.
///
/// The environment accepts unconstrained logits, so policies need not
/// produce valid weights themselves.
pub trait Policy {
    /// Produce an action (one logit per asset) for the observation
    fn act(&mut self, observation: &Observation) -> Vec<f64>;

    /// Get policy name
    fn name(&self) -> &str;
}
