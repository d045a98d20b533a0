//! Episode termination.

use serde::{Deserialize, Serialize};

/// Episode ends once value falls below this fraction of the initial capital.
pub const DRAWDOWN_STOP_FRACTION: f64 = 0.5;

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The tick index moved past the last row of the frame
    FrameExhausted,
    /// Portfolio value fell below the drawdown stop
    DrawdownStop,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::FrameExhausted => write!(f, "frame exhausted"),
            TerminationReason::DrawdownStop => write!(f, "drawdown stop"),
        }
    }
}

/// Lifecycle of an environment instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    /// Constructed, never reset
    Idle,
    Active,
    Done(TerminationReason),
}

/// Decides whether an episode is over after a value update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminationPolicy {
    last_tick: usize,
    value_floor: f64,
}

impl TerminationPolicy {
    pub fn new(last_tick: usize, initial_capital: f64) -> Self {
        Self {
            last_tick,
            value_floor: initial_capital * DRAWDOWN_STOP_FRACTION,
        }
    }

    pub fn last_tick(&self) -> usize {
        self.last_tick
    }

    pub fn value_floor(&self) -> f64 {
        self.value_floor
    }

    /// First matching condition wins: frame exhaustion, then the drawdown stop.
    pub fn evaluate(&self, tick: usize, portfolio_value: f64) -> Option<TerminationReason> {
        if tick > self.last_tick {
            Some(TerminationReason::FrameExhausted)
        } else if portfolio_value < self.value_floor {
            Some(TerminationReason::DrawdownStop)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_within_frame() {
        let policy = TerminationPolicy::new(99, 100_000.0);
        assert_eq!(policy.evaluate(99, 100_000.0), None);
        assert_eq!(policy.evaluate(50, 50_000.0), None);
    }

    #[test]
    fn test_frame_exhaustion_takes_precedence() {
        let policy = TerminationPolicy::new(99, 100_000.0);
        assert_eq!(
            policy.evaluate(100, 10_000.0),
            Some(TerminationReason::FrameExhausted)
        );
    }

    #[test]
    fn test_drawdown_stop() {
        let policy = TerminationPolicy::new(99, 100_000.0);
        assert_eq!(
            policy.evaluate(10, 49_999.99),
            Some(TerminationReason::DrawdownStop)
        );
        assert_eq!(policy.value_floor(), 50_000.0);
    }
}
