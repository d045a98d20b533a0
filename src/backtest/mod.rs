//! Policy evaluation over full episodes.

mod episode;

pub use episode::{
    buy_and_hold_curve, run_episode, write_results_csv, EpisodeRecord, PerformanceSummary,
};
