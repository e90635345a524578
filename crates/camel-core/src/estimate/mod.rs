//! Monte Carlo estimates over the remainder of a leg.
//!
//! This module is composed of:
//! - `rollout`: plays one leg to exhaustion on private clones and tallies results.
//! - `estimator`: batches rollouts in parallel and converts tallies into action values.
//! - `action`: the tagged action keys and the value map handed back to drivers.

mod action;
mod estimator;
mod rollout;

pub use action::{Action, ActionValues};
pub use estimator::{DEFAULT_ROLLOUTS, EstimatorConfig, OutcomeEstimator, roll_value};
pub use rollout::{RolloutOutcome, RolloutTally, play_out_leg};
