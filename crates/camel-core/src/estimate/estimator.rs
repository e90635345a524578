use super::action::{Action, ActionValues};
use super::rollout::{RolloutTally, play_out_leg};
use crate::model::color::Color;
use crate::model::dice::DicePool;
use crate::model::ticket::Payouts;
use crate::model::track::TrackState;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use tracing::{Level, event};

pub const DEFAULT_ROLLOUTS: u32 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorConfig {
    pub rollouts: u32,
    /// Rollout `i` is seeded with `seed + i`.
    pub seed: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            rollouts: DEFAULT_ROLLOUTS,
            seed: 0,
        }
    }
}

/// Monte Carlo estimate of the rest of a leg.
///
/// Every rollout plays a private copy of the board until the dice pool is empty
/// and records the final top two plus where moved camels came to rest. The
/// counts are turned into expected coin values for betting, placing a marker
/// and rolling. The conversions are coarse on purpose: they rank actions
/// against each other rather than predict exact earnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeEstimator {
    config: EstimatorConfig,
}

impl OutcomeEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            config: EstimatorConfig {
                rollouts: config.rollouts.max(1),
                ..config
            },
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(EstimatorConfig {
            seed,
            ..EstimatorConfig::default()
        })
    }

    pub fn config(&self) -> EstimatorConfig {
        self.config
    }

    /// Runs every rollout and sums the counts. The total does not depend on how
    /// rayon splits the work.
    pub fn run(&self, track: &TrackState, pool: DicePool) -> RolloutTally {
        let length = track.length();
        let seed = self.config.seed;
        (0..self.config.rollouts)
            .into_par_iter()
            .map(|i| {
                let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(u64::from(i)));
                play_out_leg(track, pool, &mut rng)
            })
            .fold(
                || RolloutTally::new(length),
                |mut tally, outcome| {
                    tally.record(&outcome);
                    tally
                },
            )
            .reduce(|| RolloutTally::new(length), RolloutTally::merge)
    }

    pub fn evaluate(
        &self,
        tally: &RolloutTally,
        track: &TrackState,
        pool: DicePool,
        payouts: &Payouts,
    ) -> ActionValues {
        let mut values = ActionValues::new();
        for color in Color::REGULAR {
            values.insert(Action::BetOn(color), bet_value(tally, color, payouts.top(color)));
        }
        if let Some((tile, value)) = marker_value(tally, track) {
            values.insert(Action::PlaceMarker(tile), value);
        }
        values.insert(Action::Roll, roll_value(pool));
        values
    }

    pub fn estimate(&self, track: &TrackState, pool: DicePool, payouts: &Payouts) -> ActionValues {
        let tally = self.run(track, pool);
        let values = self.evaluate(&tally, track, pool, payouts);

        if tracing::enabled!(target: "camel_core::estimate", Level::DEBUG) {
            let best = values.best();
            event!(
                target: "camel_core::estimate",
                Level::DEBUG,
                rollouts = tally.rollouts(),
                seed = self.config.seed,
                pool = %pool,
                best_action = best.map(|(action, _)| action.kind()).unwrap_or("none"),
                best_value = best.map(|(_, value)| value).unwrap_or(0.0),
                values = %values,
            );
        }
        values
    }
}

fn bet_value(tally: &RolloutTally, color: Color, top: i32) -> f64 {
    let rollouts = tally.rollouts();
    if top == 0 || rollouts == 0 {
        return 0.0;
    }
    let first = f64::from(tally.first_count(color));
    let second = f64::from(tally.second_count(color));
    let rest = f64::from(rollouts) - first - second;
    (first * f64::from(top) + second - rest) / f64::from(rollouts)
}

fn marker_value(tally: &RolloutTally, track: &TrackState) -> Option<(usize, f64)> {
    let rollouts = tally.rollouts();
    if rollouts == 0 {
        return None;
    }
    let mut best: Option<(usize, u32)> = None;
    for tile in track.empty_tiles() {
        let visits = tally.visit_count(tile);
        match best {
            Some((_, top)) if visits <= top => {}
            _ => best = Some((tile, visits)),
        }
    }
    match best {
        Some((tile, visits)) if visits > 0 => {
            Some((tile, f64::from(visits) / f64::from(rollouts)))
        }
        _ => None,
    }
}

/// Value of rolling now. Each undrawn regular die counts as a point, an undrawn
/// crazy die costs two, and the ratio is cut (not rounded) to two decimals.
pub fn roll_value(pool: DicePool) -> f64 {
    let undrawn = pool.len() as i64;
    if undrawn == 0 {
        return 0.0;
    }
    let mut good = pool.regular_count() as i64;
    if pool.has_crazy() {
        good -= 2;
    }
    let hundredths = good * 100 / undrawn;
    hundredths as f64 / 100.0
}
