use super::{Decision, Policy, PolicyContext, log_decision};
use crate::bot::{BotParams, is_legal};
use camel_core::estimate::{Action, ActionValues, EstimatorConfig, OutcomeEstimator};

/// Asks the estimator for action values and takes the best legal one.
pub struct HintPolicy {
    params: BotParams,
    seed: u64,
    decisions: u64,
}

impl HintPolicy {
    pub fn new(params: BotParams, seed: u64) -> Self {
        Self {
            params,
            seed,
            decisions: 0,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(BotParams::default(), seed)
    }

    pub fn params(&self) -> &BotParams {
        &self.params
    }

    /// Each decision gets a fresh block of rollout seeds.
    fn next_estimator(&mut self) -> OutcomeEstimator {
        let stride = u64::from(self.params.rollouts.max(1));
        let seed = self
            .seed
            .wrapping_add(self.decisions.wrapping_mul(stride));
        self.decisions += 1;
        OutcomeEstimator::new(EstimatorConfig {
            rollouts: self.params.rollouts,
            seed,
        })
    }

    /// Estimated values restricted to what the seat may legally do.
    pub fn hint(&mut self, ctx: &PolicyContext) -> ActionValues {
        let estimator = self.next_estimator();
        let values = estimator.estimate(ctx.track, ctx.pool, &ctx.payouts);
        let mut legal = ActionValues::new();
        for (action, value) in values.iter() {
            if is_legal(action, ctx.track, ctx.pool, &ctx.payouts) {
                legal.insert(action, value);
            }
        }
        legal
    }
}

impl Policy for HintPolicy {
    fn name(&self) -> &'static str {
        "hint"
    }

    fn choose(&mut self, ctx: &PolicyContext) -> Decision {
        let values = self.hint(ctx);
        let decision = match values.best() {
            Some((action, value)) if action == Action::Roll || value >= self.params.min_edge => {
                Decision {
                    action,
                    direction: self.params.marker_direction,
                    expected_value: Some(value),
                    reason: "best_expected_value",
                }
            }
            Some(_) if !ctx.pool.is_empty() => Decision {
                expected_value: values.get(Action::Roll),
                ..Decision::roll("below_min_edge")
            },
            _ => Decision::roll("no_legal_hint"),
        };
        log_decision(ctx, self.name(), &decision, Some(&values));
        decision
    }
}
