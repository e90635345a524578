use super::{Decision, Policy, PolicyContext, log_decision};
use crate::bot::legal_actions;
use camel_core::model::marker::MarkerDirection;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Always rolls. The reference seat in bench comparisons.
#[derive(Debug, Default, Clone, Copy)]
pub struct RollPolicy;

impl Policy for RollPolicy {
    fn name(&self) -> &'static str {
        "roll"
    }

    fn choose(&mut self, ctx: &PolicyContext) -> Decision {
        let decision = Decision::roll("always_roll");
        log_decision(ctx, self.name(), &decision, None);
        decision
    }
}

/// Uniform pick among the legal actions.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose(&mut self, ctx: &PolicyContext) -> Decision {
        let actions = legal_actions(ctx.track, ctx.pool, &ctx.payouts);
        let decision = match actions.choose(&mut self.rng) {
            Some(action) => Decision {
                action: *action,
                direction: if self.rng.gen_bool(0.5) {
                    MarkerDirection::Forward
                } else {
                    MarkerDirection::Backward
                },
                expected_value: None,
                reason: "uniform_random",
            },
            None => Decision::roll("no_legal_action"),
        };
        log_decision(ctx, self.name(), &decision, None);
        decision
    }
}
