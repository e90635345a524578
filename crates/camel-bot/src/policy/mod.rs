mod baseline;
mod hint;

pub use baseline::{RandomPolicy, RollPolicy};
pub use hint::HintPolicy;

use crate::bot::BotFeatures;
use camel_core::estimate::{Action, ActionValues};
use camel_core::model::dice::DicePool;
use camel_core::model::marker::{MarkerDirection, PlayerId};
use camel_core::model::ticket::Payouts;
use camel_core::model::track::TrackState;
use tracing::{Level, event};

/// What a policy sees when it is asked to act.
pub struct PolicyContext<'a> {
    pub seat: PlayerId,
    pub track: &'a TrackState,
    pub pool: DicePool,
    pub payouts: Payouts,
    pub coins: i32,
    pub leg: u32,
    pub features: BotFeatures,
}

/// The action a policy settled on, plus what it knew when it did.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Action,
    /// Only read for [`Action::PlaceMarker`].
    pub direction: MarkerDirection,
    pub expected_value: Option<f64>,
    pub reason: &'static str,
}

impl Decision {
    pub fn roll(reason: &'static str) -> Self {
        Self {
            action: Action::Roll,
            direction: MarkerDirection::Backward,
            expected_value: None,
            reason,
        }
    }
}

/// Turn-by-turn decision making for one seat.
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    fn choose(&mut self, ctx: &PolicyContext) -> Decision;
}

pub(crate) fn log_decision(
    ctx: &PolicyContext,
    policy: &'static str,
    decision: &Decision,
    values: Option<&ActionValues>,
) {
    if !tracing::enabled!(target: "camel_bot::decision", Level::INFO) {
        return;
    }

    let subject = match decision.action {
        Action::BetOn(color) => color.to_string(),
        Action::PlaceMarker(tile) => format!("{tile}:{}", decision.direction),
        Action::Roll => String::new(),
    };
    let details = match values {
        Some(values) if ctx.features.hint_details() => {
            values.to_string()
        }
        _ => String::new(),
    };

    event!(
        target: "camel_bot::decision",
        Level::INFO,
        seat = %ctx.seat,
        policy,
        leg = ctx.leg,
        coins = ctx.coins,
        pool = %ctx.pool,
        kind = decision.action.kind(),
        subject = %subject,
        expected_value = decision.expected_value,
        reason = decision.reason,
        values = %details,
    );
}
