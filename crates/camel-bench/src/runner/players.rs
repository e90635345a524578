use camel_bot::{BotParams, HintPolicy, Policy, RandomPolicy, RollPolicy};

use crate::config::{PlayerConfig, Strategy};

/// A configured player, ready to spawn a fresh policy for each game.
pub(super) struct PlayerBlueprint {
    pub(super) name: String,
    implementation: PlayerImplementation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PlayerImplementation {
    Hint(BotParams),
    Roll,
    Random { seed_offset: u64 },
}

impl PlayerBlueprint {
    pub(super) fn from_configs(configs: &[PlayerConfig], default_rollouts: u32) -> Vec<Self> {
        configs
            .iter()
            .map(|config| Self::from_config(config, default_rollouts))
            .collect()
    }

    fn from_config(config: &PlayerConfig, default_rollouts: u32) -> Self {
        let implementation = match config.strategy {
            Strategy::Hint {
                rollouts,
                marker_direction,
                min_edge,
            } => {
                let defaults = BotParams::default();
                PlayerImplementation::Hint(BotParams {
                    rollouts: rollouts.unwrap_or(default_rollouts),
                    marker_direction: marker_direction.unwrap_or(defaults.marker_direction),
                    min_edge: min_edge.unwrap_or(defaults.min_edge),
                })
            }
            Strategy::Roll => PlayerImplementation::Roll,
            Strategy::Random { seed_offset } => PlayerImplementation::Random { seed_offset },
        };

        Self {
            name: config.name.clone(),
            implementation,
        }
    }

    pub(super) fn spawn_policy(&self, seed: u64) -> Box<dyn Policy> {
        match self.implementation {
            PlayerImplementation::Hint(params) => Box::new(HintPolicy::new(params, seed)),
            PlayerImplementation::Roll => Box::new(RollPolicy),
            PlayerImplementation::Random { seed_offset } => {
                Box::new(RandomPolicy::with_seed(seed.wrapping_add(seed_offset)))
            }
        }
    }
}
