mod legal;

pub use legal::{is_legal, legal_actions};

use camel_core::estimate::DEFAULT_ROLLOUTS;
use camel_core::model::marker::MarkerDirection;
/// Environment toggles shared by every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotFeatures {
    hint_details: bool,
}

impl BotFeatures {
    pub const fn new(hint_details: bool) -> Self {
        Self { hint_details }
    }

    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub const fn hint_details(self) -> bool {
        self.hint_details
    }

    pub fn with_hint_details(mut self, enabled: bool) -> Self {
        self.hint_details = enabled;
        self
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let hint_details = read("CAMEL_HINT_DETAILS")
            .map(|raw| is_truthy(&raw))
            .unwrap_or(false);
        Self { hint_details }
    }
}

impl Default for BotFeatures {
    fn default() -> Self {
        Self::new(false)
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON")
}

/// Tunables for the estimator-driven policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotParams {
    pub rollouts: u32,
    pub marker_direction: MarkerDirection,
    /// Below this expected value the policy rolls instead of betting or placing.
    pub min_edge: f64,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            rollouts: DEFAULT_ROLLOUTS,
            marker_direction: MarkerDirection::Backward,
            min_edge: f64::NEG_INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn features_read_hint_details_flag() {
        let mut env = HashMap::new();
        env.insert("CAMEL_HINT_DETAILS", "on".to_string());
        let features = BotFeatures::from_reader(|key| env.get(key).cloned());
        assert!(features.hint_details());

        let features = BotFeatures::from_reader(|_| None);
        assert!(!features.hint_details());
    }

    #[test]
    fn default_params_nudge_backward() {
        let params = BotParams::default();
        assert_eq!(params.marker_direction, MarkerDirection::Backward);
        assert_eq!(params.rollouts, DEFAULT_ROLLOUTS);
    }
}
