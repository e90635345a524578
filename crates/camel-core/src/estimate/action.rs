use crate::model::color::Color;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Something a player can do on their turn. Variant order is the tie-break
/// order used by [`ActionValues::best`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum Action {
    BetOn(Color),
    PlaceMarker(usize),
    Roll,
}

impl Action {
    pub const fn kind(self) -> &'static str {
        match self {
            Action::BetOn(_) => "bet",
            Action::PlaceMarker(_) => "marker",
            Action::Roll => "roll",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::BetOn(color) => write!(f, "bet on {color}"),
            Action::PlaceMarker(tile) => write!(f, "marker on tile {tile}"),
            Action::Roll => f.write_str("roll"),
        }
    }
}

/// Expected coin value per candidate action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionValues {
    values: BTreeMap<Action, f64>,
}

impl ActionValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, action: Action, value: f64) {
        self.values.insert(action, value);
    }

    pub fn get(&self, action: Action) -> Option<f64> {
        self.values.get(&action).copied()
    }

    pub fn bet_value(&self, color: Color) -> f64 {
        self.get(Action::BetOn(color)).unwrap_or(0.0)
    }

    /// The recommended marker tile and its value, if any tile was ever visited.
    pub fn marker(&self) -> Option<(usize, f64)> {
        self.values.iter().find_map(|(action, value)| match action {
            Action::PlaceMarker(tile) => Some((*tile, *value)),
            _ => None,
        })
    }

    pub fn roll_value(&self) -> f64 {
        self.get(Action::Roll).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        self.values.iter().map(|(action, value)| (*action, *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Highest value wins; on a tie the earlier action in [`Action`] order is kept.
    pub fn best(&self) -> Option<(Action, f64)> {
        let mut best: Option<(Action, f64)> = None;
        for (action, value) in self.iter() {
            match best {
                Some((_, top)) if value <= top => {}
                _ => best = Some((action, value)),
            }
        }
        best
    }
}

impl fmt::Display for ActionValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (action, value)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{action}: {value:.2}")?;
        }
        Ok(())
    }
}
