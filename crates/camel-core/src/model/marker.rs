use core::fmt;
use serde::{Deserialize, Serialize};

/// Opaque handle for whoever owns a spectator marker. The engine never looks
/// inside it; the driver maps it back to a player and pays them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerDirection {
    /// Nudges a landing stack one tile forward onto the top of the next stack.
    Forward,
    /// Nudges a landing stack one tile back underneath the previous stack.
    Backward,
}

impl MarkerDirection {
    pub const fn step(self) -> i32 {
        match self {
            MarkerDirection::Forward => 1,
            MarkerDirection::Backward => -1,
        }
    }

    pub const fn from_step(step: i32) -> Option<Self> {
        match step {
            1 => Some(MarkerDirection::Forward),
            -1 => Some(MarkerDirection::Backward),
            _ => None,
        }
    }
}

impl fmt::Display for MarkerDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarkerDirection::Forward => "+1",
            MarkerDirection::Backward => "-1",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpectatorMarker {
    pub direction: MarkerDirection,
    pub owner: PlayerId,
}

impl SpectatorMarker {
    pub const fn new(direction: MarkerDirection, owner: PlayerId) -> Self {
        Self { direction, owner }
    }
}

/// Reported by a move that landed on a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerTrigger {
    pub tile: usize,
    pub owner: PlayerId,
    pub direction: MarkerDirection,
    /// Tile the carried stack ended on after the nudge (clamped to the board).
    pub destination: usize,
}

/// Why a marker cannot go on a tile. Returned from the validity query so the
/// driver can simply ask again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    OutOfRange { tile: usize, length: usize },
    Occupied { tile: usize },
    MarkerPresent { tile: usize },
    AdjacentMarker { tile: usize, neighbour: usize },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::OutOfRange { tile, length } => {
                write!(f, "tile {tile} is outside the track (0..{length})")
            }
            PlacementError::Occupied { tile } => {
                write!(f, "tile {tile} already has at least one camel")
            }
            PlacementError::MarkerPresent { tile } => {
                write!(f, "tile {tile} already has a spectator marker")
            }
            PlacementError::AdjacentMarker { tile, neighbour } => {
                write!(f, "tile {tile} is next to the marker on tile {neighbour}")
            }
        }
    }
}

impl std::error::Error for PlacementError {}
