use core::fmt;
use serde::{Deserialize, Serialize};

/// Every camel (and die) on the board. The five regular camels race toward the
/// finish; `Black` and `White` are the crazy pair that run backwards and wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    Blue = 0,
    Green = 1,
    Yellow = 2,
    Red = 3,
    Purple = 4,
    White = 5,
    Black = 6,
}

impl Color {
    pub const ALL: [Color; 7] = [
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Red,
        Color::Purple,
        Color::White,
        Color::Black,
    ];

    pub const REGULAR: [Color; 5] = [
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Red,
        Color::Purple,
    ];

    pub const CRAZY: [Color; 2] = [Color::White, Color::Black];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Color::Blue),
            1 => Some(Color::Green),
            2 => Some(Color::Yellow),
            3 => Some(Color::Red),
            4 => Some(Color::Purple),
            5 => Some(Color::White),
            6 => Some(Color::Black),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_crazy(self) -> bool {
        matches!(self, Color::White | Color::Black)
    }

    pub const fn is_regular(self) -> bool {
        !self.is_crazy()
    }

    /// The other half of the crazy pair; drawing one retires the other.
    pub const fn paired_crazy(self) -> Option<Color> {
        match self {
            Color::White => Some(Color::Black),
            Color::Black => Some(Color::White),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Red => "red",
            Color::Purple => "purple",
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Color {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Color::ALL
            .iter()
            .copied()
            .find(|color| color.as_str() == normalized)
            .ok_or(())
    }
}
