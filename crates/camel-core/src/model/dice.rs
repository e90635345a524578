//! The dice pyramid: one die per camel color, each drawn at most once per leg.

use crate::model::color::Color;
use rand::Rng;
use std::fmt;

const FULL_MASK: u8 = (1 << Color::ALL.len()) - 1;
const CRAZY_MASK: u8 = (1 << Color::White.index()) | (1 << Color::Black.index());

/// Set of die colors that have not been drawn yet this leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DicePool {
    bits: u8,
}

impl DicePool {
    pub const fn full() -> Self {
        Self { bits: FULL_MASK }
    }

    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub fn from_colors<I>(colors: I) -> Self
    where
        I: IntoIterator<Item = Color>,
    {
        let mut pool = Self::empty();
        for color in colors {
            pool.insert(color);
        }
        pool
    }

    pub const fn contains(self, color: Color) -> bool {
        self.bits & (1 << color.index()) != 0
    }

    pub fn insert(&mut self, color: Color) {
        self.bits |= 1 << color.index();
    }

    pub fn remove(&mut self, color: Color) -> bool {
        let present = self.contains(color);
        self.bits &= !(1 << color.index());
        present
    }

    pub const fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub fn regular_count(self) -> usize {
        Color::REGULAR.iter().filter(|c| self.contains(**c)).count()
    }

    pub const fn has_crazy(self) -> bool {
        self.bits & CRAZY_MASK != 0
    }

    /// Empty, or nothing left but the crazy pair.
    pub const fn is_last_draw(self) -> bool {
        self.bits == 0 || self.bits == CRAZY_MASK
    }

    /// Colors in [`Color::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Color> {
        Color::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl Default for DicePool {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for DicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.iter().map(Color::as_str).collect::<Vec<_>>();
        write!(f, "[{}]", names.join(","))
    }
}

/// A single draw from the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DieRoll {
    pub color: Color,
    /// 1..=3 for regular camels, -3..=-1 for the crazy pair.
    pub magnitude: i8,
    pub leg_ended: bool,
}

impl DieRoll {
    pub const fn delta(self) -> i32 {
        self.magnitude as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiceError {
    Exhausted,
}

impl fmt::Display for DiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiceError::Exhausted => write!(f, "no dice left to draw this leg"),
        }
    }
}

impl std::error::Error for DiceError {}

#[derive(Debug, Clone, Default)]
pub struct DiceSource {
    pool: DicePool,
    drawn: Vec<DieRoll>,
}

impl DiceSource {
    pub fn new() -> Self {
        Self::from_pool(DicePool::full())
    }

    /// Resume from an undrawn-subset snapshot. Earlier draws are not reconstructed.
    pub fn from_pool(pool: DicePool) -> Self {
        Self {
            pool,
            drawn: Vec::new(),
        }
    }

    pub fn pool(&self) -> DicePool {
        self.pool
    }

    pub fn drawn(&self) -> &[DieRoll] {
        &self.drawn
    }

    pub fn is_exhausted(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn is_last_draw(&self) -> bool {
        self.pool.is_last_draw()
    }

    pub fn reset(&mut self) {
        self.pool = DicePool::full();
        self.drawn.clear();
    }

    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<DieRoll, DiceError> {
        let remaining = self.pool.len();
        if remaining == 0 {
            return Err(DiceError::Exhausted);
        }

        let pick = rng.gen_range(0..remaining);
        let color = self
            .pool
            .iter()
            .nth(pick)
            .ok_or(DiceError::Exhausted)?;
        let face: i8 = rng.gen_range(1..=3);
        self.pool.remove(color);

        let roll = match color.paired_crazy() {
            Some(pair) => {
                self.pool.remove(pair);
                // Crazy draws never close the leg, even when the pool is now empty.
                DieRoll {
                    color,
                    magnitude: -face,
                    leg_ended: false,
                }
            }
            None => DieRoll {
                color,
                magnitude: face,
                leg_ended: self.pool.is_last_draw(),
            },
        };

        self.drawn.push(roll);
        Ok(roll)
    }
}
