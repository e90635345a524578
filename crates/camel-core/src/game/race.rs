use crate::estimate::{ActionValues, OutcomeEstimator};
use crate::model::color::Color;
use crate::model::dice::{DiceError, DicePool, DiceSource, DieRoll};
use crate::model::marker::{MarkerDirection, PlacementError, PlayerId, SpectatorMarker};
use crate::model::ticket::{BettingTicket, Payouts, TicketBoard};
use crate::model::track::{DEFAULT_TRACK_LENGTH, MoveOutcome, TrackError, TrackState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollReport {
    pub roll: DieRoll,
    pub outcome: MoveOutcome,
    pub leg: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceError {
    Dice(DiceError),
    Track(TrackError),
    RaceOver,
}

impl fmt::Display for RaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceError::Dice(err) => write!(f, "dice: {err}"),
            RaceError::Track(err) => write!(f, "track: {err}"),
            RaceError::RaceOver => write!(f, "the race already has a winner"),
        }
    }
}

impl std::error::Error for RaceError {}

impl From<DiceError> for RaceError {
    fn from(err: DiceError) -> Self {
        RaceError::Dice(err)
    }
}

impl From<TrackError> for RaceError {
    fn from(err: TrackError) -> Self {
        RaceError::Track(err)
    }
}

/// One race from setup to winner: board, dice, ticket piles and leg counter,
/// driven by a single seeded generator.
#[derive(Debug, Clone)]
pub struct RaceState {
    track: TrackState,
    dice: DiceSource,
    tickets: TicketBoard,
    leg: u32,
    leg_over: bool,
    rng: StdRng,
    seed: u64,
}

impl RaceState {
    pub fn new() -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_length(DEFAULT_TRACK_LENGTH, seed)
    }

    /// Regular camels start on random tiles 1..=3 (stacking in color order) and
    /// the crazy pair shares the last tile.
    pub fn with_length(length: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let length = length.max(4);
        let regular_tiles = Color::REGULAR.map(|_| rng.gen_range(1..=3));
        let track = TrackState::opening(length, regular_tiles);

        Self {
            track,
            dice: DiceSource::new(),
            tickets: TicketBoard::new(),
            leg: 1,
            leg_over: false,
            rng,
            seed,
        }
    }

    pub fn snapshot_seed(&self) -> u64 {
        self.seed
    }

    pub fn track(&self) -> &TrackState {
        &self.track
    }

    pub fn pool(&self) -> DicePool {
        self.dice.pool()
    }

    pub fn drawn(&self) -> &[DieRoll] {
        self.dice.drawn()
    }

    pub fn tickets(&self) -> &TicketBoard {
        &self.tickets
    }

    pub fn payouts(&self) -> Payouts {
        self.tickets.available_payouts()
    }

    pub fn leg(&self) -> u32 {
        self.leg
    }

    pub fn is_leg_over(&self) -> bool {
        self.leg_over || self.dice.is_exhausted()
    }

    pub fn is_race_over(&self) -> bool {
        self.track.has_winner()
    }

    pub fn roll(&mut self) -> Result<RollReport, RaceError> {
        if self.is_race_over() {
            return Err(RaceError::RaceOver);
        }
        let roll = self.dice.draw(&mut self.rng)?;
        let outcome = self.track.move_camel(roll.color, roll.delta())?;
        if roll.leg_ended || self.dice.is_exhausted() {
            self.leg_over = true;
        }
        Ok(RollReport {
            roll,
            outcome,
            leg: self.leg,
        })
    }

    pub fn take_ticket(&mut self, color: Color) -> Option<BettingTicket> {
        self.tickets.take(color)
    }

    pub fn place_marker(
        &mut self,
        tile: usize,
        direction: MarkerDirection,
        owner: PlayerId,
    ) -> Result<(), PlacementError> {
        self.track.place_marker(tile, direction, owner)
    }

    pub fn remove_marker(&mut self, tile: usize) -> Option<SpectatorMarker> {
        self.track.remove_marker(tile)
    }

    /// Leg ranking as it stands now.
    pub fn ranking(&self) -> Vec<Color> {
        self.track.ranking()
    }

    pub fn estimate(&self, estimator: &OutcomeEstimator) -> ActionValues {
        estimator.estimate(&self.track, self.dice.pool(), &self.payouts())
    }

    /// Clears the pool, markers and ticket piles. Camel positions carry over.
    pub fn finish_leg(&mut self) {
        self.dice.reset();
        self.track.clear_markers();
        self.tickets.reset();
        self.leg += 1;
        self.leg_over = false;
    }
}

impl Default for RaceState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::EstimatorConfig;

    #[test]
    fn setup_places_every_camel() {
        let race = RaceState::with_seed(12);
        let track = race.track();
        for color in Color::REGULAR {
            let tile = track.locate(color).unwrap();
            assert!((1..=3).contains(&tile), "{color} on {tile}");
        }
        assert_eq!(track.stack(15), &[Color::White, Color::Black]);
        assert_eq!(race.leg(), 1);
        assert_eq!(race.pool(), DicePool::full());
    }

    #[test]
    fn same_seed_same_race() {
        let play = |seed| {
            let mut race = RaceState::with_seed(seed);
            let mut rolls = Vec::new();
            while !race.is_leg_over() && !race.is_race_over() {
                rolls.push(race.roll().unwrap().roll);
            }
            (rolls, race.track().clone())
        };
        assert_eq!(play(77), play(77));
    }

    #[test]
    fn leg_ends_before_the_crazy_pair_is_forced() {
        for seed in 0..32 {
            let mut race = RaceState::with_seed(seed);
            while !race.is_leg_over() && !race.is_race_over() {
                race.roll().unwrap();
            }
            let regular_drawn = race
                .drawn()
                .iter()
                .filter(|roll| roll.color.is_regular())
                .count();
            if !race.is_race_over() {
                assert_eq!(regular_drawn, 5);
            }
        }
    }

    #[test]
    fn finish_leg_resets_pool_markers_and_tickets() {
        let mut race = RaceState::with_seed(3);
        race.take_ticket(Color::Red);
        race
            .place_marker(8, MarkerDirection::Forward, PlayerId(0))
            .unwrap();
        race.roll().unwrap();
        let before = race.track().placements();

        race.finish_leg();
        assert_eq!(race.leg(), 2);
        assert_eq!(race.pool(), DicePool::full());
        assert!(race.track().markers().is_empty());
        assert_eq!(race.payouts().top(Color::Red), 5);
        assert_eq!(race.track().placements(), before);
        assert!(!race.is_leg_over());
    }

    #[test]
    fn race_runs_to_a_winner() {
        let mut race = RaceState::with_seed(2024);
        let mut legs = 0;
        while !race.is_race_over() {
            if race.is_leg_over() {
                race.finish_leg();
                legs += 1;
                assert!(legs < 50, "race should finish");
            }
            race.roll().unwrap();
        }
        assert_eq!(race.track().regular_count(), 5);
        assert!(!race.track().win_buckets().is_empty());
        assert_eq!(race.roll(), Err(RaceError::RaceOver));
    }

    #[test]
    fn estimate_uses_live_payouts() {
        let mut race = RaceState::with_seed(9);
        for _ in 0..4 {
            race.take_ticket(Color::Blue);
        }
        let estimator = OutcomeEstimator::new(EstimatorConfig {
            rollouts: 20,
            seed: 1,
        });
        let values = race.estimate(&estimator);
        assert_eq!(values.bet_value(Color::Blue), 0.0);
    }
}
