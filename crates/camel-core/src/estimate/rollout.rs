use crate::model::color::Color;
use crate::model::dice::{DicePool, DiceSource};
use crate::model::track::TrackState;
use rand::Rng;

/// Result of one leg played to exhaustion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutOutcome {
    pub ranking: Vec<Color>,
    /// How many times a moved camel came to rest on each tile.
    pub visits: Vec<u32>,
}

/// Plays the rest of the leg on private copies of the board and pool until every
/// die has been drawn. The caller's state is never touched.
pub fn play_out_leg<R: Rng + ?Sized>(
    track: &TrackState,
    pool: DicePool,
    rng: &mut R,
) -> RolloutOutcome {
    let mut track = track.clone();
    let mut dice = DiceSource::from_pool(pool);
    let mut visits = vec![0u32; track.length()];

    while let Ok(roll) = dice.draw(rng) {
        // A die whose camel is not on this board simply has no effect.
        let Ok(outcome) = track.move_camel(roll.color, roll.delta()) else {
            continue;
        };
        if let Some(tile) = outcome.resting_tile() {
            visits[tile] += 1;
        }
    }

    RolloutOutcome {
        ranking: track.ranking(),
        visits,
    }
}

/// Counts accumulated over a batch of rollouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutTally {
    rollouts: u32,
    first: [u32; 5],
    second: [u32; 5],
    visits: Vec<u32>,
}

impl RolloutTally {
    pub fn new(track_length: usize) -> Self {
        Self {
            rollouts: 0,
            first: [0; 5],
            second: [0; 5],
            visits: vec![0; track_length],
        }
    }

    pub fn record(&mut self, outcome: &RolloutOutcome) {
        self.rollouts += 1;
        if let Some(color) = outcome.ranking.first() {
            self.first[color.index()] += 1;
        }
        if let Some(color) = outcome.ranking.get(1) {
            self.second[color.index()] += 1;
        }
        for (total, visits) in self.visits.iter_mut().zip(&outcome.visits) {
            *total += visits;
        }
    }

    pub fn merge(mut self, other: RolloutTally) -> RolloutTally {
        self.rollouts += other.rollouts;
        for i in 0..self.first.len() {
            self.first[i] += other.first[i];
            self.second[i] += other.second[i];
        }
        for (total, visits) in self.visits.iter_mut().zip(other.visits) {
            *total += visits;
        }
        self
    }

    pub fn rollouts(&self) -> u32 {
        self.rollouts
    }

    pub fn first_count(&self, color: Color) -> u32 {
        if color.is_crazy() {
            return 0;
        }
        self.first[color.index()]
    }

    pub fn second_count(&self, color: Color) -> u32 {
        if color.is_crazy() {
            return 0;
        }
        self.second[color.index()]
    }

    pub fn visits(&self) -> &[u32] {
        &self.visits
    }

    pub fn visit_count(&self, tile: usize) -> u32 {
        self.visits.get(tile).copied().unwrap_or(0)
    }

    pub fn first_place_probability(&self, color: Color) -> f64 {
        if self.rollouts == 0 {
            return 0.0;
        }
        f64::from(self.first_count(color)) / f64::from(self.rollouts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn board() -> TrackState {
        TrackState::with_placements(
            16,
            &[
                (Color::Blue, 1),
                (Color::Green, 1),
                (Color::Yellow, 2),
                (Color::Red, 3),
                (Color::Purple, 3),
                (Color::White, 15),
                (Color::Black, 15),
            ],
        )
        .unwrap()
    }

    #[test]
    fn rollout_leaves_the_snapshot_untouched() {
        let track = board();
        let before = track.clone();
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = play_out_leg(&track, DicePool::full(), &mut rng);
        assert_eq!(track, before);
        assert_eq!(outcome.ranking.len(), 5);
    }

    #[test]
    fn rollout_records_one_visit_per_regular_draw_on_board() {
        let track = TrackState::with_placements(16, &[(Color::Red, 0), (Color::Blue, 0)]).unwrap();
        let mut rng = SmallRng::seed_from_u64(8);
        let pool = DicePool::from_colors([Color::Red, Color::Blue]);
        let outcome = play_out_leg(&track, pool, &mut rng);
        assert_eq!(outcome.visits.iter().sum::<u32>(), 2);
        assert!(outcome.visits[0] == 0, "both camels move forward");
    }

    #[test]
    fn rollout_keeps_drawing_past_the_leg_end_flag() {
        let track = TrackState::with_placements(
            16,
            &[(Color::Red, 0), (Color::White, 10), (Color::Black, 12)],
        )
        .unwrap();
        let pool = DicePool::from_colors([Color::Red, Color::White, Color::Black]);

        // Red first reports the leg over while a crazy die is still undrawn.
        let mut ended_early = false;
        for seed in 0..16 {
            let mut dice = DiceSource::from_pool(pool);
            let mut rng = SmallRng::seed_from_u64(seed);
            let first = dice.draw(&mut rng).unwrap();
            ended_early |= first.leg_ended && !dice.is_exhausted();

            let mut rng = SmallRng::seed_from_u64(seed);
            let outcome = play_out_leg(&track, pool, &mut rng);
            assert_eq!(outcome.visits.iter().sum::<u32>(), 2, "seed {seed}");
            assert_eq!(outcome.ranking, vec![Color::Red]);
        }
        assert!(ended_early);
    }

    #[test]
    fn dice_for_absent_camels_are_skipped() {
        let track = TrackState::with_placements(16, &[(Color::Red, 4)]).unwrap();
        let mut rng = SmallRng::seed_from_u64(2);
        let outcome = play_out_leg(&track, DicePool::full(), &mut rng);
        assert_eq!(outcome.ranking, vec![Color::Red]);
        assert_eq!(outcome.visits.iter().sum::<u32>(), 1);
    }

    #[test]
    fn finished_camels_add_no_visits() {
        let track = TrackState::with_placements(16, &[(Color::Red, 15)]).unwrap();
        let mut rng = SmallRng::seed_from_u64(4);
        let outcome = play_out_leg(&track, DicePool::from_colors([Color::Red]), &mut rng);
        assert!(outcome.visits.iter().all(|v| *v == 0));
        assert_eq!(outcome.ranking, vec![Color::Red]);
    }

    #[test]
    fn tally_counts_top_two_and_merges() {
        let outcome = RolloutOutcome {
            ranking: vec![
                Color::Red,
                Color::Blue,
                Color::Green,
                Color::Yellow,
                Color::Purple,
            ],
            visits: vec![0, 2, 1],
        };
        let mut left = RolloutTally::new(3);
        left.record(&outcome);
        let mut right = RolloutTally::new(3);
        right.record(&outcome);

        let merged = left.merge(right);
        assert_eq!(merged.rollouts(), 2);
        assert_eq!(merged.first_count(Color::Red), 2);
        assert_eq!(merged.second_count(Color::Blue), 2);
        assert_eq!(merged.first_count(Color::Blue), 0);
        assert_eq!(merged.visits(), &[0, 4, 2]);
        assert_eq!(merged.first_place_probability(Color::Red), 1.0);
    }
}
