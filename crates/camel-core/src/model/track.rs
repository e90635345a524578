//! The race track: a row of tiles, each holding a bottom-to-top stack of camels.
//!
//! Moving a camel lifts it together with everything stacked on it (the carried
//! stack) and drops the whole unit onto the target tile. Regular camels that run
//! past the last tile leave the board for good and are recorded in a win bucket
//! keyed by how far they overshot. The crazy pair never finishes and wraps.

use crate::model::color::Color;
use crate::model::marker::{
    MarkerDirection, MarkerTrigger, PlacementError, PlayerId, SpectatorMarker,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const DEFAULT_TRACK_LENGTH: usize = 16;

/// Finished camels grouped by overshoot distance. Entries are terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WinBuckets {
    buckets: BTreeMap<usize, Vec<Color>>,
}

impl WinBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, bucket: usize, color: Color) {
        self.buckets.entry(bucket).or_default().push(color);
    }

    pub fn bucket(&self, overflow: usize) -> &[Color] {
        self.buckets
            .get(&overflow)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn bucket_of(&self, color: Color) -> Option<usize> {
        self.buckets
            .iter()
            .find(|(_, bucket)| bucket.contains(&color))
            .map(|(overflow, _)| *overflow)
    }

    /// Finishers most-advanced first: larger overshoot first, and inside a
    /// bucket the camel that was carried higher comes first.
    pub fn ranked(&self) -> Vec<Color> {
        self.buckets
            .values()
            .rev()
            .flat_map(|bucket| bucket.iter().rev().copied())
            .collect()
    }
}

/// Where the moved camel came to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Final tile, after any marker nudge.
    Tile(usize),
    Finished { bucket: usize },
    /// The camel had already finished in an earlier move; nothing happened.
    AlreadyFinished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub color: Color,
    /// Moved camel plus everything that rode on it, bottom to top.
    pub carried: Vec<Color>,
    pub landing: Landing,
    /// Win-bucket entries added by this move, as `(bucket, color)`.
    pub finished: Vec<(usize, Color)>,
    pub trigger: Option<MarkerTrigger>,
    pub race_won: bool,
}

impl MoveOutcome {
    pub fn resting_tile(&self) -> Option<usize> {
        match self.landing {
            Landing::Tile(tile) => Some(tile),
            Landing::Finished { .. } | Landing::AlreadyFinished => None,
        }
    }

    fn already_finished(color: Color, race_won: bool) -> Self {
        Self {
            color,
            carried: Vec::new(),
            landing: Landing::AlreadyFinished,
            finished: Vec::new(),
            trigger: None,
            race_won,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackError {
    NotFound(Color),
    TileOutOfRange { tile: usize, length: usize },
    DuplicateCamel(Color),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::NotFound(color) => write!(f, "camel {color} not found on track"),
            TrackError::TileOutOfRange { tile, length } => {
                write!(f, "tile {tile} is outside the track (0..{length})")
            }
            TrackError::DuplicateCamel(color) => {
                write!(f, "camel {color} placed more than once")
            }
        }
    }
}

impl std::error::Error for TrackError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackState {
    tiles: Vec<Vec<Color>>,
    wins: WinBuckets,
    markers: BTreeMap<usize, SpectatorMarker>,
    has_winner: bool,
}

impl Default for TrackState {
    fn default() -> Self {
        Self::new(DEFAULT_TRACK_LENGTH)
    }
}

impl TrackState {
    pub fn new(length: usize) -> Self {
        Self {
            tiles: vec![Vec::new(); length.max(1)],
            wins: WinBuckets::new(),
            markers: BTreeMap::new(),
            has_winner: false,
        }
    }

    /// Builds a board from `(color, tile)` pairs. Camels sharing a tile stack in
    /// the order they are listed, first one at the bottom.
    pub fn with_placements(
        length: usize,
        placements: &[(Color, usize)],
    ) -> Result<Self, TrackError> {
        let mut track = Self::new(length);
        let length = track.length();
        for &(color, tile) in placements {
            if tile >= length {
                return Err(TrackError::TileOutOfRange { tile, length });
            }
            if track.locate(color).is_some() {
                return Err(TrackError::DuplicateCamel(color));
            }
            track.tiles[tile].push(color);
        }
        Ok(track)
    }

    /// Race setup: regular camel `i` of [`Color::REGULAR`] goes on `regular_tiles[i]`
    /// (stacking in color order) and the crazy pair shares the last tile. Tiles past
    /// the end are pulled back onto the board.
    pub fn opening(length: usize, regular_tiles: [usize; 5]) -> Self {
        let mut track = Self::new(length);
        let last = track.length() - 1;
        for (color, tile) in Color::REGULAR.into_iter().zip(regular_tiles) {
            track.tiles[tile.min(last)].push(color);
        }
        track.tiles[last].extend(Color::CRAZY);
        track
    }

    pub fn length(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> &[Vec<Color>] {
        &self.tiles
    }

    pub fn stack(&self, tile: usize) -> &[Color] {
        self.tiles.get(tile).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn win_buckets(&self) -> &WinBuckets {
        &self.wins
    }

    pub fn has_winner(&self) -> bool {
        self.has_winner
    }

    pub fn markers(&self) -> &BTreeMap<usize, SpectatorMarker> {
        &self.markers
    }

    /// Current `(color, tile)` pairs, tile by tile and bottom to top, suitable
    /// for [`TrackState::with_placements`].
    pub fn placements(&self) -> Vec<(Color, usize)> {
        self.tiles
            .iter()
            .enumerate()
            .flat_map(|(tile, stack)| stack.iter().map(move |color| (*color, tile)))
            .collect()
    }

    pub fn locate(&self, color: Color) -> Option<usize> {
        self.position(color).map(|(tile, _)| tile)
    }

    /// Tile index and height in the stack (0 = bottom).
    pub fn position(&self, color: Color) -> Option<(usize, usize)> {
        self.tiles.iter().enumerate().find_map(|(tile, stack)| {
            stack
                .iter()
                .position(|c| *c == color)
                .map(|height| (tile, height))
        })
    }

    pub fn regular_count(&self) -> usize {
        let on_board = self
            .tiles
            .iter()
            .flatten()
            .filter(|color| color.is_regular())
            .count();
        on_board + self.wins.count()
    }

    pub fn move_camel(&mut self, color: Color, delta: i32) -> Result<MoveOutcome, TrackError> {
        let Some((source, height)) = self.position(color) else {
            if self.wins.bucket_of(color).is_some() {
                return Ok(MoveOutcome::already_finished(color, self.has_winner));
            }
            return Err(TrackError::NotFound(color));
        };

        let carried = self.tiles[source].split_off(height);
        let length = self.length() as i64;
        let raw_target = source as i64 + i64::from(delta);

        if color.is_crazy() {
            let target = raw_target.rem_euclid(length) as usize;
            return Ok(self.land(color, carried, target));
        }

        let target = raw_target.max(0);
        if target < length {
            return Ok(self.land(color, carried, target as usize));
        }

        let bucket = (target - length) as usize;
        let mut finished = Vec::with_capacity(carried.len());
        for &token in &carried {
            if token.is_regular() {
                self.wins.record(bucket, token);
                finished.push((bucket, token));
            } else {
                // A crazy camel riding across the line keeps wrapping.
                let wrapped = target.rem_euclid(length) as usize;
                self.tiles[wrapped].push(token);
            }
        }
        self.has_winner = true;

        Ok(MoveOutcome {
            color,
            carried,
            landing: Landing::Finished { bucket },
            finished,
            trigger: None,
            race_won: true,
        })
    }

    fn land(&mut self, color: Color, carried: Vec<Color>, target: usize) -> MoveOutcome {
        let count = carried.len();
        self.tiles[target].extend_from_slice(&carried);

        let mut resting = target;
        let mut trigger = None;
        if let Some(marker) = self.markers.get(&target).copied() {
            let last = self.length() as i64 - 1;
            let destination =
                (target as i64 + i64::from(marker.direction.step())).clamp(0, last) as usize;

            let stack = &mut self.tiles[target];
            let lifted = stack.split_off(stack.len() - count);
            match marker.direction {
                MarkerDirection::Forward => self.tiles[destination].extend(lifted),
                MarkerDirection::Backward => {
                    self.tiles[destination].splice(0..0, lifted);
                }
            }

            resting = destination;
            trigger = Some(MarkerTrigger {
                tile: target,
                owner: marker.owner,
                direction: marker.direction,
                destination,
            });
        }

        MoveOutcome {
            color,
            carried,
            landing: Landing::Tile(resting),
            finished: Vec::new(),
            trigger,
            race_won: self.has_winner,
        }
    }

    /// Regular camels, most advanced first.
    pub fn ranking(&self) -> Vec<Color> {
        let mut ranked = self.wins.ranked();

        let mut on_board: Vec<(usize, usize, Color)> = self
            .tiles
            .iter()
            .enumerate()
            .flat_map(|(tile, stack)| {
                stack
                    .iter()
                    .enumerate()
                    .filter(|(_, color)| color.is_regular())
                    .map(move |(height, color)| (tile, height, *color))
            })
            .collect();
        on_board.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));

        ranked.extend(on_board.into_iter().map(|(_, _, color)| color));
        ranked
    }

    /// Tiles a marker could go on right now: no camel, no marker, no marker next door.
    pub fn empty_tiles(&self) -> BTreeSet<usize> {
        let mut open: BTreeSet<usize> = self
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, stack)| stack.is_empty())
            .map(|(tile, _)| tile)
            .collect();

        for &tile in self.markers.keys() {
            open.remove(&tile);
            open.remove(&(tile + 1));
            if let Some(before) = tile.checked_sub(1) {
                open.remove(&before);
            }
        }
        open
    }

    pub fn any_finisher_on_last_tile(&self) -> bool {
        self.tiles
            .last()
            .is_some_and(|stack| stack.iter().any(|color| color.is_regular()))
    }

    pub fn check_marker_placement(&self, tile: usize) -> Result<(), PlacementError> {
        let length = self.length();
        if tile >= length {
            return Err(PlacementError::OutOfRange { tile, length });
        }
        if self.markers.contains_key(&tile) {
            return Err(PlacementError::MarkerPresent { tile });
        }
        if !self.tiles[tile].is_empty() {
            return Err(PlacementError::Occupied { tile });
        }
        let neighbours = [tile.checked_sub(1), tile.checked_add(1)];
        if let Some(neighbour) = neighbours
            .into_iter()
            .flatten()
            .find(|n| self.markers.contains_key(n))
        {
            return Err(PlacementError::AdjacentMarker { tile, neighbour });
        }
        Ok(())
    }

    pub fn place_marker(
        &mut self,
        tile: usize,
        direction: MarkerDirection,
        owner: PlayerId,
    ) -> Result<(), PlacementError> {
        self.check_marker_placement(tile)?;
        self.markers
            .insert(tile, SpectatorMarker::new(direction, owner));
        Ok(())
    }

    pub fn remove_marker(&mut self, tile: usize) -> Option<SpectatorMarker> {
        self.markers.remove(&tile)
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (tile, stack) in self.tiles.iter().enumerate() {
            if tile > 0 {
                f.write_str(", ")?;
            }
            let names = stack.iter().map(|c| c.as_str()).collect::<Vec<_>>();
            write!(f, "[{}]", names.join(","))?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dice::DiceSource;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn spread_board() -> TrackState {
        TrackState::with_placements(
            DEFAULT_TRACK_LENGTH,
            &[
                (Color::Red, 0),
                (Color::Blue, 1),
                (Color::Green, 2),
                (Color::Yellow, 3),
                (Color::Purple, 4),
            ],
        )
        .unwrap()
    }

    #[test]
    fn carried_stacks_pile_up_in_order() {
        let mut track = spread_board();
        track.move_camel(Color::Red, 2).unwrap();
        track.move_camel(Color::Blue, 1).unwrap();
        track.move_camel(Color::Green, 2).unwrap();
        track.move_camel(Color::Yellow, 1).unwrap();

        assert_eq!(
            track.stack(4),
            &[
                Color::Purple,
                Color::Green,
                Color::Red,
                Color::Blue,
                Color::Yellow
            ]
        );
        for tile in (0..16).filter(|t| *t != 4) {
            assert!(track.stack(tile).is_empty(), "tile {tile} should be empty");
        }
    }

    #[test]
    fn lifting_mid_stack_splits_and_keeps_order() {
        let mut track = spread_board();
        for (color, delta) in [
            (Color::Red, 2),
            (Color::Blue, 1),
            (Color::Green, 2),
            (Color::Yellow, 1),
            (Color::Red, 1),
            (Color::Blue, 1),
            (Color::Green, 2),
            (Color::Purple, 2),
            (Color::Yellow, 1),
            (Color::Purple, 1),
        ] {
            track.move_camel(color, delta).unwrap();
        }

        assert_eq!(track.stack(5), &[Color::Red]);
        assert_eq!(track.stack(6), &[Color::Blue]);
        assert_eq!(track.stack(7), &[Color::Yellow, Color::Green]);
        assert_eq!(track.stack(8), &[Color::Purple]);
        assert_eq!(
            track.ranking(),
            vec![
                Color::Purple,
                Color::Green,
                Color::Yellow,
                Color::Blue,
                Color::Red
            ]
        );
    }

    #[test]
    fn move_reports_carried_stack_bottom_to_top() {
        let mut track = TrackState::with_placements(
            16,
            &[(Color::Red, 2), (Color::Blue, 2), (Color::Green, 2)],
        )
        .unwrap();
        let outcome = track.move_camel(Color::Blue, 3).unwrap();
        assert_eq!(outcome.carried, vec![Color::Blue, Color::Green]);
        assert_eq!(outcome.landing, Landing::Tile(5));
        assert_eq!(track.stack(2), &[Color::Red]);
        assert_eq!(track.stack(5), &[Color::Blue, Color::Green]);
    }

    #[test]
    fn overshooting_the_line_lands_in_win_bucket() {
        let mut track = TrackState::with_placements(
            16,
            &[(Color::Red, 14), (Color::Blue, 3)],
        )
        .unwrap();
        let outcome = track.move_camel(Color::Red, 3).unwrap();

        assert_eq!(outcome.landing, Landing::Finished { bucket: 1 });
        assert_eq!(outcome.finished, vec![(1, Color::Red)]);
        assert!(outcome.race_won);
        assert!(track.has_winner());
        assert_eq!(track.locate(Color::Red), None);
        assert_eq!(track.win_buckets().bucket(1), &[Color::Red]);
        assert_eq!(track.ranking()[0], Color::Red);
    }

    #[test]
    fn whole_carried_stack_finishes_together() {
        let mut track = TrackState::with_placements(
            16,
            &[(Color::Green, 15), (Color::Yellow, 15), (Color::Purple, 15)],
        )
        .unwrap();
        let outcome = track.move_camel(Color::Yellow, 1).unwrap();

        assert_eq!(
            outcome.finished,
            vec![(0, Color::Yellow), (0, Color::Purple)]
        );
        assert_eq!(track.stack(15), &[Color::Green]);
        assert_eq!(
            track.ranking(),
            vec![Color::Purple, Color::Yellow, Color::Green]
        );
    }

    #[test]
    fn larger_overshoot_outranks_smaller() {
        let mut track = TrackState::with_placements(
            16,
            &[(Color::Red, 15), (Color::Blue, 14)],
        )
        .unwrap();
        track.move_camel(Color::Red, 1).unwrap();
        track.move_camel(Color::Blue, 3).unwrap();
        assert_eq!(track.win_buckets().bucket(0), &[Color::Red]);
        assert_eq!(track.win_buckets().bucket(1), &[Color::Blue]);
        assert_eq!(track.ranking(), vec![Color::Blue, Color::Red]);
    }

    #[test]
    fn huge_overshoot_keeps_a_single_bucket() {
        let mut track = TrackState::with_placements(
            16,
            &[(Color::Red, 15), (Color::Blue, 2)],
        )
        .unwrap();
        let outcome = track.move_camel(Color::Red, i32::MAX).unwrap();
        let bucket = i32::MAX as usize;

        assert_eq!(outcome.landing, Landing::Finished { bucket });
        assert_eq!(track.win_buckets().bucket(bucket), &[Color::Red]);
        assert_eq!(track.win_buckets().bucket_of(Color::Red), Some(bucket));
        assert_eq!(track.win_buckets().count(), 1);
        assert_eq!(track.ranking(), vec![Color::Red, Color::Blue]);
    }

    #[test]
    fn opening_places_every_camel_on_the_board() {
        let track = TrackState::opening(16, [1, 3, 1, 2, 40]);
        assert_eq!(track.stack(1), &[Color::Blue, Color::Yellow]);
        assert_eq!(track.stack(2), &[Color::Red]);
        assert_eq!(track.stack(3), &[Color::Green]);
        assert_eq!(
            track.stack(15),
            &[Color::Purple, Color::White, Color::Black]
        );
        assert_eq!(track.regular_count(), 5);
    }

    #[test]
    fn moving_a_finished_camel_is_a_no_op() {
        let mut track = TrackState::with_placements(16, &[(Color::Red, 15)]).unwrap();
        track.move_camel(Color::Red, 2).unwrap();
        let before = track.clone();
        let outcome = track.move_camel(Color::Red, 1).unwrap();
        assert_eq!(outcome.landing, Landing::AlreadyFinished);
        assert!(outcome.carried.is_empty());
        assert_eq!(track, before);
    }

    #[test]
    fn unknown_camel_is_not_found() {
        let mut track = spread_board();
        assert_eq!(
            track.move_camel(Color::Black, -1),
            Err(TrackError::NotFound(Color::Black))
        );
    }

    #[test]
    fn regular_camel_clamps_at_start() {
        let mut track = TrackState::with_placements(16, &[(Color::Red, 1)]).unwrap();
        let outcome = track.move_camel(Color::Red, -3).unwrap();
        assert_eq!(outcome.landing, Landing::Tile(0));
    }

    #[test]
    fn crazy_camel_wraps_both_ways_and_carries_riders() {
        let mut track = TrackState::with_placements(
            16,
            &[(Color::Black, 1), (Color::Red, 1), (Color::White, 15)],
        )
        .unwrap();

        let outcome = track.move_camel(Color::Black, -3).unwrap();
        assert_eq!(outcome.landing, Landing::Tile(14));
        assert_eq!(track.stack(14), &[Color::Black, Color::Red]);

        let outcome = track.move_camel(Color::White, 2).unwrap();
        assert_eq!(outcome.landing, Landing::Tile(1));
        assert!(outcome.finished.is_empty());
        assert!(!track.has_winner());
    }

    #[test]
    fn crazy_rider_wraps_when_its_carrier_finishes() {
        let mut track =
            TrackState::with_placements(16, &[(Color::Blue, 14), (Color::White, 14)]).unwrap();
        let outcome = track.move_camel(Color::Blue, 3).unwrap();
        assert_eq!(outcome.finished, vec![(1, Color::Blue)]);
        assert_eq!(track.stack(1), &[Color::White]);
        assert!(track.win_buckets().bucket_of(Color::White).is_none());
    }

    #[test]
    fn forward_marker_moves_only_carried_camels_onto_next_top() {
        let mut track = TrackState::with_placements(
            16,
            &[(Color::Purple, 6), (Color::Red, 2), (Color::Blue, 2)],
        )
        .unwrap();
        track
            .place_marker(5, MarkerDirection::Forward, PlayerId(3))
            .unwrap();
        // An occupant sitting under the marker stays where it is.
        track.tiles[5].push(Color::Green);

        let outcome = track.move_camel(Color::Red, 3).unwrap();

        let trigger = outcome.trigger.expect("marker fires");
        assert_eq!(trigger.tile, 5);
        assert_eq!(trigger.owner, PlayerId(3));
        assert_eq!(trigger.destination, 6);
        assert_eq!(outcome.landing, Landing::Tile(6));
        assert_eq!(track.stack(5), &[Color::Green]);
        assert_eq!(track.stack(6), &[Color::Purple, Color::Red, Color::Blue]);
    }

    #[test]
    fn backward_marker_slides_carried_camels_underneath() {
        let mut track = TrackState::with_placements(
            16,
            &[(Color::Yellow, 3), (Color::Red, 1), (Color::Blue, 1)],
        )
        .unwrap();
        track
            .place_marker(5, MarkerDirection::Backward, PlayerId(1))
            .unwrap();

        let outcome = track.move_camel(Color::Red, 4).unwrap();

        assert_eq!(outcome.trigger.map(|t| t.destination), Some(4));
        assert!(track.stack(5).is_empty());
        assert_eq!(track.stack(4), &[Color::Red, Color::Blue]);

        track.move_camel(Color::Yellow, 2).unwrap();
        assert_eq!(track.stack(4), &[Color::Yellow, Color::Red, Color::Blue]);
    }

    #[test]
    fn marker_nudge_does_not_chain_into_another_marker() {
        let mut track = TrackState::with_placements(16, &[(Color::Red, 0)]).unwrap();
        track
            .place_marker(3, MarkerDirection::Forward, PlayerId(0))
            .unwrap();
        track
            .place_marker(5, MarkerDirection::Forward, PlayerId(1))
            .unwrap();
        // Force a marker directly in front to check the nudge does not re-fire.
        track.markers.insert(4, SpectatorMarker::new(MarkerDirection::Forward, PlayerId(2)));

        let outcome = track.move_camel(Color::Red, 3).unwrap();
        assert_eq!(outcome.trigger.map(|t| t.owner), Some(PlayerId(0)));
        assert_eq!(track.locate(Color::Red), Some(4));
    }

    #[test]
    fn marker_at_board_edge_clamps_destination() {
        let mut track = TrackState::with_placements(16, &[(Color::Red, 13)]).unwrap();
        track
            .place_marker(15, MarkerDirection::Forward, PlayerId(0))
            .unwrap();
        let outcome = track.move_camel(Color::Red, 2).unwrap();
        assert_eq!(outcome.trigger.map(|t| t.destination), Some(15));
        assert_eq!(track.locate(Color::Red), Some(15));
        assert!(track.any_finisher_on_last_tile());
        assert!(!track.has_winner());
    }

    #[test]
    fn empty_tiles_skip_camels_and_marker_neighbourhood() {
        let mut track = TrackState::with_placements(
            8,
            &[(Color::Red, 0), (Color::Blue, 2), (Color::White, 7)],
        )
        .unwrap();
        track
            .place_marker(4, MarkerDirection::Backward, PlayerId(0))
            .unwrap();
        let open: Vec<usize> = track.empty_tiles().into_iter().collect();
        assert_eq!(open, vec![1, 6]);
    }

    #[test]
    fn placement_checks_cover_every_rule() {
        let mut track = TrackState::with_placements(16, &[(Color::Red, 2)]).unwrap();
        track
            .place_marker(6, MarkerDirection::Forward, PlayerId(0))
            .unwrap();

        assert_eq!(
            track.check_marker_placement(16),
            Err(PlacementError::OutOfRange {
                tile: 16,
                length: 16
            })
        );
        assert_eq!(
            track.check_marker_placement(2),
            Err(PlacementError::Occupied { tile: 2 })
        );
        assert_eq!(
            track.check_marker_placement(6),
            Err(PlacementError::MarkerPresent { tile: 6 })
        );
        assert_eq!(
            track.check_marker_placement(7),
            Err(PlacementError::AdjacentMarker {
                tile: 7,
                neighbour: 6
            })
        );
        assert_eq!(track.check_marker_placement(9), Ok(()));

        let rejected = track.place_marker(5, MarkerDirection::Backward, PlayerId(1));
        assert!(rejected.is_err());
        assert_eq!(track.markers().len(), 1);

        track.clear_markers();
        assert!(track.markers().is_empty());
    }

    #[test]
    fn placements_reject_bad_input() {
        assert_eq!(
            TrackState::with_placements(16, &[(Color::Red, 16)]),
            Err(TrackError::TileOutOfRange {
                tile: 16,
                length: 16
            })
        );
        assert_eq!(
            TrackState::with_placements(16, &[(Color::Red, 1), (Color::Red, 2)]),
            Err(TrackError::DuplicateCamel(Color::Red))
        );
    }

    #[test]
    fn placements_roundtrip_through_snapshot() {
        let mut track = spread_board();
        track.move_camel(Color::Red, 3).unwrap();
        let rebuilt = TrackState::with_placements(16, &track.placements()).unwrap();
        assert_eq!(rebuilt.tiles(), track.tiles());
    }

    #[test]
    fn ranking_breaks_ties_by_stack_height() {
        let track = TrackState::with_placements(
            16,
            &[
                (Color::Red, 3),
                (Color::Black, 3),
                (Color::Blue, 3),
                (Color::Green, 1),
                (Color::Yellow, 0),
                (Color::Purple, 9),
            ],
        )
        .unwrap();
        assert_eq!(
            track.ranking(),
            vec![
                Color::Purple,
                Color::Blue,
                Color::Red,
                Color::Green,
                Color::Yellow
            ]
        );
    }

    #[test]
    fn regular_camel_count_is_conserved_through_random_legs() {
        for seed in 0..48 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut track = TrackState::with_placements(
                16,
                &[
                    (Color::Blue, 9),
                    (Color::Green, 11),
                    (Color::Yellow, 12),
                    (Color::Red, 13),
                    (Color::Purple, 13),
                    (Color::White, 15),
                    (Color::Black, 15),
                ],
            )
            .unwrap();
            track
                .place_marker(14, MarkerDirection::Backward, PlayerId(0))
                .unwrap();
            let mut dice = DiceSource::new();
            while let Ok(roll) = dice.draw(&mut rng) {
                track.move_camel(roll.color, roll.delta()).unwrap();
                assert_eq!(track.regular_count(), 5, "seed {seed}");

                let ranking = track.ranking();
                assert_eq!(ranking.len(), 5);
                let mut unique = ranking.clone();
                unique.sort();
                unique.dedup();
                assert_eq!(unique.len(), 5, "ranking must be a strict order");
            }
        }
    }

    #[test]
    fn display_lists_every_tile() {
        let track = TrackState::with_placements(3, &[(Color::Red, 1), (Color::Blue, 1)]).unwrap();
        assert_eq!(track.to_string(), "[[], [red,blue], []]");
    }
}
