use camel_core::estimate::Action;
use camel_core::model::color::Color;
use camel_core::model::dice::DicePool;
use camel_core::model::ticket::Payouts;
use camel_core::model::track::TrackState;

/// Every action open to the player right now, in [`Action`] order.
pub fn legal_actions(track: &TrackState, pool: DicePool, payouts: &Payouts) -> Vec<Action> {
    let mut actions: Vec<Action> = Color::REGULAR
        .iter()
        .filter(|color| payouts.top(**color) > 0)
        .map(|color| Action::BetOn(*color))
        .collect();
    actions.extend(track.empty_tiles().into_iter().map(Action::PlaceMarker));
    if !pool.is_empty() {
        actions.push(Action::Roll);
    }
    actions
}

pub fn is_legal(action: Action, track: &TrackState, pool: DicePool, payouts: &Payouts) -> bool {
    match action {
        Action::BetOn(color) => payouts.top(color) > 0,
        Action::PlaceMarker(tile) => track.check_marker_placement(tile).is_ok(),
        Action::Roll => !pool.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_piles_and_pool_remove_actions() {
        let track = TrackState::with_placements(4, &[(Color::Red, 0), (Color::Blue, 1)]).unwrap();
        let mut payouts = Payouts::uniform(5);
        payouts.set(Color::Green, 0);

        let actions = legal_actions(&track, DicePool::empty(), &payouts);
        assert!(!actions.contains(&Action::BetOn(Color::Green)));
        assert!(actions.contains(&Action::BetOn(Color::Red)));
        assert_eq!(
            actions
                .iter()
                .filter(|a| matches!(a, Action::PlaceMarker(_)))
                .count(),
            2
        );
        assert!(!actions.contains(&Action::Roll));
    }

    #[test]
    fn legality_matches_listing() {
        let track = TrackState::with_placements(6, &[(Color::Red, 2)]).unwrap();
        let payouts = Payouts::uniform(3);
        let pool = DicePool::full();
        for action in legal_actions(&track, pool, &payouts) {
            assert!(is_legal(action, &track, pool, &payouts), "{action}");
        }
        assert!(!is_legal(Action::PlaceMarker(2), &track, pool, &payouts));
        assert!(!is_legal(Action::BetOn(Color::White), &track, pool, &payouts));
    }
}
