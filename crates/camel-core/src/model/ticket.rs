use crate::model::color::Color;
use serde::{Deserialize, Serialize};

/// First-place payouts, bottom of the pile first. The last entry is taken first.
pub const TICKET_PAYOUTS: [i32; 4] = [2, 2, 3, 5];

/// A leg bet on one camel. Pays `top` for first, 1 for second, costs 1 otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BettingTicket {
    pub color: Color,
    pub top: i32,
}

impl BettingTicket {
    pub const fn new(color: Color, top: i32) -> Self {
        Self { color, top }
    }

    /// Payout for a 1-based finishing place.
    pub const fn payout(self, place: usize) -> i32 {
        match place {
            1 => self.top,
            2 => 1,
            _ => -1,
        }
    }

    /// Settles against a leg ranking; a camel missing from the ranking counts as last.
    pub fn settle(self, ranking: &[Color]) -> i32 {
        let place = ranking
            .iter()
            .position(|c| *c == self.color)
            .map(|index| index + 1)
            .unwrap_or(Color::REGULAR.len());
        self.payout(place)
    }
}

/// Top payout still on offer per regular camel; 0 once a pile is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Payouts {
    tops: [i32; 5],
}

impl Payouts {
    pub fn new(tops: [i32; 5]) -> Self {
        Self { tops }
    }

    pub fn uniform(top: i32) -> Self {
        Self { tops: [top; 5] }
    }

    pub fn top(&self, color: Color) -> i32 {
        if color.is_crazy() {
            return 0;
        }
        self.tops[color.index()]
    }

    pub fn set(&mut self, color: Color, top: i32) {
        if color.is_regular() {
            self.tops[color.index()] = top;
        }
    }
}

/// Per-color LIFO piles of betting tickets for the current leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketBoard {
    piles: [Vec<BettingTicket>; 5],
}

impl Default for TicketBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketBoard {
    pub fn new() -> Self {
        Self {
            piles: Color::REGULAR.map(|color| {
                TICKET_PAYOUTS
                    .iter()
                    .map(|top| BettingTicket::new(color, *top))
                    .collect()
            }),
        }
    }

    pub fn take(&mut self, color: Color) -> Option<BettingTicket> {
        if color.is_crazy() {
            return None;
        }
        self.piles[color.index()].pop()
    }

    pub fn remaining(&self, color: Color) -> usize {
        if color.is_crazy() {
            return 0;
        }
        self.piles[color.index()].len()
    }

    pub fn available_payouts(&self) -> Payouts {
        let mut payouts = Payouts::default();
        for color in Color::REGULAR {
            let top = self.piles[color.index()]
                .last()
                .map(|ticket| ticket.top)
                .unwrap_or(0);
            payouts.set(color, top);
        }
        payouts
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_board_offers_five_everywhere() {
        let board = TicketBoard::new();
        for color in Color::REGULAR {
            assert_eq!(board.available_payouts().top(color), 5);
            assert_eq!(board.remaining(color), 4);
        }
        assert_eq!(board.available_payouts().top(Color::Black), 0);
    }

    #[test]
    fn tickets_come_off_the_top_of_the_pile() {
        let mut board = TicketBoard::new();
        let tops: Vec<i32> = std::iter::from_fn(|| board.take(Color::Blue))
            .map(|ticket| ticket.top)
            .collect();
        assert_eq!(tops, vec![5, 3, 2, 2]);
        assert_eq!(board.available_payouts().top(Color::Blue), 0);
        assert_eq!(board.available_payouts().top(Color::Green), 5);
    }

    #[test]
    fn crazy_camels_have_no_tickets() {
        let mut board = TicketBoard::new();
        assert_eq!(board.take(Color::White), None);
    }

    #[test]
    fn settle_pays_by_place() {
        let ranking = [
            Color::Red,
            Color::Blue,
            Color::Green,
            Color::Yellow,
            Color::Purple,
        ];
        assert_eq!(BettingTicket::new(Color::Red, 5).settle(&ranking), 5);
        assert_eq!(BettingTicket::new(Color::Blue, 5).settle(&ranking), 1);
        assert_eq!(BettingTicket::new(Color::Purple, 3).settle(&ranking), -1);
    }

    #[test]
    fn reset_restores_every_pile() {
        let mut board = TicketBoard::new();
        board.take(Color::Red);
        board.take(Color::Red);
        board.reset();
        assert_eq!(board, TicketBoard::new());
    }
}
