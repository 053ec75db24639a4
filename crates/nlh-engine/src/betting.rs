use nlh_core::{Chips, Position};
use std::collections::BTreeSet;

/// Per-street betting state.
#[derive(Debug, Clone)]
pub struct BettingRound {
    pub bet_to_match: Chips,
    pub last_raise_size: Chips,
    pub current_seat: Option<Position>,
    pub acted_this_street: BTreeSet<Position>,
}

impl BettingRound {
    pub fn new(bet_to_match: Chips, last_raise_size: Chips, first_to_act: Option<Position>) -> Self {
        Self {
            bet_to_match,
            last_raise_size,
            current_seat: first_to_act,
            acted_this_street: BTreeSet::new(),
        }
    }

    /// Records that `seat` acted. Raises and qualifying all-ins reopen action
    /// by clearing everyone else's acted mark.
    pub fn record_action(&mut self, seat: Position, reopens: bool) {
        if reopens {
            self.acted_this_street.clear();
        }
        self.acted_this_street.insert(seat);
    }

    /// The street is over once every seat still able to act voluntarily has
    /// acted and matched `bet_to_match`, or at most one such seat remains.
    pub fn is_street_over(&self, contestable_seats: &[Position], street_bets: &dyn Fn(Position) -> Chips) -> bool {
        if contestable_seats.len() <= 1 {
            return true;
        }
        contestable_seats
            .iter()
            .all(|s| self.acted_this_street.contains(s) && street_bets(*s) == self.bet_to_match)
    }
}
