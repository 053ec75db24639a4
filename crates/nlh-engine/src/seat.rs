use nlh_cards::{Hole, Strength};
use nlh_core::{Chips, Position, User, ID};

/// A participant's status within one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SeatStatus {
    Active,
    Folded,
    AllIn,
}

/// Per-hand participation for one seat.
#[derive(Debug, Clone)]
pub struct SeatState {
    pub seat: Position,
    pub user_id: ID<User>,
    pub stack: Chips,
    pub hole: Hole,
    pub status: SeatStatus,
    /// Chips committed to the current street only; reset on each street entry.
    pub street_bet: Chips,
    /// Chips committed to this hand across all streets.
    pub bet_total: Chips,
    /// Credited at settlement.
    pub won_amount: Chips,
    /// Whether this seat has acted at least once this street.
    pub acted_this_street: bool,
    /// Best 5-card category at showdown, if this seat reached it.
    pub shown_strength: Option<Strength>,
}

impl SeatState {
    pub fn new(seat: Position, user_id: ID<User>, stack: Chips, hole: Hole) -> Self {
        Self {
            seat,
            user_id,
            stack,
            hole,
            status: SeatStatus::Active,
            street_bet: 0,
            bet_total: 0,
            won_amount: 0,
            acted_this_street: false,
            shown_strength: None,
        }
    }

    pub fn is_folded(&self) -> bool {
        self.status == SeatStatus::Folded
    }
    pub fn is_all_in(&self) -> bool {
        self.status == SeatStatus::AllIn
    }
    /// Still in the hand and able to take further voluntary action.
    pub fn can_act(&self) -> bool {
        self.status == SeatStatus::Active
    }

    /// Commits `amount` from the stack to the current street and pot,
    /// transitioning to `AllIn` if the stack is exhausted.
    pub fn commit(&mut self, amount: Chips) {
        debug_assert!(amount <= self.stack, "cannot commit more than remaining stack");
        self.stack -= amount;
        self.street_bet += amount;
        self.bet_total += amount;
        if self.stack == 0 && self.status == SeatStatus::Active {
            self.status = SeatStatus::AllIn;
        }
    }

    pub fn reset_street(&mut self) {
        self.street_bet = 0;
        self.acted_this_street = false;
    }
}
