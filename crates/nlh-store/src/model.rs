use nlh_cards::Card;
use nlh_core::{Chips, Hand, Position, Room, SequenceNum, User, ID};
use nlh_engine::{LoggedAction, Phase, SeatStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RoomStatus {
    Waiting,
    Playing,
    Closed,
}

/// Table configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RoomRecord {
    pub id: ID<Room>,
    pub name: String,
    pub owner_id: ID<User>,
    pub max_seats: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
    pub status: RoomStatus,
    pub invite_code: Option<String>,
    pub auto_start_delay_secs: u64,
}

impl RoomRecord {
    /// Validates the invariants named in §3: SB/BB ratio, non-empty buy-in
    /// range, and a seat count the engine can actually seat.
    pub fn validate(&self) -> nlh_core::Result<()> {
        if self.big_blind != self.small_blind * 2 {
            return Err(nlh_core::Error::InvalidBlindRatio);
        }
        if self.min_buy_in > self.max_buy_in || self.min_buy_in <= 0 {
            return Err(nlh_core::Error::InvalidBuyInRange);
        }
        if !(nlh_core::MIN_SEATS..=nlh_core::MAX_SEATS).contains(&self.max_seats) {
            return Err(nlh_core::Error::InvalidSeatCount);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RoomPlayerStatus {
    Active,
    Left,
    SittingOut,
}

/// Membership at a seat.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RoomPlayerRecord {
    pub room_id: ID<Room>,
    pub user_id: ID<User>,
    pub seat: Position,
    pub status: RoomPlayerStatus,
    pub stack: Chips,
}

/// One dealt round.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HandRecord {
    pub id: ID<Hand>,
    pub room_id: ID<Room>,
    pub hand_number: i64,
    pub dealer_seat: Position,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub board: Vec<Card>,
    pub pot_total: Chips,
    pub phase: Phase,
}

/// Per-hand participation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HandPlayerRecord {
    pub hand_id: ID<Hand>,
    pub user_id: ID<User>,
    pub seat: Position,
    pub hole: [Card; 2],
    pub status: SeatStatus,
    pub bet_total: Chips,
    pub won_amount: Chips,
    pub best_hand: Option<String>,
}

/// Append-only action log entry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HandActionRecord {
    pub hand_id: ID<Hand>,
    pub user_id: Option<ID<User>>,
    pub action_type: LoggedAction,
    pub amount: Chips,
    pub phase_at_action: Phase,
    pub sequence_num: SequenceNum,
}
