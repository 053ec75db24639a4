use crate::view::HandView;
use nlh_core::{Chips, Hand, Position, Room, User, ID};
use nlh_engine::ActionKind;

/// One outbound message. Tagged by `type` on the
/// wire so a client can dispatch on a single field instead of probing an
/// opaque payload map.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum EventKind {
    HandStarted { hand: HandView },
    PlayerAction { seat: Position, action: ActionKind, amount: Chips },
    StateChanged { hand: HandView },
    CommunityCards { cards: Vec<String> },
    Showdown { hand: HandView },
    HandSettled { hand: HandView },
    PlayerJoined { user_id: ID<User>, seat: Position },
    PlayerLeft { user_id: ID<User> },
    YourTurn { user_id: ID<User> },
    /// Private hole-card delivery: published to the `cards` queue of
    /// exactly one user, never broadcast to the room.
    PrivateCards { cards: [String; 2] },
}

/// The envelope every event carries regardless of kind.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Event {
    pub room_id: ID<Room>,
    pub hand_id: Option<ID<Hand>>,
    pub timestamp_millis: i64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(room_id: ID<Room>, hand_id: Option<ID<Hand>>, timestamp_millis: i64, kind: EventKind) -> Self {
        Self { room_id, hand_id, timestamp_millis, kind }
    }
}
