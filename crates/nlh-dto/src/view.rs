use nlh_core::{Chips, Hand, Position, Room, User, ID};
use nlh_engine::{Phase, SeatStatus};
use nlh_store::{HandPlayerRecord, HandRecord, RoomPlayerRecord};
use std::collections::BTreeMap;

/// One seat's view of a hand, with hole cards filtered per the visibility
/// rule: visible to the requester always, and to everyone else only once
/// the hand reaches SHOWDOWN/SETTLEMENT and the seat didn't fold.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HandPlayerView {
    pub user_id: ID<User>,
    pub nickname: Option<String>,
    pub seat: Position,
    pub stack: Chips,
    pub status: SeatStatus,
    pub bet_total: Chips,
    pub won_amount: Chips,
    pub hole_cards: Option<[String; 2]>,
    pub best_hand: Option<String>,
}

/// The projection returned by `getHand`. Built by joining a hand, its
/// players, and the owning room's players in memory — three queries, no
/// N+1 per player.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HandView {
    pub hand_id: ID<Hand>,
    pub room_id: ID<Room>,
    pub hand_number: i64,
    pub phase: Phase,
    pub community_cards: Vec<String>,
    pub pot_total: Chips,
    pub current_player_id: Option<ID<User>>,
    pub players: Vec<HandPlayerView>,
}

impl HandView {
    fn reveals(phase: Phase, status: SeatStatus) -> bool {
        matches!(phase, Phase::Showdown | Phase::Settlement) && !matches!(status, SeatStatus::Folded)
    }

    pub fn build(
        hand: &HandRecord,
        hand_players: &[HandPlayerRecord],
        room_players: &[RoomPlayerRecord],
        requester: ID<User>,
        nicknames: &BTreeMap<ID<User>, String>,
        current_player_id: Option<ID<User>>,
    ) -> Self {
        let stacks: BTreeMap<ID<User>, Chips> = room_players.iter().map(|p| (p.user_id, p.stack)).collect();
        let players = hand_players
            .iter()
            .map(|p| {
                let visible = p.user_id == requester || Self::reveals(hand.phase, p.status);
                HandPlayerView {
                    user_id: p.user_id,
                    nickname: nicknames.get(&p.user_id).cloned(),
                    seat: p.seat,
                    stack: stacks.get(&p.user_id).copied().unwrap_or(0),
                    status: p.status,
                    bet_total: p.bet_total,
                    won_amount: p.won_amount,
                    hole_cards: visible.then(|| [p.hole[0].code(), p.hole[1].code()]),
                    best_hand: if visible { p.best_hand.clone() } else { None },
                }
            })
            .collect();

        Self {
            hand_id: hand.id,
            room_id: hand.room_id,
            hand_number: hand.hand_number,
            phase: hand.phase,
            community_cards: hand.board.iter().map(|c| c.code()).collect(),
            pot_total: hand.pot_total,
            current_player_id,
            players,
        }
    }
}

/// One row of `getActions`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ActionView {
    pub user_id: Option<ID<User>>,
    pub action_type: nlh_engine::LoggedAction,
    pub amount: Chips,
    pub phase_at_action: Phase,
    pub sequence_num: i64,
}

impl From<&nlh_store::HandActionRecord> for ActionView {
    fn from(a: &nlh_store::HandActionRecord) -> Self {
        Self {
            user_id: a.user_id,
            action_type: a.action_type,
            amount: a.amount,
            phase_at_action: a.phase_at_action,
            sequence_num: a.sequence_num,
        }
    }
}
