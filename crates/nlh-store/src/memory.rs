use crate::model::{HandActionRecord, HandPlayerRecord, HandRecord, RoomPlayerRecord, RoomRecord, RoomStatus};
use crate::repository::Repository;
use nlh_core::{Chips, Error, Hand, Position, Result, Room, User, ID};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

struct RoomEntry {
    room: RoomRecord,
    players: HashMap<Uuid, RoomPlayerRecord>,
    hand_numbers: i64,
    last_dealer_seat: Option<Position>,
}

struct HandEntry {
    hand: HandRecord,
    players: HashMap<Uuid, HandPlayerRecord>,
    actions: Vec<HandActionRecord>,
}

/// In-process [`Repository`] backed by two `Mutex`-guarded maps. Used by
/// `nlh-manager`'s tests and by single-process deployments that don't need
/// durability across restarts — the Postgres implementation is the one with
/// a persistence story.
#[derive(Default)]
pub struct MemoryRepository {
    rooms: Mutex<HashMap<Uuid, RoomEntry>>,
    hands: Mutex<HashMap<Uuid, HandEntry>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    async fn create_room(&self, room: RoomRecord) -> Result<()> {
        let mut rooms = self.rooms.lock().await;
        rooms.insert(
            room.id.inner(),
            RoomEntry { room, players: HashMap::new(), hand_numbers: 0, last_dealer_seat: None },
        );
        Ok(())
    }

    async fn get_room(&self, id: ID<Room>) -> Result<RoomRecord> {
        let rooms = self.rooms.lock().await;
        rooms.get(&id.inner()).map(|e| e.room.clone()).ok_or(Error::RoomNotFound)
    }

    async fn set_room_status(&self, id: ID<Room>, status: RoomStatus) -> Result<()> {
        let mut rooms = self.rooms.lock().await;
        let entry = rooms.get_mut(&id.inner()).ok_or(Error::RoomNotFound)?;
        entry.room.status = status;
        Ok(())
    }

    async fn get_room_players(&self, room: ID<Room>) -> Result<Vec<RoomPlayerRecord>> {
        let rooms = self.rooms.lock().await;
        let entry = rooms.get(&room.inner()).ok_or(Error::RoomNotFound)?;
        let mut players: Vec<_> = entry.players.values().cloned().collect();
        players.sort_by_key(|p| p.seat);
        Ok(players)
    }

    async fn put_room_player(&self, player: RoomPlayerRecord) -> Result<()> {
        let mut rooms = self.rooms.lock().await;
        let entry = rooms.get_mut(&player.room_id.inner()).ok_or(Error::RoomNotFound)?;
        entry.players.insert(player.user_id.inner(), player);
        Ok(())
    }

    async fn next_hand_number(&self, room: ID<Room>) -> Result<i64> {
        let mut rooms = self.rooms.lock().await;
        let entry = rooms.get_mut(&room.inner()).ok_or(Error::RoomNotFound)?;
        entry.hand_numbers += 1;
        Ok(entry.hand_numbers)
    }

    async fn last_dealer_seat(&self, room: ID<Room>) -> Result<Option<Position>> {
        let rooms = self.rooms.lock().await;
        rooms.get(&room.inner()).map(|e| e.last_dealer_seat).ok_or(Error::RoomNotFound)
    }

    async fn start_hand(
        &self,
        room: ID<Room>,
        hand: HandRecord,
        players: Vec<HandPlayerRecord>,
        actions: Vec<HandActionRecord>,
    ) -> Result<()> {
        let mut rooms = self.rooms.lock().await;
        let room_entry = rooms.get_mut(&room.inner()).ok_or(Error::RoomNotFound)?;
        room_entry.room.status = RoomStatus::Playing;
        room_entry.last_dealer_seat = Some(hand.dealer_seat);

        let mut hands = self.hands.lock().await;
        hands.insert(
            hand.id.inner(),
            HandEntry {
                players: players.into_iter().map(|p| (p.user_id.inner(), p)).collect(),
                actions,
                hand,
            },
        );
        Ok(())
    }

    async fn get_hand(&self, id: ID<Hand>) -> Result<HandRecord> {
        let hands = self.hands.lock().await;
        hands.get(&id.inner()).map(|e| e.hand.clone()).ok_or(Error::HandNotFound)
    }

    async fn get_hand_players(&self, id: ID<Hand>) -> Result<Vec<HandPlayerRecord>> {
        let hands = self.hands.lock().await;
        let entry = hands.get(&id.inner()).ok_or(Error::HandNotFound)?;
        let mut players: Vec<_> = entry.players.values().cloned().collect();
        players.sort_by_key(|p| p.seat);
        Ok(players)
    }

    async fn get_actions(&self, id: ID<Hand>) -> Result<Vec<HandActionRecord>> {
        let hands = self.hands.lock().await;
        Ok(hands.get(&id.inner()).ok_or(Error::HandNotFound)?.actions.clone())
    }

    async fn apply_update(
        &self,
        hand: HandRecord,
        players: Vec<HandPlayerRecord>,
        new_actions: Vec<HandActionRecord>,
    ) -> Result<()> {
        let mut hands = self.hands.lock().await;
        let entry = hands.get_mut(&hand.id.inner()).ok_or(Error::HandNotFound)?;
        entry.hand = hand;
        entry.players = players.into_iter().map(|p| (p.user_id.inner(), p)).collect();
        entry.actions.extend(new_actions);
        Ok(())
    }

    async fn settle_hand(
        &self,
        room: ID<Room>,
        hand: HandRecord,
        players: Vec<HandPlayerRecord>,
        new_actions: Vec<HandActionRecord>,
        stack_credits: Vec<(ID<User>, Chips)>,
        sitting_out: Vec<ID<User>>,
    ) -> Result<()> {
        let mut hands = self.hands.lock().await;
        let entry = hands.get_mut(&hand.id.inner()).ok_or(Error::HandNotFound)?;
        entry.hand = hand;
        entry.players = players.into_iter().map(|p| (p.user_id.inner(), p)).collect();
        entry.actions.extend(new_actions);
        drop(hands);

        let mut rooms = self.rooms.lock().await;
        let room_entry = rooms.get_mut(&room.inner()).ok_or(Error::RoomNotFound)?;
        for (user_id, credit) in stack_credits {
            if let Some(player) = room_entry.players.get_mut(&user_id.inner()) {
                player.stack += credit;
            }
        }
        for user_id in sitting_out {
            if let Some(player) = room_entry.players.get_mut(&user_id.inner()) {
                player.status = crate::model::RoomPlayerStatus::SittingOut;
            }
        }
        room_entry.room.status = RoomStatus::Waiting;
        Ok(())
    }
}
