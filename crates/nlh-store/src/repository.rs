use crate::model::{HandActionRecord, HandPlayerRecord, HandRecord, RoomPlayerRecord, RoomRecord, RoomStatus};
use nlh_core::{Chips, Hand, Position, Result, Room, User, ID};

/// Persists rooms, hands, and the action log, and owns the row-level
/// locking that makes `start_hand`/`apply_update` safe to call concurrently
/// for the same room or hand.
///
/// Every method here is one atomic unit of work. Implementations are free
/// to choose how that's enforced — a single `Mutex` per id for
/// [`MemoryRepository`], a `SELECT ... FOR UPDATE` transaction for a
/// Postgres-backed one — as long as two concurrent calls touching the same
/// room or hand never interleave.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    async fn create_room(&self, room: RoomRecord) -> Result<()>;
    async fn get_room(&self, id: ID<Room>) -> Result<RoomRecord>;
    async fn set_room_status(&self, id: ID<Room>, status: RoomStatus) -> Result<()>;

    async fn get_room_players(&self, room: ID<Room>) -> Result<Vec<RoomPlayerRecord>>;
    /// Inserts or updates a seat. Implementations lock the room row for the
    /// duration of the call so two joins can't race onto the same seat.
    async fn put_room_player(&self, player: RoomPlayerRecord) -> Result<()>;

    async fn next_hand_number(&self, room: ID<Room>) -> Result<i64>;
    async fn last_dealer_seat(&self, room: ID<Room>) -> Result<Option<Position>>;

    /// Locks the room row, inserts the new hand, its seated players, and its
    /// blind-post actions, and flips the room to `Playing`, all in one
    /// transaction.
    async fn start_hand(
        &self,
        room: ID<Room>,
        hand: HandRecord,
        players: Vec<HandPlayerRecord>,
        actions: Vec<HandActionRecord>,
    ) -> Result<()>;

    async fn get_hand(&self, id: ID<Hand>) -> Result<HandRecord>;
    async fn get_hand_players(&self, id: ID<Hand>) -> Result<Vec<HandPlayerRecord>>;
    async fn get_actions(&self, id: ID<Hand>) -> Result<Vec<HandActionRecord>>;

    /// Locks the hand row, appends `new_actions` under freshly assigned
    /// sequence numbers, and stores the hand/player rows as given. Used
    /// after every `processAction` call that does not reach SETTLEMENT.
    async fn apply_update(
        &self,
        hand: HandRecord,
        players: Vec<HandPlayerRecord>,
        new_actions: Vec<HandActionRecord>,
    ) -> Result<()>;

    /// Same as [`apply_update`](Self::apply_update), but additionally
    /// credits `stack_credits` onto the matching room-player rows, marks
    /// every user in `sitting_out` as `SITTING_OUT`, and returns the room to
    /// `Waiting`, all under both the hand lock and the room lock.
    async fn settle_hand(
        &self,
        room: ID<Room>,
        hand: HandRecord,
        players: Vec<HandPlayerRecord>,
        new_actions: Vec<HandActionRecord>,
        stack_credits: Vec<(ID<User>, Chips)>,
        sitting_out: Vec<ID<User>>,
    ) -> Result<()>;
}
