//! Postgres-backed [`Repository`]: every mutating call runs inside one
//! `SELECT ... FOR UPDATE` transaction so that two concurrent calls against
//! the same room or hand serialize instead of interleaving.
use crate::model::{HandActionRecord, HandPlayerRecord, HandRecord, RoomPlayerRecord, RoomRecord, RoomStatus};
use crate::repository::Repository;
use nlh_cards::Card;
use nlh_core::{Chips, Error, Hand, Position, Result, Room, User, ID};
use nlh_engine::{LoggedAction, Phase, SeatStatus};
use tokio::sync::Mutex;
use tokio_postgres::{Client, NoTls};

/// Schema for the five tables backing the persisted domain model.
/// Applied once at startup; idempotent via `IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS rooms (
    id               UUID PRIMARY KEY,
    name             TEXT NOT NULL,
    owner_id         UUID NOT NULL,
    max_seats        INTEGER NOT NULL,
    small_blind      BIGINT NOT NULL,
    big_blind        BIGINT NOT NULL,
    min_buy_in       BIGINT NOT NULL,
    max_buy_in       BIGINT NOT NULL,
    status           TEXT NOT NULL,
    invite_code      TEXT,
    auto_start_delay_secs BIGINT NOT NULL,
    hand_numbers     BIGINT NOT NULL DEFAULT 0,
    last_dealer_seat INTEGER
);
CREATE TABLE IF NOT EXISTS room_players (
    room_id UUID NOT NULL REFERENCES rooms(id),
    user_id UUID NOT NULL,
    seat    INTEGER NOT NULL,
    status  TEXT NOT NULL,
    stack   BIGINT NOT NULL,
    PRIMARY KEY (room_id, user_id)
);
CREATE UNIQUE INDEX IF NOT EXISTS room_players_seat ON room_players (room_id, seat);
CREATE TABLE IF NOT EXISTS hands (
    id          UUID PRIMARY KEY,
    room_id     UUID NOT NULL REFERENCES rooms(id),
    hand_number BIGINT NOT NULL,
    dealer_seat INTEGER NOT NULL,
    small_blind BIGINT NOT NULL,
    big_blind   BIGINT NOT NULL,
    board       TEXT NOT NULL,
    pot_total   BIGINT NOT NULL,
    phase       TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS hand_players (
    hand_id    UUID NOT NULL REFERENCES hands(id),
    user_id    UUID NOT NULL,
    seat       INTEGER NOT NULL,
    hole       TEXT NOT NULL,
    status     TEXT NOT NULL,
    bet_total  BIGINT NOT NULL,
    won_amount BIGINT NOT NULL,
    best_hand  TEXT,
    PRIMARY KEY (hand_id, user_id)
);
CREATE TABLE IF NOT EXISTS hand_actions (
    hand_id         UUID NOT NULL REFERENCES hands(id),
    user_id         UUID,
    action_type     TEXT NOT NULL,
    amount          BIGINT NOT NULL,
    phase_at_action TEXT NOT NULL,
    sequence_num    BIGINT NOT NULL,
    PRIMARY KEY (hand_id, sequence_num)
);
";

/// Holds the connection behind a `Mutex` rather than a bare `Arc<Client>`:
/// `Client::transaction` takes `&mut self`, and `start_hand`/`apply_update`/
/// `settle_hand` all need a real transaction to hold their `FOR UPDATE`
/// locks across several statements. Locking the whole connection for one
/// multi-statement unit of work stands in for a connection pool in this
/// single-process deployment.
pub struct PgRepository {
    client: Mutex<Client>,
}

impl PgRepository {
    /// Connects and spawns the connection driver, mirroring the way the
    /// rest of this workspace's ambient Postgres access is wired.
    pub async fn connect(url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("postgres connection closed: {e}");
            }
        });
        Ok(Self { client: Mutex::new(client) })
    }

    pub async fn migrate(&self) -> Result<()> {
        self.client.lock().await.batch_execute(SCHEMA).await.map_err(|e| Error::Internal(e.to_string()))?;
        Ok(())
    }

    async fn insert_hand_players(txn: &tokio_postgres::Transaction<'_>, players: &[HandPlayerRecord]) -> Result<()> {
        for p in players {
            txn.execute(
                "INSERT INTO hand_players (hand_id, user_id, seat, hole, status, bet_total, won_amount, best_hand)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 ON CONFLICT (hand_id, user_id) DO UPDATE SET
                   seat = $3, hole = $4, status = $5, bet_total = $6, won_amount = $7, best_hand = $8",
                &[
                    &p.hand_id.inner(),
                    &p.user_id.inner(),
                    &(p.seat as i32),
                    &encode_hole(&p.hole),
                    &status_str(p.status),
                    &p.bet_total,
                    &p.won_amount,
                    &p.best_hand,
                ],
            )
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        }
        Ok(())
    }

    async fn insert_actions(txn: &tokio_postgres::Transaction<'_>, actions: &[HandActionRecord]) -> Result<()> {
        for a in actions {
            txn.execute(
                "INSERT INTO hand_actions (hand_id, user_id, action_type, amount, phase_at_action, sequence_num)
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &a.hand_id.inner(),
                    &a.user_id.map(|u| u.inner()),
                    &a.action_type.to_string(),
                    &a.amount,
                    &phase_str(a.phase_at_action),
                    &a.sequence_num,
                ],
            )
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        }
        Ok(())
    }

    async fn update_hand(txn: &tokio_postgres::Transaction<'_>, hand: &HandRecord) -> Result<()> {
        txn.execute(
            "UPDATE hands SET board = $2, pot_total = $3, phase = $4 WHERE id = $1",
            &[&hand.id.inner(), &encode_board(&hand.board), &hand.pot_total, &phase_str(hand.phase)],
        )
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Repository for PgRepository {
    async fn create_room(&self, room: RoomRecord) -> Result<()> {
        self.client
            .lock()
            .await
            .execute(
                "INSERT INTO rooms (id, name, owner_id, max_seats, small_blind, big_blind, min_buy_in, max_buy_in, status, invite_code, auto_start_delay_secs)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
                &[
                    &room.id.inner(),
                    &room.name,
                    &room.owner_id.inner(),
                    &(room.max_seats as i32),
                    &room.small_blind,
                    &room.big_blind,
                    &room.min_buy_in,
                    &room.max_buy_in,
                    &room_status_str(room.status),
                    &room.invite_code,
                    &(room.auto_start_delay_secs as i64),
                ],
            )
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(())
    }

    async fn get_room(&self, id: ID<Room>) -> Result<RoomRecord> {
        let row = self
            .client
            .lock()
            .await
            .query_opt("SELECT * FROM rooms WHERE id = $1", &[&id.inner()])
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
            .ok_or(Error::RoomNotFound)?;
        Ok(RoomRecord {
            id: row.get::<_, uuid::Uuid>("id").into(),
            name: row.get("name"),
            owner_id: row.get::<_, uuid::Uuid>("owner_id").into(),
            max_seats: row.get::<_, i32>("max_seats") as usize,
            small_blind: row.get("small_blind"),
            big_blind: row.get("big_blind"),
            min_buy_in: row.get("min_buy_in"),
            max_buy_in: row.get("max_buy_in"),
            status: parse_room_status(row.get("status")),
            invite_code: row.get("invite_code"),
            auto_start_delay_secs: row.get::<_, i64>("auto_start_delay_secs") as u64,
        })
    }

    async fn set_room_status(&self, id: ID<Room>, status: RoomStatus) -> Result<()> {
        self.client
            .lock()
            .await
            .execute("UPDATE rooms SET status = $2 WHERE id = $1", &[&id.inner(), &room_status_str(status)])
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(())
    }

    async fn get_room_players(&self, room: ID<Room>) -> Result<Vec<RoomPlayerRecord>> {
        let rows = self
            .client
            .lock()
            .await
            .query("SELECT * FROM room_players WHERE room_id = $1 ORDER BY seat", &[&room.inner()])
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|row| RoomPlayerRecord {
                room_id: row.get::<_, uuid::Uuid>("room_id").into(),
                user_id: row.get::<_, uuid::Uuid>("user_id").into(),
                seat: row.get::<_, i32>("seat") as usize,
                status: parse_room_player_status(row.get("status")),
                stack: row.get("stack"),
            })
            .collect())
    }

    async fn put_room_player(&self, player: RoomPlayerRecord) -> Result<()> {
        self.client
            .lock()
            .await
            .execute(
                "INSERT INTO room_players (room_id, user_id, seat, status, stack)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (room_id, user_id) DO UPDATE SET seat = $3, status = $4, stack = $5",
                &[
                    &player.room_id.inner(),
                    &player.user_id.inner(),
                    &(player.seat as i32),
                    &room_player_status_str(player.status),
                    &player.stack,
                ],
            )
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(())
    }

    async fn next_hand_number(&self, room: ID<Room>) -> Result<i64> {
        let row = self
            .client
            .lock()
            .await
            .query_one(
                "UPDATE rooms SET hand_numbers = hand_numbers + 1 WHERE id = $1 RETURNING hand_numbers",
                &[&room.inner()],
            )
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(row.get("hand_numbers"))
    }

    async fn last_dealer_seat(&self, room: ID<Room>) -> Result<Option<Position>> {
        let row = self
            .client
            .lock()
            .await
            .query_one("SELECT last_dealer_seat FROM rooms WHERE id = $1", &[&room.inner()])
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(row.get::<_, Option<i32>>("last_dealer_seat").map(|s| s as usize))
    }

    async fn start_hand(
        &self,
        room: ID<Room>,
        hand: HandRecord,
        players: Vec<HandPlayerRecord>,
        actions: Vec<HandActionRecord>,
    ) -> Result<()> {
        let mut client = self.client.lock().await;
        let txn = client.transaction().await.map_err(|e| Error::Internal(e.to_string()))?;
        txn.query_opt("SELECT id FROM rooms WHERE id = $1 FOR UPDATE", &[&room.inner()])
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
            .ok_or(Error::RoomNotFound)?;

        txn.execute(
            "INSERT INTO hands (id, room_id, hand_number, dealer_seat, small_blind, big_blind, board, pot_total, phase)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            &[
                &hand.id.inner(),
                &hand.room_id.inner(),
                &hand.hand_number,
                &(hand.dealer_seat as i32),
                &hand.small_blind,
                &hand.big_blind,
                &encode_board(&hand.board),
                &hand.pot_total,
                &phase_str(hand.phase),
            ],
        )
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;

        Self::insert_hand_players(&txn, &players).await?;
        Self::insert_actions(&txn, &actions).await?;
        txn.execute(
            "UPDATE rooms SET status = $2, last_dealer_seat = $3 WHERE id = $1",
            &[&room.inner(), &room_status_str(RoomStatus::Playing), &(hand.dealer_seat as i32)],
        )
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;

        txn.commit().await.map_err(|e| Error::Internal(e.to_string()))?;
        Ok(())
    }

    async fn get_hand(&self, id: ID<Hand>) -> Result<HandRecord> {
        let row = self
            .client
            .lock()
            .await
            .query_opt("SELECT * FROM hands WHERE id = $1", &[&id.inner()])
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
            .ok_or(Error::HandNotFound)?;
        Ok(HandRecord {
            id: row.get::<_, uuid::Uuid>("id").into(),
            room_id: row.get::<_, uuid::Uuid>("room_id").into(),
            hand_number: row.get("hand_number"),
            dealer_seat: row.get::<_, i32>("dealer_seat") as usize,
            small_blind: row.get("small_blind"),
            big_blind: row.get("big_blind"),
            board: decode_board(row.get("board")),
            pot_total: row.get("pot_total"),
            phase: parse_phase(row.get("phase")),
        })
    }

    async fn get_hand_players(&self, id: ID<Hand>) -> Result<Vec<HandPlayerRecord>> {
        let rows = self
            .client
            .lock()
            .await
            .query("SELECT * FROM hand_players WHERE hand_id = $1 ORDER BY seat", &[&id.inner()])
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|row| HandPlayerRecord {
                hand_id: row.get::<_, uuid::Uuid>("hand_id").into(),
                user_id: row.get::<_, uuid::Uuid>("user_id").into(),
                seat: row.get::<_, i32>("seat") as usize,
                hole: decode_hole(row.get("hole")),
                status: parse_seat_status(row.get("status")),
                bet_total: row.get("bet_total"),
                won_amount: row.get("won_amount"),
                best_hand: row.get("best_hand"),
            })
            .collect())
    }

    async fn get_actions(&self, id: ID<Hand>) -> Result<Vec<HandActionRecord>> {
        let rows = self
            .client
            .lock()
            .await
            .query(
                "SELECT * FROM hand_actions WHERE hand_id = $1 ORDER BY sequence_num",
                &[&id.inner()],
            )
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|row| HandActionRecord {
                hand_id: row.get::<_, uuid::Uuid>("hand_id").into(),
                user_id: row.get::<_, Option<uuid::Uuid>>("user_id").map(ID::from),
                action_type: parse_logged_action(row.get("action_type")),
                amount: row.get("amount"),
                phase_at_action: parse_phase(row.get("phase_at_action")),
                sequence_num: row.get("sequence_num"),
            })
            .collect())
    }

    async fn apply_update(
        &self,
        hand: HandRecord,
        players: Vec<HandPlayerRecord>,
        new_actions: Vec<HandActionRecord>,
    ) -> Result<()> {
        let mut client = self.client.lock().await;
        let txn = client.transaction().await.map_err(|e| Error::Internal(e.to_string()))?;
        txn.query_opt("SELECT id FROM hands WHERE id = $1 FOR UPDATE", &[&hand.id.inner()])
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
            .ok_or(Error::HandNotFound)?;

        Self::update_hand(&txn, &hand).await?;
        Self::insert_hand_players(&txn, &players).await?;
        Self::insert_actions(&txn, &new_actions).await?;
        txn.commit().await.map_err(|e| Error::Internal(e.to_string()))?;
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
        let mut client = self.client.lock().await;
        let txn = client.transaction().await.map_err(|e| Error::Internal(e.to_string()))?;
        txn.query_opt("SELECT id FROM hands WHERE id = $1 FOR UPDATE", &[&hand.id.inner()])
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
            .ok_or(Error::HandNotFound)?;
        txn.query_opt("SELECT id FROM rooms WHERE id = $1 FOR UPDATE", &[&room.inner()])
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
            .ok_or(Error::RoomNotFound)?;

        Self::update_hand(&txn, &hand).await?;
        Self::insert_hand_players(&txn, &players).await?;
        Self::insert_actions(&txn, &new_actions).await?;
        for (user_id, credit) in stack_credits {
            txn.execute(
                "UPDATE room_players SET stack = stack + $3 WHERE room_id = $1 AND user_id = $2",
                &[&room.inner(), &user_id.inner(), &credit],
            )
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        }
        for user_id in sitting_out {
            txn.execute(
                "UPDATE room_players SET status = $3 WHERE room_id = $1 AND user_id = $2",
                &[&room.inner(), &user_id.inner(), &room_player_status_str(crate::model::RoomPlayerStatus::SittingOut)],
            )
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        }
        txn.execute(
            "UPDATE rooms SET status = $2 WHERE id = $1",
            &[&room.inner(), &room_status_str(RoomStatus::Waiting)],
        )
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;

        txn.commit().await.map_err(|e| Error::Internal(e.to_string()))?;
        Ok(())
    }
}

fn room_status_str(s: RoomStatus) -> &'static str {
    match s {
        RoomStatus::Waiting => "WAITING",
        RoomStatus::Playing => "PLAYING",
        RoomStatus::Closed => "CLOSED",
    }
}
fn parse_room_status(s: String) -> RoomStatus {
    match s.as_str() {
        "PLAYING" => RoomStatus::Playing,
        "CLOSED" => RoomStatus::Closed,
        _ => RoomStatus::Waiting,
    }
}
fn room_player_status_str(s: crate::model::RoomPlayerStatus) -> &'static str {
    use crate::model::RoomPlayerStatus::*;
    match s {
        Active => "ACTIVE",
        Left => "LEFT",
        SittingOut => "SITTING_OUT",
    }
}
fn parse_room_player_status(s: String) -> crate::model::RoomPlayerStatus {
    use crate::model::RoomPlayerStatus::*;
    match s.as_str() {
        "LEFT" => Left,
        "SITTING_OUT" => SittingOut,
        _ => Active,
    }
}
fn status_str(s: SeatStatus) -> &'static str {
    match s {
        SeatStatus::Active => "ACTIVE",
        SeatStatus::Folded => "FOLDED",
        SeatStatus::AllIn => "ALL_IN",
    }
}
fn parse_seat_status(s: String) -> SeatStatus {
    match s.as_str() {
        "FOLDED" => SeatStatus::Folded,
        "ALL_IN" => SeatStatus::AllIn,
        _ => SeatStatus::Active,
    }
}
fn phase_str(p: Phase) -> &'static str {
    match p {
        Phase::PreFlop => "PRE_FLOP",
        Phase::Flop => "FLOP",
        Phase::Turn => "TURN",
        Phase::River => "RIVER",
        Phase::Showdown => "SHOWDOWN",
        Phase::Settlement => "SETTLEMENT",
    }
}
fn parse_phase(p: String) -> Phase {
    match p.as_str() {
        "FLOP" => Phase::Flop,
        "TURN" => Phase::Turn,
        "RIVER" => Phase::River,
        "SHOWDOWN" => Phase::Showdown,
        "SETTLEMENT" => Phase::Settlement,
        _ => Phase::PreFlop,
    }
}
fn parse_logged_action(s: String) -> LoggedAction {
    match s.as_str() {
        "SMALL_BLIND" => LoggedAction::SmallBlind,
        "BIG_BLIND" => LoggedAction::BigBlind,
        "CHECK" => LoggedAction::Check,
        "CALL" => LoggedAction::Call,
        "RAISE" => LoggedAction::Raise,
        "FOLD" => LoggedAction::Fold,
        "ALL_IN" => LoggedAction::AllIn,
        "DEAL_FLOP" => LoggedAction::DealFlop,
        "DEAL_TURN" => LoggedAction::DealTurn,
        "DEAL_RIVER" => LoggedAction::DealRiver,
        "SHOWDOWN" => LoggedAction::Showdown,
        _ => LoggedAction::Settle,
    }
}

fn encode_board(cards: &[Card]) -> String {
    cards.iter().map(|c| c.code()).collect::<Vec<_>>().join(",")
}
fn decode_board(s: String) -> Vec<Card> {
    if s.is_empty() {
        return Vec::new();
    }
    s.split(',').map(|code| Card::try_from(code).expect("persisted card codes are always valid")).collect()
}
fn encode_hole(hole: &[Card; 2]) -> String {
    format!("{},{}", hole[0].code(), hole[1].code())
}
fn decode_hole(s: String) -> [Card; 2] {
    let cards = decode_board(s);
    [cards[0], cards[1]]
}
