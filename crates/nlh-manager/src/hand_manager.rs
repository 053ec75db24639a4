use crate::capability::{ActionExecutor, TurnScheduler};
use crate::publisher::EventPublisher;
use nlh_cards::Deck;
use nlh_core::{Chips, Clock, Error, Hand, Position, Result, Room, User, ID};
use nlh_engine::{Action, Deal, DealEvent, LoggedAction, Phase};
use nlh_dto::{ActionView, Event, EventKind, HandView};
use nlh_store::{HandActionRecord, HandPlayerRecord, HandRecord, Repository, RoomPlayerStatus, RoomRecord};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use uuid::Uuid;

struct LiveHand {
    room_id: ID<Room>,
    hand_number: i64,
    deal: Deal,
    next_seq: i64,
}

/// Hand lifecycle orchestrator: owns the in-flight [`Deal`] for every
/// hand currently being played, and is the only writer of `Hand`/`HandPlayer`/
/// `HandAction` rows through its [`Repository`].
///
/// The shuffled deck's undealt remainder has no relational representation,
/// so the authoritative in-progress state lives here, process-local, keyed
/// by hand id; the store still holds the durable read model (board, hole
/// cards, actions) that `getHand`/`getActions` and any other reader use.
/// That's consistent with this engine's single-process scope —
/// a process restart mid-hand loses the in-flight deck, same as it would
/// lose any other purely in-memory scheduler state.
pub struct HandManager<R: Repository> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    publisher: Arc<EventPublisher>,
    scheduler: OnceLock<Arc<dyn TurnScheduler>>,
    live: Mutex<HashMap<Uuid, Arc<Mutex<LiveHand>>>>,
}

impl<R: Repository> HandManager<R> {
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>, publisher: Arc<EventPublisher>) -> Self {
        Self { repo, clock, publisher, scheduler: OnceLock::new(), live: Mutex::new(HashMap::new()) }
    }

    fn now_millis(&self) -> i64 {
        self.clock.now().as_millis() as i64
    }

    /// Wires the Scheduler in after both it and `self` exist, breaking the
    /// construction-order cycle between the two.
    pub fn set_scheduler(&self, scheduler: Arc<dyn TurnScheduler>) {
        let _ = self.scheduler.set(scheduler);
    }

    pub async fn start_new_hand(&self, room_id: ID<Room>) -> Result<HandView> {
        let room = self.repo.get_room(room_id).await?;
        let room_players = self.repo.get_room_players(room_id).await?;
        let mut eligible: Vec<_> = room_players
            .iter()
            .filter(|p| matches!(p.status, RoomPlayerStatus::Active) && p.stack >= room.big_blind)
            .collect();
        if eligible.len() < 2 {
            return Err(Error::InsufficientPlayers);
        }
        eligible.sort_by_key(|p| p.seat);

        let last_dealer = self.repo.last_dealer_seat(room_id).await?;
        let dealer_seat = next_dealer_seat(&eligible, last_dealer);

        let hand_number = self.repo.next_hand_number(room_id).await?;
        let hand_id: ID<Hand> = ID::default();
        let seats: Vec<(Position, ID<User>, Chips)> = eligible.iter().map(|p| (p.seat, p.user_id, p.stack)).collect();
        let (deal, events) = Deal::start(seats, dealer_seat, room.small_blind, room.big_blind, Deck::new());

        let seat_users: HashMap<Position, ID<User>> = deal.seats().iter().map(|s| (s.seat, s.user_id)).collect();
        let actions = events_to_actions(hand_id, Phase::PreFlop, &events, &seat_users, 0);
        let hand_record = hand_record_of(hand_id, room_id, hand_number, &deal, &room);
        let hand_players = hand_players_of(hand_id, &deal);

        self.repo.start_hand(room_id, hand_record.clone(), hand_players.clone(), actions.clone()).await?;
        log::info!("hand {hand_number} started in room {room_id} ({} seats, dealer {dealer_seat})", hand_players.len());

        let next_seq = actions.len() as i64;
        self.live
            .lock()
            .await
            .insert(hand_id.inner(), Arc::new(Mutex::new(LiveHand { room_id, hand_number, deal, next_seq })));

        // Room broadcasts have no single requester; a fresh id matches no
        // seat, so the shared view never carries a hole card. Hole cards go
        // out separately as `PrivateCards` below.
        let view = HandView::build(&hand_record, &hand_players, &room_players, ID::default(), &BTreeMap::new(), self.current_player(hand_id).await);
        let now = self.now_millis();
        self.publisher.publish_room(room_id, Event::new(room_id, Some(hand_id), now, EventKind::HandStarted { hand: view.clone() }));
        for p in &hand_players {
            self.publisher.publish_private(
                p.user_id,
                Event::new(room_id, Some(hand_id), now, EventKind::PrivateCards { cards: [p.hole[0].code(), p.hole[1].code()] }),
            );
        }
        self.arm_next_turn(hand_id, room_id, &view).await;
        Ok(view)
    }

    pub async fn process_action(&self, hand_id: ID<Hand>, user_id: ID<User>, action: Action) -> Result<HandView> {
        let entry = {
            let live = self.live.lock().await;
            live.get(&hand_id.inner()).cloned().ok_or(Error::HandNotFound)?
        };
        let mut lh = entry.lock().await;

        let phase_before = lh.deal.phase();
        let events = lh.deal.apply_action(user_id, action)?;
        let seat_users: HashMap<Position, ID<User>> = lh.deal.seats().iter().map(|s| (s.seat, s.user_id)).collect();
        let new_actions = events_to_actions(hand_id, phase_before, &events, &seat_users, lh.next_seq);
        lh.next_seq += new_actions.len() as i64;

        let room = self.repo.get_room(lh.room_id).await?;
        let room_id = lh.room_id;
        let hand_record = hand_record_of(hand_id, room_id, lh.hand_number, &lh.deal, &room);
        let hand_players = hand_players_of(hand_id, &lh.deal);
        let terminal = lh.deal.is_terminal();

        if terminal {
            // `won_amount` is the payout from the pot; the room's persisted
            // stack was never debited when the hand started, so the credit
            // applied here must be the net of what came back and what went
            // in, not the raw payout.
            let credits: Vec<(ID<User>, Chips)> = lh.deal.seats().iter().map(|s| (s.user_id, s.won_amount - s.bet_total)).collect();
            // A seat whose stack plus its winnings is zero leaves the table
            // with nothing and sits out until it rebuys.
            let sitting_out: Vec<ID<User>> = lh
                .deal
                .seats()
                .iter()
                .filter(|s| s.stack + s.won_amount == 0)
                .map(|s| s.user_id)
                .collect();
            self.repo
                .settle_hand(room_id, hand_record.clone(), hand_players.clone(), new_actions.clone(), credits, sitting_out)
                .await?;
            log::info!("hand {hand_id} settled in room {room_id}, pot {}", hand_record.pot_total);
        } else {
            self.repo.apply_update(hand_record.clone(), hand_players.clone(), new_actions.clone()).await?;
        }
        drop(lh);
        if terminal {
            self.live.lock().await.remove(&hand_id.inner());
        }

        let room_players = self.repo.get_room_players(room_id).await?;
        let current = self.current_player(hand_id).await;
        // Two views of the same state: the broadcast copy (no single
        // requester, so nobody's hole cards leak to the room channel) and
        // the copy returned to the acting player, who does see their own.
        let broadcast_view = HandView::build(&hand_record, &hand_players, &room_players, ID::default(), &BTreeMap::new(), current);
        let caller_view = HandView::build(&hand_record, &hand_players, &room_players, user_id, &BTreeMap::new(), current);

        self.publish_effects(room_id, hand_id, &events, &broadcast_view);

        if let Some(s) = self.scheduler.get() {
            if terminal {
                s.cancel_timer(hand_id);
                s.schedule_auto_start(room_id);
            } else {
                self.arm_next_turn(hand_id, room_id, &broadcast_view).await;
            }
        }
        Ok(caller_view)
    }

    pub async fn get_current_player_id(&self, hand_id: ID<Hand>) -> Result<Option<ID<User>>> {
        let live = self.live.lock().await;
        if !live.contains_key(&hand_id.inner()) {
            return Err(Error::HandNotFound);
        }
        drop(live);
        Ok(self.current_player(hand_id).await)
    }

    pub async fn get_hand(&self, hand_id: ID<Hand>, requester: ID<User>) -> Result<HandView> {
        let hand = self.repo.get_hand(hand_id).await?;
        let players = self.repo.get_hand_players(hand_id).await?;
        let room_players = self.repo.get_room_players(hand.room_id).await?;
        let current = self.current_player(hand_id).await;
        Ok(HandView::build(&hand, &players, &room_players, requester, &BTreeMap::new(), current))
    }

    pub async fn get_actions(&self, hand_id: ID<Hand>) -> Result<Vec<ActionView>> {
        Ok(self.repo.get_actions(hand_id).await?.iter().map(ActionView::from).collect())
    }

    async fn current_player(&self, hand_id: ID<Hand>) -> Option<ID<User>> {
        let live = self.live.lock().await;
        let entry = live.get(&hand_id.inner())?.clone();
        drop(live);
        let lh = entry.lock().await;
        let seat = lh.deal.current_seat()?;
        lh.deal.seats().iter().find(|s| s.seat == seat).map(|s| s.user_id)
    }

    async fn arm_next_turn(&self, hand_id: ID<Hand>, room_id: ID<Room>, view: &HandView) {
        if let (Some(s), Some(player)) = (self.scheduler.get(), view.current_player_id) {
            s.schedule_turn_timer(hand_id, player, room_id);
        }
    }

    fn publish_effects(&self, room_id: ID<Room>, hand_id: ID<Hand>, events: &[DealEvent], view: &HandView) {
        let now = self.now_millis();
        self.publisher.publish_room(room_id, Event::new(room_id, Some(hand_id), now, EventKind::StateChanged { hand: view.clone() }));
        for event in events {
            match event {
                DealEvent::PlayerActed { seat, action, amount } => {
                    self.publisher.publish_room(
                        room_id,
                        Event::new(room_id, Some(hand_id), now, EventKind::PlayerAction { seat: *seat, action: *action, amount: *amount }),
                    );
                }
                DealEvent::StreetDealt { cards } => {
                    let codes = cards.iter().map(|c| c.code()).collect();
                    self.publisher.publish_room(room_id, Event::new(room_id, Some(hand_id), now, EventKind::CommunityCards { cards: codes }));
                }
                DealEvent::Showdown { .. } => {
                    self.publisher.publish_room(room_id, Event::new(room_id, Some(hand_id), now, EventKind::Showdown { hand: view.clone() }));
                }
                DealEvent::Settled { .. } => {
                    self.publisher.publish_room(room_id, Event::new(room_id, Some(hand_id), now, EventKind::HandSettled { hand: view.clone() }));
                }
                DealEvent::BlindPosted { .. } => {}
            }
        }
        if let Some(player) = view.current_player_id {
            self.publisher.publish_private(player, Event::new(room_id, Some(hand_id), now, EventKind::YourTurn { user_id: player }));
        }
    }
}

#[async_trait::async_trait]
impl<R: Repository> ActionExecutor for HandManager<R> {
    async fn apply_action(&self, hand_id: ID<Hand>, user_id: ID<User>, action: Action) -> Result<()> {
        self.process_action(hand_id, user_id, action).await.map(|_| ())
    }
    async fn start_new_hand(&self, room_id: ID<Room>) -> Result<()> {
        HandManager::start_new_hand(self, room_id).await.map(|_| ())
    }
}

fn next_dealer_seat(eligible: &[&nlh_store::RoomPlayerRecord], last_dealer: Option<Position>) -> Position {
    let mut seats: Vec<Position> = eligible.iter().map(|p| p.seat).collect();
    seats.sort();
    match last_dealer {
        None => seats[0],
        Some(prev) => seats.iter().copied().find(|s| *s > prev).unwrap_or(seats[0]),
    }
}

fn phase_after(p: Phase) -> Phase {
    match p {
        Phase::PreFlop => Phase::Flop,
        Phase::Flop => Phase::Turn,
        Phase::Turn => Phase::River,
        Phase::River | Phase::Showdown | Phase::Settlement => Phase::Showdown,
    }
}

fn events_to_actions(
    hand_id: ID<Hand>,
    mut phase: Phase,
    events: &[DealEvent],
    seats: &HashMap<Position, ID<User>>,
    start_seq: i64,
) -> Vec<HandActionRecord> {
    let mut seq = start_seq;
    let mut out = Vec::new();
    for event in events {
        match event {
            DealEvent::BlindPosted { seat, logged, amount } => {
                seq += 1;
                out.push(HandActionRecord {
                    hand_id,
                    user_id: seats.get(seat).copied(),
                    action_type: *logged,
                    amount: *amount,
                    phase_at_action: phase,
                    sequence_num: seq,
                });
            }
            DealEvent::PlayerActed { seat, action, amount } => {
                seq += 1;
                out.push(HandActionRecord {
                    hand_id,
                    user_id: seats.get(seat).copied(),
                    action_type: LoggedAction::from(*action),
                    amount: *amount,
                    phase_at_action: phase,
                    sequence_num: seq,
                });
            }
            DealEvent::StreetDealt { .. } => {
                phase = phase_after(phase);
                seq += 1;
                let logged = match phase {
                    Phase::Flop => LoggedAction::DealFlop,
                    Phase::Turn => LoggedAction::DealTurn,
                    Phase::River => LoggedAction::DealRiver,
                    _ => unreachable!("street deal only enters Flop/Turn/River"),
                };
                out.push(HandActionRecord { hand_id, user_id: None, action_type: logged, amount: 0, phase_at_action: phase, sequence_num: seq });
            }
            DealEvent::Showdown { .. } => {
                seq += 1;
                out.push(HandActionRecord {
                    hand_id,
                    user_id: None,
                    action_type: LoggedAction::Showdown,
                    amount: 0,
                    phase_at_action: Phase::Showdown,
                    sequence_num: seq,
                });
            }
            DealEvent::Settled { winnings, .. } => {
                for (seat, amount) in winnings {
                    seq += 1;
                    out.push(HandActionRecord {
                        hand_id,
                        user_id: seats.get(seat).copied(),
                        action_type: LoggedAction::Settle,
                        amount: *amount,
                        phase_at_action: Phase::Settlement,
                        sequence_num: seq,
                    });
                }
            }
        }
    }
    out
}

fn hand_record_of(hand_id: ID<Hand>, room_id: ID<Room>, hand_number: i64, deal: &Deal, room: &RoomRecord) -> HandRecord {
    HandRecord {
        id: hand_id,
        room_id,
        hand_number,
        dealer_seat: deal.dealer(),
        small_blind: room.small_blind,
        big_blind: room.big_blind,
        board: deal.board().to_vec(),
        pot_total: deal.pot(),
        phase: deal.phase(),
    }
}

fn hand_players_of(hand_id: ID<Hand>, deal: &Deal) -> Vec<HandPlayerRecord> {
    deal.seats()
        .iter()
        .map(|s| HandPlayerRecord {
            hand_id,
            user_id: s.user_id,
            seat: s.seat,
            hole: s.hole.cards(),
            status: s.status,
            bet_total: s.bet_total,
            won_amount: s.won_amount,
            best_hand: s.shown_strength.map(|st| st.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::EventPublisher;
    use nlh_core::SystemClock;
    use nlh_store::{MemoryRepository, RoomPlayerStatus, RoomRecord, RoomStatus};

    fn user(n: u128) -> ID<User> {
        ID::from(uuid::Uuid::from_u128(n))
    }

    async fn seeded_room(small_blind: i64, seats: &[(usize, u128, i64)]) -> (Arc<MemoryRepository>, ID<Room>) {
        let repo = Arc::new(MemoryRepository::new());
        let room_id = ID::default();
        repo.create_room(RoomRecord {
            id: room_id,
            name: "table".into(),
            owner_id: user(seats[0].1),
            max_seats: 9,
            small_blind,
            big_blind: small_blind * 2,
            min_buy_in: small_blind * 20,
            max_buy_in: small_blind * 200,
            status: RoomStatus::Waiting,
            invite_code: None,
            auto_start_delay_secs: 5,
        })
        .await
        .unwrap();
        for &(seat, id, stack) in seats {
            repo.put_room_player(nlh_store::RoomPlayerRecord {
                room_id,
                user_id: user(id),
                seat,
                status: RoomPlayerStatus::Active,
                stack,
            })
            .await
            .unwrap();
        }
        (repo, room_id)
    }

    fn manager(repo: Arc<MemoryRepository>) -> HandManager<MemoryRepository> {
        HandManager::new(repo, Arc::new(SystemClock), Arc::new(EventPublisher::new()))
    }

    /// §8 scenario 1: heads-up walk-over. Seat 0 is dealer/SB, folds
    /// preflop; seat 1 wins the blinds without a showdown.
    #[tokio::test]
    async fn heads_up_walkover_settles_and_credits_stacks() {
        let (repo, room_id) = seeded_room(10, &[(0, 1, 1000), (1, 2, 1000)]).await;
        let mgr = manager(repo.clone());

        let hand = mgr.start_new_hand(room_id).await.unwrap();
        assert_eq!(hand.current_player_id, Some(user(1))); // heads-up SB acts first

        let settled = mgr.process_action(hand.hand_id, user(1), Action::fold()).await.unwrap();
        assert_eq!(settled.phase, Phase::Settlement);

        let players = repo.get_room_players(room_id).await.unwrap();
        let stack = |id: u128| players.iter().find(|p| p.user_id == user(id)).unwrap().stack;
        assert_eq!(stack(1), 990);
        assert_eq!(stack(2), 1010);
    }

    /// §8 chip/stack conservation invariants, exercised over a hand where
    /// every seat shoves preflop and the board runs out without further
    /// betting (§4.7 Open Question (c)).
    #[tokio::test]
    async fn three_way_all_in_conserves_chips_and_stacks() {
        let (repo, room_id) = seeded_room(10, &[(0, 1, 500), (1, 2, 500), (2, 3, 500)]).await;
        let mgr = manager(repo.clone());
        let before: i64 = repo.get_room_players(room_id).await.unwrap().iter().map(|p| p.stack).sum();

        let mut hand = mgr.start_new_hand(room_id).await.unwrap();
        while hand.phase != Phase::Settlement {
            let current = hand.current_player_id.expect("non-terminal hand always has an actor");
            hand = mgr.process_action(hand.hand_id, current, Action::all_in()).await.unwrap();
        }

        let won: i64 = hand.players.iter().map(|p| p.won_amount).sum();
        assert_eq!(won, 1500);
        let after: i64 = repo.get_room_players(room_id).await.unwrap().iter().map(|p| p.stack).sum();
        assert_eq!(before, after);
    }

    /// §8: an auto-fold timer that fires for a player who already acted is
    /// a no-op (validation rejects it as not-their-turn).
    #[tokio::test]
    async fn auto_fold_after_a_human_action_is_a_harmless_no_op() {
        let (repo, room_id) = seeded_room(10, &[(0, 1, 1000), (1, 2, 1000)]).await;
        let mgr = manager(repo);
        let hand = mgr.start_new_hand(room_id).await.unwrap();

        mgr.process_action(hand.hand_id, user(1), Action::fold()).await.unwrap();
        let result = mgr.process_action(hand.hand_id, user(1), Action::fold()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn get_current_player_id_errors_once_settled() {
        let (repo, room_id) = seeded_room(10, &[(0, 1, 1000), (1, 2, 1000)]).await;
        let mgr = manager(repo);
        let hand = mgr.start_new_hand(room_id).await.unwrap();
        mgr.process_action(hand.hand_id, user(1), Action::fold()).await.unwrap();
        assert!(matches!(mgr.get_current_player_id(hand.hand_id).await, Err(Error::HandNotFound)));
    }
}
