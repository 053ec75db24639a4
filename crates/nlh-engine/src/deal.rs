use crate::action::{Action, ActionKind, LoggedAction};
use crate::betting::BettingRound;
use crate::pot::{Contribution, Pot, PotCalculator};
use crate::seat::{SeatState, SeatStatus};
use crate::showdown::ShowdownResolver;
use crate::validator::{ActionValidator, Effect, ValidationContext};
use nlh_cards::{Card, Deck, Evaluator, Strength};
use nlh_core::{Chips, Error, Position, Result, User, ID};
use std::collections::BTreeMap;

/// The hand state machine's phase. `Waiting` never appears here: a
/// `Deal` is only ever constructed already in `PreFlop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    Settlement,
}

/// Something that happened while applying an action or starting a hand, in
/// the order it happened. The caller (Hand Manager) turns these into
/// persisted `HandAction` rows and outbound events.
#[derive(Debug, Clone)]
pub enum DealEvent {
    BlindPosted { seat: Position, logged: LoggedAction, amount: Chips },
    PlayerActed { seat: Position, action: ActionKind, amount: Chips },
    StreetDealt { cards: Vec<Card> },
    Showdown { strengths: BTreeMap<Position, Strength> },
    Settled { winnings: BTreeMap<Position, Chips>, sat_out: Vec<Position> },
}

/// The runtime state of one hand in progress. `Deal` owns no
/// persistence and no IDs beyond the opaque user id per seat; the Hand
/// Manager is responsible for turning this into `Hand`/`HandPlayer` rows.
pub struct Deal {
    phase: Phase,
    board: Vec<Card>,
    deck: Deck,
    dealer: Position,
    small_blind: Chips,
    big_blind: Chips,
    pot: Chips,
    seats: Vec<SeatState>,
    betting: BettingRound,
}

impl Deal {
    /// PRE_FLOP entry: deals hole cards, posts blinds, and opens the
    /// first betting round. `seats` must already be sorted by seat number and
    /// contain only ACTIVE room players with stack >= big blind.
    pub fn start(
        mut seats: Vec<(Position, ID<User>, Chips)>,
        dealer: Position,
        small_blind: Chips,
        big_blind: Chips,
        mut deck: Deck,
    ) -> (Self, Vec<DealEvent>) {
        seats.sort_by_key(|(pos, _, _)| *pos);
        let order: Vec<Position> = seats.iter().map(|(p, _, _)| *p).collect();
        let mut states: Vec<SeatState> = seats
            .into_iter()
            .map(|(pos, user, stack)| {
                let hole = deck.deal(2).expect("at least 2 cards for each seat");
                SeatState::new(pos, user, stack, nlh_cards::Hole::new(hole[0], hole[1]))
            })
            .collect();

        let heads_up = states.len() == 2;
        // Heads-up: the dealer posts the small blind and acts first
        // preflop. Otherwise SB/BB are the two seats clockwise of the
        // dealer and first-to-act is the seat after BB.
        let (sb_seat, bb_seat) = if heads_up {
            (dealer, next_in(&order, dealer))
        } else {
            let sb = next_in(&order, dealer);
            (sb, next_in(&order, sb))
        };

        let mut events = Vec::new();
        let mut pot = 0;
        for (seat, logged, amount) in [(sb_seat, LoggedAction::SmallBlind, small_blind), (bb_seat, LoggedAction::BigBlind, big_blind)] {
            let s = states.iter_mut().find(|s| s.seat == seat).expect("blind seat exists");
            s.commit(amount);
            pot += amount;
            events.push(DealEvent::BlindPosted { seat, logged, amount });
        }

        let first_to_act = if heads_up { sb_seat } else { next_in(&order, bb_seat) };
        let betting = BettingRound::new(big_blind, big_blind, Some(first_to_act));

        let deal = Self {
            phase: Phase::PreFlop,
            board: Vec::new(),
            deck,
            dealer,
            small_blind,
            big_blind,
            pot,
            seats: states,
            betting,
        };
        (deal, events)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn board(&self) -> &[Card] {
        &self.board
    }
    pub fn pot(&self) -> Chips {
        self.pot
    }
    pub fn dealer(&self) -> Position {
        self.dealer
    }
    pub fn seats(&self) -> &[SeatState] {
        &self.seats
    }
    pub fn current_seat(&self) -> Option<Position> {
        if self.is_terminal() {
            None
        } else {
            self.betting.current_seat
        }
    }
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Settlement)
    }

    fn seat_order(&self) -> Vec<Position> {
        self.seats.iter().map(|s| s.seat).collect()
    }
    fn clockwise_from_button(&self) -> Vec<Position> {
        let order = self.seat_order();
        let start = order.iter().position(|s| *s == self.dealer).unwrap_or(0);
        order[start..].iter().chain(order[..start].iter()).copied().collect()
    }
    fn non_folded_seats(&self) -> Vec<Position> {
        self.seats.iter().filter(|s| !s.is_folded()).map(|s| s.seat).collect()
    }
    fn contestable_seats(&self) -> Vec<Position> {
        self.seats.iter().filter(|s| s.can_act()).map(|s| s.seat).collect()
    }

    /// Applies one validated player action and drives the state machine
    /// forward through however many automatic transitions follow it:
    /// street advances, all-in auto-run, fast-forward to settlement, and
    /// showdown all happen inline here so the caller always receives the
    /// fully-settled consequences of one human decision.
    pub fn apply_action(&mut self, user_id: ID<User>, action: Action) -> Result<Vec<DealEvent>> {
        let seat_idx = self.seats.iter().position(|s| s.user_id == user_id).ok_or(Error::NotYourTurn)?;
        let seat = self.seats[seat_idx].seat;
        let is_turn = self.current_seat() == Some(seat);

        let ctx = {
            let s = &self.seats[seat_idx];
            ValidationContext {
                is_players_turn: is_turn,
                seat_is_active: s.can_act(),
                bet_to_match: self.betting.bet_to_match,
                street_bet: s.street_bet,
                stack: s.stack,
                last_raise_size: self.betting.last_raise_size,
                big_blind: self.big_blind,
            }
        };
        let effect = ActionValidator::validate(ctx, action)?;

        let mut events = vec![self.apply_effect(seat_idx, action.kind, effect)];
        self.advance(&mut events);
        Ok(events)
    }

    fn apply_effect(&mut self, seat_idx: usize, kind: ActionKind, effect: Effect) -> DealEvent {
        let seat = self.seats[seat_idx].seat;
        let amount = match effect {
            Effect::Check => {
                self.betting.record_action(seat, false);
                0
            }
            Effect::Call { amount, .. } => {
                self.seats[seat_idx].commit(amount);
                self.pot += amount;
                self.betting.record_action(seat, false);
                amount
            }
            Effect::Raise { amount, to_street_bet } => {
                self.seats[seat_idx].commit(amount);
                self.pot += amount;
                self.betting.last_raise_size = to_street_bet - self.betting.bet_to_match;
                self.betting.bet_to_match = to_street_bet;
                self.betting.record_action(seat, true);
                amount
            }
            Effect::AllIn { amount, to_street_bet, reopens } => {
                self.seats[seat_idx].commit(amount);
                self.pot += amount;
                if to_street_bet > self.betting.bet_to_match {
                    if reopens {
                        self.betting.last_raise_size = to_street_bet - self.betting.bet_to_match;
                    }
                    self.betting.bet_to_match = to_street_bet;
                }
                self.betting.record_action(seat, reopens);
                amount
            }
            Effect::Fold => {
                self.seats[seat_idx].status = SeatStatus::Folded;
                self.betting.acted_this_street.insert(seat);
                0
            }
        };
        DealEvent::PlayerActed { seat, action: kind, amount }
    }

    /// Drives the state machine through every automatic transition that
    /// follows an action: fast-forward on a walkover, auto-run when no one
    /// can act further, or the ordinary next-street deal.
    fn advance(&mut self, events: &mut Vec<DealEvent>) {
        loop {
            if self.non_folded_seats().len() <= 1 {
                self.fast_forward(events);
                return;
            }
            if !self.is_street_over() {
                self.set_next_actor();
                return;
            }
            if self.phase == Phase::River {
                self.enter_showdown(events);
                return;
            }
            self.deal_next_street(events);
            if self.contestable_seats().len() <= 1 {
                // Remaining players are all-in: keep dealing without betting
                // rather than looping back into `is_street_over` with no one
                // left to act (§4.7 Open Question (c): deal-out-without-betting).
                continue;
            }
            self.set_next_actor();
            return;
        }
    }

    fn is_street_over(&self) -> bool {
        let contestable = self.contestable_seats();
        let bet = |s: Position| self.seats.iter().find(|x| x.seat == s).map(|x| x.street_bet).unwrap_or(0);
        self.betting.is_street_over(&contestable, &bet)
    }

    fn set_next_actor(&mut self) {
        let current = self.betting.current_seat.unwrap_or(self.dealer);
        let order = self.seat_order();
        let mut candidate = next_in(&order, current);
        for _ in 0..order.len() {
            if let Some(s) = self.seats.iter().find(|s| s.seat == candidate) {
                if s.can_act() {
                    self.betting.current_seat = Some(candidate);
                    return;
                }
            }
            candidate = next_in(&order, candidate);
        }
        self.betting.current_seat = None;
    }

    fn deal_next_street(&mut self, events: &mut Vec<DealEvent>) {
        for s in &mut self.seats {
            s.reset_street();
        }
        self.phase = match self.phase {
            Phase::PreFlop => Phase::Flop,
            Phase::Flop => Phase::Turn,
            Phase::Turn => Phase::River,
            Phase::River | Phase::Showdown | Phase::Settlement => unreachable!("no street follows the river"),
        };
        let n = match self.phase {
            Phase::Flop => 3,
            Phase::Turn | Phase::River => 1,
            _ => unreachable!(),
        };
        let cards = self.deck.deal(n).expect("deck never runs out across one hand");
        self.board.extend(cards.iter().copied());
        self.betting = BettingRound::new(0, self.big_blind, None);
        events.push(DealEvent::StreetDealt { cards });
    }

    fn contributions(&self) -> Vec<Contribution> {
        self.seats
            .iter()
            .map(|s| Contribution { seat: s.seat, bet_total: s.bet_total, folded: s.is_folded() })
            .collect()
    }

    fn pots(&self) -> Vec<Pot> {
        PotCalculator::calculate(&self.contributions())
    }

    fn enter_showdown(&mut self, events: &mut Vec<DealEvent>) {
        self.phase = Phase::Showdown;
        let mut strengths = BTreeMap::new();
        for seat in &mut self.seats {
            if seat.is_folded() {
                continue;
            }
            let mut cards = seat.hole.cards().to_vec();
            cards.extend(self.board.iter().copied());
            let strength = Strength::from(Evaluator::from(nlh_cards::Combo::from(cards)));
            seat.shown_strength = Some(strength);
            strengths.insert(seat.seat, strength);
        }
        events.push(DealEvent::Showdown { strengths: strengths.clone() });
        self.settle(Some(strengths), events);
    }

    /// Walkover: every other seat folded. The winner takes the whole pot
    /// without revealing hole cards or running an evaluation.
    fn fast_forward(&mut self, events: &mut Vec<DealEvent>) {
        self.settle(None, events);
    }

    fn settle(&mut self, strengths: Option<BTreeMap<Position, Strength>>, events: &mut Vec<DealEvent>) {
        let winnings = match strengths {
            Some(strengths) => {
                let button_order = self.clockwise_from_button();
                ShowdownResolver::resolve(&self.pots(), &strengths, &button_order)
            }
            None => {
                let winner = self.non_folded_seats().into_iter().next().expect("one seat remains");
                BTreeMap::from([(winner, self.pot)])
            }
        };
        let mut sat_out = Vec::new();
        for seat in &mut self.seats {
            seat.won_amount = winnings.get(&seat.seat).copied().unwrap_or(0);
            if seat.stack + seat.won_amount == 0 {
                sat_out.push(seat.seat);
            }
        }
        self.phase = Phase::Settlement;
        events.push(DealEvent::Settled { winnings, sat_out });
    }
}

/// Smallest element of `order` greater than `after`, wrapping to the
/// smallest overall if `after` is the last one (clockwise seat rotation).
fn next_in(order: &[Position], after: Position) -> Position {
    order
        .iter()
        .copied()
        .find(|p| *p > after)
        .unwrap_or_else(|| *order.first().expect("at least one seat"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlh_core::Chips;

    fn user(n: u128) -> ID<User> {
        ID::from(uuid::Uuid::from_u128(n))
    }

    #[test]
    fn heads_up_walkover_settles_without_showdown() {
        let deck = Deck::new();
        let (mut deal, _events) = Deal::start(
            vec![(0, user(1), 1000), (1, user(2), 1000)],
            0,
            10,
            20,
            deck,
        );
        assert_eq!(deal.phase(), Phase::PreFlop);
        assert_eq!(deal.current_seat(), Some(0)); // heads-up: dealer/SB acts first

        let events = deal.apply_action(user(1), Action::fold()).unwrap();
        assert_eq!(deal.phase(), Phase::Settlement);
        let settled = events.iter().find_map(|e| match e {
            DealEvent::Settled { winnings, .. } => Some(winnings.clone()),
            _ => None,
        });
        assert_eq!(settled.unwrap().get(&1), Some(&30));
        assert!(deal.seats().iter().find(|s| s.seat == 1).unwrap().shown_strength.is_none());
    }

    #[test]
    fn three_way_all_in_runs_out_the_board_without_further_betting() {
        let deck = Deck::new();
        let (mut deal, _) = Deal::start(
            vec![(0, user(1), 500), (1, user(2), 500), (2, user(3), 500)],
            0,
            10,
            20,
            deck,
        );
        let first = deal.current_seat().unwrap();
        deal.apply_action(deal.seats().iter().find(|s| s.seat == first).unwrap().user_id, Action::all_in()).unwrap();
        let next = deal.current_seat().unwrap();
        deal.apply_action(deal.seats().iter().find(|s| s.seat == next).unwrap().user_id, Action::all_in()).unwrap();
        if let Some(last) = deal.current_seat() {
            deal.apply_action(deal.seats().iter().find(|s| s.seat == last).unwrap().user_id, Action::all_in()).unwrap();
        }
        assert_eq!(deal.phase(), Phase::Settlement);
        assert_eq!(deal.board().len(), 5);
        let total: Chips = deal.seats().iter().map(|s| s.won_amount).sum();
        assert_eq!(total, 1500);
    }
}
