use crate::action::{Action, ActionKind};
use nlh_core::{Chips, Error, Result};

/// Everything the validator needs to know about the acting seat and the
/// current street, independent of how the caller stores that state.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    pub is_players_turn: bool,
    pub seat_is_active: bool,
    pub bet_to_match: Chips,
    pub street_bet: Chips,
    pub stack: Chips,
    pub last_raise_size: Chips,
    pub big_blind: Chips,
}

/// What a legal action actually does to the seat's street bet and to whether
/// action reopens for the rest of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Check,
    /// Commits `amount` more chips; `all_in` if that exhausts the stack.
    Call { amount: Chips, all_in: bool },
    /// Sets the seat's street bet to `to_street_bet`, committing `amount` more.
    Raise { amount: Chips, to_street_bet: Chips },
    /// Pushes the whole stack in. `reopens` iff it meets the minimum raise.
    AllIn { amount: Chips, to_street_bet: Chips, reopens: bool },
    Fold,
}

pub struct ActionValidator;

impl ActionValidator {
    pub fn validate(ctx: ValidationContext, action: Action) -> Result<Effect> {
        if !ctx.is_players_turn {
            return Err(Error::NotYourTurn);
        }
        if !ctx.seat_is_active {
            return Err(Error::IllegalAction);
        }
        match action.kind {
            ActionKind::Fold => Ok(Effect::Fold),
            ActionKind::Check => {
                if ctx.bet_to_match != ctx.street_bet {
                    return Err(Error::IllegalAction);
                }
                Ok(Effect::Check)
            }
            ActionKind::Call => {
                if ctx.bet_to_match <= ctx.street_bet {
                    return Err(Error::IllegalAction);
                }
                if ctx.stack == 0 {
                    return Err(Error::IllegalAction);
                }
                let owed = ctx.bet_to_match - ctx.street_bet;
                let amount = owed.min(ctx.stack);
                Ok(Effect::Call { amount, all_in: amount == ctx.stack })
            }
            ActionKind::Raise => {
                let min_increment = ctx.last_raise_size.max(ctx.big_blind);
                let min_to = ctx.bet_to_match + min_increment;
                if action.amount < min_to {
                    return Err(Error::IllegalAction);
                }
                let amount = action.amount - ctx.street_bet;
                if amount <= 0 || amount > ctx.stack {
                    return Err(Error::InvalidAmount);
                }
                Ok(Effect::Raise { amount, to_street_bet: action.amount })
            }
            ActionKind::AllIn => {
                if ctx.stack <= 0 {
                    return Err(Error::IllegalAction);
                }
                let to_street_bet = ctx.street_bet + ctx.stack;
                let min_increment = ctx.last_raise_size.max(ctx.big_blind);
                let reopens = to_street_bet >= ctx.bet_to_match + min_increment;
                Ok(Effect::AllIn { amount: ctx.stack, to_street_bet, reopens })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ValidationContext {
        ValidationContext {
            is_players_turn: true,
            seat_is_active: true,
            bet_to_match: 20,
            street_bet: 0,
            stack: 1000,
            last_raise_size: 20,
            big_blind: 20,
        }
    }

    #[test]
    fn check_illegal_when_bet_outstanding() {
        let result = ActionValidator::validate(ctx(), Action::check());
        assert_eq!(result, Err(Error::IllegalAction));
    }

    #[test]
    fn call_commits_the_gap() {
        let effect = ActionValidator::validate(ctx(), Action::call()).unwrap();
        assert_eq!(effect, Effect::Call { amount: 20, all_in: false });
    }

    #[test]
    fn call_goes_all_in_when_short_stacked() {
        let mut c = ctx();
        c.stack = 10;
        let effect = ActionValidator::validate(c, Action::call()).unwrap();
        assert_eq!(effect, Effect::Call { amount: 10, all_in: true });
    }

    #[test]
    fn raise_below_minimum_increment_rejected() {
        let result = ActionValidator::validate(ctx(), Action::raise(30));
        assert_eq!(result, Err(Error::IllegalAction));
    }

    #[test]
    fn raise_at_minimum_increment_accepted() {
        let effect = ActionValidator::validate(ctx(), Action::raise(40)).unwrap();
        assert_eq!(effect, Effect::Raise { amount: 40, to_street_bet: 40 });
    }

    #[test]
    fn not_your_turn_rejected_even_for_otherwise_legal_action() {
        let mut c = ctx();
        c.is_players_turn = false;
        assert_eq!(ActionValidator::validate(c, Action::call()), Err(Error::NotYourTurn));
    }

    #[test]
    fn fold_out_of_turn_rejected() {
        let mut c = ctx();
        c.is_players_turn = false;
        assert_eq!(ActionValidator::validate(c, Action::fold()), Err(Error::NotYourTurn));
    }

    #[test]
    fn fold_on_players_turn_is_legal() {
        let effect = ActionValidator::validate(ctx(), Action::fold()).unwrap();
        assert_eq!(effect, Effect::Fold);
    }

    #[test]
    fn short_all_in_that_does_not_meet_minimum_raise_does_not_reopen() {
        let mut c = ctx();
        c.stack = 5; // less than the 20 minimum increment
        let effect = ActionValidator::validate(c, Action::all_in()).unwrap();
        assert_eq!(effect, Effect::AllIn { amount: 5, to_street_bet: 5, reopens: false });
    }

    #[test]
    fn all_in_meeting_minimum_raise_reopens() {
        let mut c = ctx();
        c.stack = 50;
        let effect = ActionValidator::validate(c, Action::all_in()).unwrap();
        assert_eq!(effect, Effect::AllIn { amount: 50, to_street_bet: 50, reopens: true });
    }
}
