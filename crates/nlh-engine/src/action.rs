use nlh_core::Chips;

/// A proposed action by the player whose turn it is.
///
/// `amount` is the RAISE/ALL_IN target street-bet total; it is ignored for
/// CHECK/CALL/FOLD, which are fully determined by the current betting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ActionKind {
    Check,
    Call,
    Raise,
    Fold,
    AllIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub amount: Chips,
}

impl Action {
    pub fn check() -> Self {
        Self { kind: ActionKind::Check, amount: 0 }
    }
    pub fn call() -> Self {
        Self { kind: ActionKind::Call, amount: 0 }
    }
    pub fn raise(amount: Chips) -> Self {
        Self { kind: ActionKind::Raise, amount }
    }
    pub fn all_in() -> Self {
        Self { kind: ActionKind::AllIn, amount: 0 }
    }
    pub fn fold() -> Self {
        Self { kind: ActionKind::Fold, amount: 0 }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.kind {
            ActionKind::Check => write!(f, "CHECK"),
            ActionKind::Call => write!(f, "CALL"),
            ActionKind::Fold => write!(f, "FOLD"),
            ActionKind::Raise => write!(f, "RAISE {}", self.amount),
            ActionKind::AllIn => write!(f, "ALL_IN"),
        }
    }
}

/// The dense, append-only action log entry type.
///
/// Distinct from `Action`: this is what gets written to the log, including
/// the dealer-driven events (`DealFlop`, `Settle`, ...) that are never
/// proposed by a player and so never appear as an `ActionKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LoggedAction {
    SmallBlind,
    BigBlind,
    Check,
    Call,
    Raise,
    Fold,
    AllIn,
    DealFlop,
    DealTurn,
    DealRiver,
    Showdown,
    Settle,
}

impl From<ActionKind> for LoggedAction {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Check => LoggedAction::Check,
            ActionKind::Call => LoggedAction::Call,
            ActionKind::Raise => LoggedAction::Raise,
            ActionKind::Fold => LoggedAction::Fold,
            ActionKind::AllIn => LoggedAction::AllIn,
        }
    }
}

impl std::fmt::Display for LoggedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            LoggedAction::SmallBlind => "SMALL_BLIND",
            LoggedAction::BigBlind => "BIG_BLIND",
            LoggedAction::Check => "CHECK",
            LoggedAction::Call => "CALL",
            LoggedAction::Raise => "RAISE",
            LoggedAction::Fold => "FOLD",
            LoggedAction::AllIn => "ALL_IN",
            LoggedAction::DealFlop => "DEAL_FLOP",
            LoggedAction::DealTurn => "DEAL_TURN",
            LoggedAction::DealRiver => "DEAL_RIVER",
            LoggedAction::Showdown => "SHOWDOWN",
            LoggedAction::Settle => "SETTLE",
        };
        write!(f, "{s}")
    }
}
