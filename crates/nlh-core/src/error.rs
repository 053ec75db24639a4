/// Stable, client-facing error codes.
///
/// Every fallible engine operation returns `Result<_, Error>`. `code()` gives
/// the wire string a client can match on; `Display` gives a human message for
/// logs. Internal faults (database failures, serialization failures) are
/// folded into `Internal` rather than leaking driver-specific detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // authorization / membership
    NotInRoom,
    NotRoomOwner,
    AlreadyInRoom,
    ActiveHandInProgress,
    HandNotFound,
    RoomNotFound,
    // state / contract
    RoomNotWaiting,
    RoomNotJoinable,
    RoomFull,
    SeatTaken,
    NoSeats,
    NoActiveHand,
    InsufficientPlayers,
    InvalidSeatCount,
    // player input
    IllegalAction,
    NotYourTurn,
    InvalidAmount,
    // economic
    InsufficientChips,
    InvalidBuyIn,
    InvalidBuyInRange,
    InvalidBlindRatio,
    // ambient
    Internal(String),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInRoom => "NOT_IN_ROOM",
            Self::NotRoomOwner => "NOT_ROOM_OWNER",
            Self::AlreadyInRoom => "ALREADY_IN_ROOM",
            Self::ActiveHandInProgress => "ACTIVE_HAND_IN_PROGRESS",
            Self::HandNotFound => "HAND_NOT_FOUND",
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::RoomNotWaiting => "ROOM_NOT_WAITING",
            Self::RoomNotJoinable => "ROOM_NOT_JOINABLE",
            Self::RoomFull => "ROOM_FULL",
            Self::SeatTaken => "SEAT_TAKEN",
            Self::NoSeats => "NO_SEATS",
            Self::NoActiveHand => "NO_ACTIVE_HAND",
            Self::InsufficientPlayers => "INSUFFICIENT_PLAYERS",
            Self::InvalidSeatCount => "INVALID_SEAT_COUNT",
            Self::IllegalAction => "ILLEGAL_ACTION",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InsufficientChips => "INSUFFICIENT_CHIPS",
            Self::InvalidBuyIn => "INVALID_BUY_IN",
            Self::InvalidBuyInRange => "INVALID_BUY_IN_RANGE",
            Self::InvalidBlindRatio => "INVALID_BLIND_RATIO",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Internal(msg) => write!(f, "{}: {}", self.code(), msg),
            other => write!(f, "{}", other.code()),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
