//! Shared identifiers, error taxonomy, clock, configuration, and logging for
//! the hold'em engine. Every other crate in the workspace depends on this one
//! and nothing else; it has no knowledge of cards, betting, or persistence.

mod clock;
mod config;
mod error;
mod id;
#[cfg(feature = "server")]
mod log;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use id::{Unique, ID};
#[cfg(feature = "server")]
pub use log::{init as log_init, shutdown_on_ctrlc};

/// Non-negative chip amount, 64-bit per §3.
pub type Chips = i64;
/// Seat index within a room, `0..maxSeats`.
pub type Position = usize;
/// Dense, gap-free per-hand action sequence number.
pub type SequenceNum = i64;

/// Minimum and maximum seats a Room may configure.
pub const MIN_SEATS: usize = 2;
pub const MAX_SEATS: usize = 9;

/// Zero-sized marker types for `ID<T>`, shared across every crate so that
/// `ID<User>` means the same type whether it's constructed by the engine,
/// the store, or the server.
pub struct User;
pub struct Room;
pub struct Hand;

