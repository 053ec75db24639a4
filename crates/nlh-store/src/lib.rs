//! Persisted domain model for rooms, hands, and the hand action log, plus
//! the [`Repository`] trait that owns row-level locking around it.
//!
//! [`MemoryRepository`] is always available and is what the rest of the
//! workspace tests against. [`pg::PgRepository`] is the durable backend,
//! built behind the `postgres` feature so a pure in-process deployment
//! never has to link `tokio-postgres`.
mod memory;
mod model;
#[cfg(feature = "postgres")]
mod pg;
mod repository;

pub use memory::MemoryRepository;
pub use model::{
    HandActionRecord, HandPlayerRecord, HandRecord, RoomPlayerRecord, RoomPlayerStatus, RoomRecord, RoomStatus,
};
#[cfg(feature = "postgres")]
pub use pg::PgRepository;
pub use repository::Repository;
