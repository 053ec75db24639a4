//! View models and outbound event envelopes for the hold'em engine.
//!
//! Nothing here touches persistence or the scheduler directly; it only
//! knows how to turn store records into wire-safe, visibility-filtered
//! shapes.
mod event;
mod view;

pub use event::{Event, EventKind};
pub use view::{ActionView, HandPlayerView, HandView};
