use nlh_core::{Clock, Room, User, ID};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

/// Process-local `(room, user) -> last heartbeat` map. No
/// persistence and no background sweep: stale entries cost a few bytes
/// each and are overwritten the next time that player reconnects.
pub struct PresenceTracker {
    clock: Arc<dyn Clock>,
    window: Duration,
    last_seen: Mutex<HashMap<(ID<Room>, ID<User>), u64>>,
}

impl PresenceTracker {
    pub fn new(clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self { clock, window, last_seen: Mutex::new(HashMap::new()) }
    }

    pub fn record_heartbeat(&self, room: ID<Room>, user: ID<User>) {
        let now = self.clock.now().as_millis() as u64;
        self.last_seen.lock().expect("presence map").insert((room, user), now);
    }

    pub fn is_active(&self, room: ID<Room>, user: ID<User>) -> bool {
        let Some(&seen) = self.last_seen.lock().expect("presence map").get(&(room, user)) else {
            return false;
        };
        let now = self.clock.now().as_millis() as u64;
        now.saturating_sub(seen) < self.window.as_millis() as u64
    }

    pub fn remove(&self, room: ID<Room>, user: ID<User>) {
        self.last_seen.lock().expect("presence map").remove(&(room, user));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlh_core::FixedClock;
    use uuid::Uuid;

    fn room() -> ID<Room> {
        ID::from(Uuid::from_u128(1))
    }
    fn user() -> ID<User> {
        ID::from(Uuid::from_u128(2))
    }

    #[test]
    fn inactive_until_a_heartbeat_is_recorded() {
        let clock = Arc::new(FixedClock::at(0));
        let tracker = PresenceTracker::new(clock, Duration::from_secs(15));
        assert!(!tracker.is_active(room(), user()));
    }

    #[test]
    fn active_within_window_then_expires() {
        let clock = Arc::new(FixedClock::at(1_000));
        let tracker = PresenceTracker::new(clock.clone(), Duration::from_secs(15));
        tracker.record_heartbeat(room(), user());
        assert!(tracker.is_active(room(), user()));
        clock.advance(14_999);
        assert!(tracker.is_active(room(), user()));
        clock.advance(2);
        assert!(!tracker.is_active(room(), user()));
    }

    #[test]
    fn remove_clears_the_entry() {
        let clock = Arc::new(FixedClock::at(0));
        let tracker = PresenceTracker::new(clock, Duration::from_secs(15));
        tracker.record_heartbeat(room(), user());
        tracker.remove(room(), user());
        assert!(!tracker.is_active(room(), user()));
    }
}
