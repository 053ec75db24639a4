use crate::capability::{ActionExecutor, TurnScheduler};
use crate::presence::PresenceTracker;
use nlh_core::{Hand, Room, User, ID};
use nlh_engine::Action;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Per-hand auto-fold deadline and per-room auto-start deadline.
/// Holds at most one pending timer per id; (re)scheduling replaces whatever
/// was pending, so callers never have to check before calling.
///
/// Depends on [`ActionExecutor`] rather than `HandManager` directly so this
/// crate's two halves don't form a cycle.
pub struct Scheduler {
    executor: Arc<dyn ActionExecutor>,
    presence: Arc<PresenceTracker>,
    turn_timeout: Duration,
    afk_timeout: Duration,
    auto_start_delay: Duration,
    turn_timers: Mutex<HashMap<Uuid, JoinHandle<()>>>,
    auto_start_timers: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(
        executor: Arc<dyn ActionExecutor>,
        presence: Arc<PresenceTracker>,
        turn_timeout: Duration,
        afk_timeout: Duration,
        auto_start_delay: Duration,
    ) -> Self {
        Self {
            executor,
            presence,
            turn_timeout,
            afk_timeout,
            auto_start_delay,
            turn_timers: Mutex::new(HashMap::new()),
            auto_start_timers: Mutex::new(HashMap::new()),
        }
    }
}

impl TurnScheduler for Scheduler {
    fn schedule_turn_timer(&self, hand_id: ID<Hand>, player_id: ID<User>, room_id: ID<Room>) {
        self.cancel_timer(hand_id);
        let delay = if self.presence.is_active(room_id, player_id) { self.turn_timeout } else { self.afk_timeout };
        let executor = self.executor.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // A human action that beat the timer makes this a harmless
            // NOT_YOUR_TURN rejection.
            if let Err(e) = executor.apply_action(hand_id, player_id, Action::fold()).await {
                log::debug!("auto-fold no-op for hand {hand_id}: {e}");
            }
        });
        self.turn_timers.lock().expect("timer map").insert(hand_id.inner(), handle);
    }

    fn schedule_auto_start(&self, room_id: ID<Room>) {
        self.cancel_auto_start(room_id);
        let executor = self.executor.clone();
        let delay = self.auto_start_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = executor.start_new_hand(room_id).await {
                log::debug!("auto-start skipped for room {room_id}: {e}");
            }
        });
        self.auto_start_timers.lock().expect("timer map").insert(room_id.inner(), handle);
    }

    fn cancel_timer(&self, hand_id: ID<Hand>) {
        if let Some(h) = self.turn_timers.lock().expect("timer map").remove(&hand_id.inner()) {
            h.abort();
        }
    }

    fn cancel_auto_start(&self, room_id: ID<Room>) {
        if let Some(h) = self.auto_start_timers.lock().expect("timer map").remove(&room_id.inner()) {
            h.abort();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for (_, h) in self.turn_timers.lock().expect("timer map").drain() {
            h.abort();
        }
        for (_, h) in self.auto_start_timers.lock().expect("timer map").drain() {
            h.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlh_core::FixedClock;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingExecutor {
        folded: StdMutex<Vec<(ID<Hand>, ID<User>)>>,
        started: StdMutex<Vec<ID<Room>>>,
    }

    #[async_trait::async_trait]
    impl ActionExecutor for RecordingExecutor {
        async fn apply_action(&self, hand_id: ID<Hand>, user_id: ID<User>, _action: Action) -> nlh_core::Result<()> {
            self.folded.lock().expect("recorder").push((hand_id, user_id));
            Ok(())
        }
        async fn start_new_hand(&self, room_id: ID<Room>) -> nlh_core::Result<()> {
            self.started.lock().expect("recorder").push(room_id);
            Ok(())
        }
    }

    fn ids() -> (ID<Hand>, ID<User>, ID<Room>) {
        (ID::from(Uuid::from_u128(1)), ID::from(Uuid::from_u128(2)), ID::from(Uuid::from_u128(3)))
    }

    /// A present player gets the full turn timeout before the auto-fold
    /// fires.
    #[tokio::test(start_paused = true)]
    async fn present_player_auto_folds_after_turn_timeout() {
        let (hand_id, user_id, room_id) = ids();
        let executor = Arc::new(RecordingExecutor::default());
        let presence = Arc::new(PresenceTracker::new(Arc::new(FixedClock::at(0)), Duration::from_secs(60)));
        presence.record_heartbeat(room_id, user_id);
        let scheduler = Scheduler::new(executor.clone(), presence, Duration::from_secs(30), Duration::from_secs(10), Duration::from_secs(5));

        scheduler.schedule_turn_timer(hand_id, user_id, room_id);
        tokio::time::advance(Duration::from_secs(29)).await;
        tokio::task::yield_now().await;
        assert!(executor.folded.lock().expect("recorder").is_empty());

        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(*executor.folded.lock().expect("recorder"), vec![(hand_id, user_id)]);
    }

    /// A player with no recent heartbeat gets the shorter AFK timeout
    /// instead of the full turn timeout.
    #[tokio::test(start_paused = true)]
    async fn absent_player_auto_folds_after_the_shorter_afk_timeout() {
        let (hand_id, user_id, room_id) = ids();
        let executor = Arc::new(RecordingExecutor::default());
        let presence = Arc::new(PresenceTracker::new(Arc::new(FixedClock::at(0)), Duration::from_secs(60)));
        let scheduler = Scheduler::new(executor.clone(), presence, Duration::from_secs(30), Duration::from_secs(10), Duration::from_secs(5));

        scheduler.schedule_turn_timer(hand_id, user_id, room_id);
        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(*executor.folded.lock().expect("recorder"), vec![(hand_id, user_id)]);
    }

    /// Cancelling before the deadline leaves no trace of the timer firing.
    #[tokio::test(start_paused = true)]
    async fn cancel_timer_prevents_the_auto_fold() {
        let (hand_id, user_id, room_id) = ids();
        let executor = Arc::new(RecordingExecutor::default());
        let presence = Arc::new(PresenceTracker::new(Arc::new(FixedClock::at(0)), Duration::from_secs(60)));
        presence.record_heartbeat(room_id, user_id);
        let scheduler = Scheduler::new(executor.clone(), presence, Duration::from_secs(30), Duration::from_secs(10), Duration::from_secs(5));

        scheduler.schedule_turn_timer(hand_id, user_id, room_id);
        scheduler.cancel_timer(hand_id);
        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        assert!(executor.folded.lock().expect("recorder").is_empty());
    }

    /// §4.9 auto-start: fires once the configured delay elapses after the
    /// previous hand settles.
    #[tokio::test(start_paused = true)]
    async fn auto_start_fires_after_its_delay() {
        let (_, _, room_id) = ids();
        let executor = Arc::new(RecordingExecutor::default());
        let presence = Arc::new(PresenceTracker::new(Arc::new(FixedClock::at(0)), Duration::from_secs(60)));
        let scheduler = Scheduler::new(executor.clone(), presence, Duration::from_secs(30), Duration::from_secs(10), Duration::from_secs(5));

        scheduler.schedule_auto_start(room_id);
        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert_eq!(*executor.started.lock().expect("recorder"), vec![room_id]);
    }

    /// Rescheduling a turn timer (e.g. a second `arm_next_turn` call for the
    /// same hand) replaces the pending one rather than stacking two.
    #[tokio::test(start_paused = true)]
    async fn rescheduling_a_turn_timer_replaces_the_pending_one() {
        let (hand_id, user_id, room_id) = ids();
        let other_user: ID<User> = ID::from(Uuid::from_u128(9));
        let executor = Arc::new(RecordingExecutor::default());
        let presence = Arc::new(PresenceTracker::new(Arc::new(FixedClock::at(0)), Duration::from_secs(60)));
        presence.record_heartbeat(room_id, user_id);
        presence.record_heartbeat(room_id, other_user);
        let scheduler = Scheduler::new(executor.clone(), presence, Duration::from_secs(30), Duration::from_secs(10), Duration::from_secs(5));

        scheduler.schedule_turn_timer(hand_id, user_id, room_id);
        scheduler.schedule_turn_timer(hand_id, other_user, room_id);
        tokio::time::advance(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;
        assert_eq!(*executor.folded.lock().expect("recorder"), vec![(hand_id, other_user)]);
    }
}
