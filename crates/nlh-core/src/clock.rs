use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A substitutable source of "now", so scheduler and heartbeat tests never
/// depend on wall-clock timing.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Reads the system clock. Used by the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
    }
}

/// A clock that returns a fixed, manually-advanced instant. Used in tests
/// that exercise presence/heartbeat and scheduler timing without sleeping.
#[derive(Debug, Clone)]
pub struct FixedClock(std::sync::Arc<std::sync::atomic::AtomicU64>);

impl FixedClock {
    pub fn at(millis: u64) -> Self {
        Self(std::sync::Arc::new(std::sync::atomic::AtomicU64::new(millis)))
    }
    pub fn advance(&self, millis: u64) {
        self.0.fetch_add(millis, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.0.load(std::sync::atomic::Ordering::SeqCst))
    }
}
