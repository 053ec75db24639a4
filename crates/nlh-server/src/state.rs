use nlh_core::{Clock, Config, SystemClock};
use nlh_manager::{EventPublisher, HandManager, PresenceTracker, Scheduler};
use std::sync::Arc;

#[cfg(not(feature = "postgres"))]
pub type Repo = nlh_store::MemoryRepository;
#[cfg(feature = "postgres")]
pub type Repo = nlh_store::PgRepository;

/// Everything a request handler needs, wired once at startup and shared
/// behind `web::Data`.
///
/// The manager and scheduler complete each other's construction-order
/// cycle through [`HandManager::set_scheduler`] rather
/// than holding a direct reference to one another.
pub struct AppState {
    pub manager: Arc<HandManager<Repo>>,
    pub presence: Arc<PresenceTracker>,
    pub publisher: Arc<EventPublisher>,
}

impl AppState {
    pub fn new(repo: Arc<Repo>, config: &Config) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let publisher = Arc::new(EventPublisher::new());
        let presence = Arc::new(PresenceTracker::new(clock.clone(), config.heartbeat_window));
        let manager = Arc::new(HandManager::new(repo, clock, publisher.clone()));

        let scheduler = Arc::new(Scheduler::new(
            manager.clone(),
            presence.clone(),
            config.turn_timeout,
            config.afk_timeout,
            config.auto_start_delay,
        ));
        manager.set_scheduler(scheduler);

        Self { manager, presence, publisher }
    }
}
