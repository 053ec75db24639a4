use nlh_core::{Hand, Result, Room, User, ID};
use nlh_engine::Action;

/// What the Scheduler needs from the Hand Manager: enough to fire a timed
/// auto-fold or auto-start without depending on the Hand Manager's concrete
/// type, which would make the two crates depend on each other.
#[async_trait::async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn apply_action(&self, hand_id: ID<Hand>, user_id: ID<User>, action: Action) -> Result<()>;
    async fn start_new_hand(&self, room_id: ID<Room>) -> Result<()>;
}

/// What the Hand Manager needs from the Scheduler after every state change:
/// arm or cancel the per-hand turn timer, or arm the per-room auto-start
/// timer. Abstracted the same way, and for the same reason, as
/// [`ActionExecutor`] — the Hand Manager shouldn't need the Scheduler's
/// concrete type either.
pub trait TurnScheduler: Send + Sync {
    fn schedule_turn_timer(&self, hand_id: ID<Hand>, player_id: ID<User>, room_id: ID<Room>);
    fn schedule_auto_start(&self, room_id: ID<Room>);
    fn cancel_timer(&self, hand_id: ID<Hand>);
    fn cancel_auto_start(&self, room_id: ID<Room>);
}
