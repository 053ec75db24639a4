use nlh_core::{Room, User, ID};
use nlh_dto::Event;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

/// Fan-out for outbound events: one broadcast channel per room for game
/// events, and one per user for private hole-card and turn-notice delivery.
/// Chat and emoji channels are named by the same component in the
/// source system but carry no engine-generated traffic here — chat
/// persistence is out of scope — so only the `game` channel is wired.
///
/// Publishing is always best-effort: a channel with no current subscriber
/// simply drops the event, and a send is never awaited against a client.
#[derive(Default)]
pub struct EventPublisher {
    game: Mutex<HashMap<Uuid, broadcast::Sender<Event>>>,
    private: Mutex<HashMap<Uuid, broadcast::Sender<Event>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_room(&self, room: ID<Room>) -> broadcast::Receiver<Event> {
        self.game
            .lock()
            .expect("publisher map")
            .entry(room.inner())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn subscribe_private(&self, user: ID<User>) -> broadcast::Receiver<Event> {
        self.private
            .lock()
            .expect("publisher map")
            .entry(user.inner())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn publish_room(&self, room: ID<Room>, event: Event) {
        let senders = self.game.lock().expect("publisher map");
        if let Some(tx) = senders.get(&room.inner()) {
            if tx.send(event).is_err() {
                log::debug!("no subscribers for room {room}");
            }
        }
    }

    pub fn publish_private(&self, user: ID<User>, event: Event) {
        let senders = self.private.lock().expect("publisher map");
        if let Some(tx) = senders.get(&user.inner()) {
            if tx.send(event).is_err() {
                log::debug!("no subscribers for user {user}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlh_dto::EventKind;

    fn room() -> ID<Room> {
        ID::from(Uuid::from_u128(1))
    }
    fn user() -> ID<User> {
        ID::from(Uuid::from_u128(2))
    }

    #[tokio::test]
    async fn a_room_subscriber_receives_a_published_event() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe_room(room());
        publisher.publish_room(room(), Event::new(room(), None, 0, EventKind::PlayerLeft { user_id: user() }));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.room_id, room());
    }

    #[tokio::test]
    async fn publishing_with_no_subscriber_does_not_panic() {
        let publisher = EventPublisher::new();
        publisher.publish_room(room(), Event::new(room(), None, 0, EventKind::PlayerLeft { user_id: user() }));
        publisher.publish_private(user(), Event::new(room(), None, 0, EventKind::PlayerLeft { user_id: user() }));
    }

    #[tokio::test]
    async fn room_and_private_channels_are_independent() {
        let publisher = EventPublisher::new();
        let mut room_rx = publisher.subscribe_room(room());
        let mut private_rx = publisher.subscribe_private(user());
        publisher.publish_private(user(), Event::new(room(), None, 0, EventKind::PlayerLeft { user_id: user() }));
        assert!(room_rx.try_recv().is_err());
        assert!(private_rx.recv().await.is_ok());
    }
}
