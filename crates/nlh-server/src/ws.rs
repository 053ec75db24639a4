use crate::state::AppState;
use actix_web::{HttpRequest, HttpResponse, web};
use futures::StreamExt;
use nlh_core::{Room, User, ID};

/// Bridges a room's broadcast game-event channel to one WebSocket
/// connection. One subscriber per socket; a client that wants both
/// the room feed and its own private feed opens two connections.
pub async fn room_stream(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<AppState>,
    room_id: web::Path<ID<Room>>,
) -> actix_web::Result<HttpResponse> {
    let (response, session, mut msg_stream) = actix_ws::handle(&req, body)?;
    let mut events = state.publisher.subscribe_room(room_id.into_inner());

    actix_web::rt::spawn(async move {
        let mut session = session;
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Ok(event) => {
                            let Ok(text) = serde_json::to_string(&event) else { continue };
                            if session.text(text).await.is_err() {
                                break;
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
                msg = msg_stream.next() => {
                    match msg {
                        Some(Ok(actix_ws::Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(_)) => break,
                    }
                }
            }
        }
        let _ = session.close(None).await;
    });

    Ok(response)
}

/// Bridges one user's private channel (hole cards, your-turn pings) to a
/// WebSocket connection.
pub async fn private_stream(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<AppState>,
    user_id: web::Path<ID<User>>,
) -> actix_web::Result<HttpResponse> {
    let (response, session, mut msg_stream) = actix_ws::handle(&req, body)?;
    let mut events = state.publisher.subscribe_private(user_id.into_inner());

    actix_web::rt::spawn(async move {
        let mut session = session;
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Ok(event) => {
                            let Ok(text) = serde_json::to_string(&event) else { continue };
                            if session.text(text).await.is_err() {
                                break;
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
                msg = msg_stream.next() => {
                    match msg {
                        Some(Ok(actix_ws::Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(_)) => break,
                    }
                }
            }
        }
        let _ = session.close(None).await;
    });

    Ok(response)
}
