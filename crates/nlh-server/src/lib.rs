//! Thin `actix-web`/`actix-ws` binding from the engine's inbound operations
//! to HTTP routes and two WebSocket event streams. This crate exists to
//! prove the engine is callable over a network, not to fix a wire protocol.
mod handlers;
mod state;
mod ws;

pub use state::{AppState, Repo};

use actix_web::web;

/// Registers every inbound HTTP route plus the two WebSocket event streams.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/rooms/{room_id}/hands", web::post().to(handlers::start_hand))
        .route("/hands/{hand_id}/actions", web::post().to(handlers::process_action))
        .route("/hands/{hand_id}/actions", web::get().to(handlers::get_actions))
        .route("/hands/{hand_id}", web::get().to(handlers::get_hand))
        .route("/rooms/{room_id}/heartbeat/{user_id}", web::post().to(handlers::record_heartbeat))
        .route("/rooms/{room_id}/stream", web::get().to(ws::room_stream))
        .route("/users/{user_id}/stream", web::get().to(ws::private_stream));
}
