use crate::state::AppState;
use actix_web::{HttpResponse, Responder, web};
use nlh_core::{Error, Hand, Room, User, ID};
use nlh_engine::Action;
use serde::Deserialize;

fn error_response(err: &Error) -> HttpResponse {
    let status = match err {
        Error::RoomNotFound | Error::HandNotFound => actix_web::http::StatusCode::NOT_FOUND,
        Error::NotYourTurn | Error::IllegalAction | Error::InvalidAmount => actix_web::http::StatusCode::CONFLICT,
        Error::Internal(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        _ => actix_web::http::StatusCode::BAD_REQUEST,
    };
    HttpResponse::build(status).json(serde_json::json!({ "error": err.code() }))
}

#[derive(Deserialize)]
pub struct StartHandRequest {
    pub requesting_user_id: ID<User>,
}

/// `startHand`: the requester only needs to be a member of the room;
/// the Hand Manager itself re-checks eligible players under the room lock.
pub async fn start_hand(
    state: web::Data<AppState>,
    room_id: web::Path<ID<Room>>,
    _body: web::Json<StartHandRequest>,
) -> impl Responder {
    match state.manager.start_new_hand(room_id.into_inner()).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

#[derive(Deserialize)]
pub struct ProcessActionRequest {
    pub player_id: ID<User>,
    pub action: Action,
}

/// `processAction`.
pub async fn process_action(
    state: web::Data<AppState>,
    hand_id: web::Path<ID<Hand>>,
    body: web::Json<ProcessActionRequest>,
) -> impl Responder {
    let body = body.into_inner();
    match state.manager.process_action(hand_id.into_inner(), body.player_id, body.action).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

#[derive(Deserialize)]
pub struct GetHandQuery {
    pub requesting_user_id: ID<User>,
}

/// `getHand`: card visibility is filtered per `requesting_user_id`.
pub async fn get_hand(
    state: web::Data<AppState>,
    hand_id: web::Path<ID<Hand>>,
    query: web::Query<GetHandQuery>,
) -> impl Responder {
    match state.manager.get_hand(hand_id.into_inner(), query.requesting_user_id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

/// `getActions`.
pub async fn get_actions(state: web::Data<AppState>, hand_id: web::Path<ID<Hand>>) -> impl Responder {
    match state.manager.get_actions(hand_id.into_inner()).await {
        Ok(actions) => HttpResponse::Ok().json(actions),
        Err(e) => error_response(&e),
    }
}

#[derive(Deserialize)]
pub struct HeartbeatPath {
    pub room_id: ID<Room>,
    pub user_id: ID<User>,
}

/// `recordHeartbeat`: best-effort, process-local, never fails the
/// caller.
pub async fn record_heartbeat(state: web::Data<AppState>, path: web::Path<HeartbeatPath>) -> impl Responder {
    let path = path.into_inner();
    state.presence.record_heartbeat(path.room_id, path.user_id);
    HttpResponse::Ok().finish()
}
