pub mod messages;
pub mod presences;
pub mod ws;

use crate::common::state::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", post(messages::send))
        .route("/messages/with/{user_id}", get(messages::conversation_with))
        .route("/presences", get(presences::online_count))
        .route("/presences/{user_id}", get(presences::is_online))
        .route("/ws", get(ws::connect))
}
