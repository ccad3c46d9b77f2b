use axum::routing::{get, post};
use axum::Router;

use crate::{api, AppState};

pub(crate) fn build_router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(api::meta::healthz))
        .route("/spec/openapi.json", get(api::meta::openapi_json))
        .route("/chat", post(api::chat::chat_send))
        .route("/history/{session_id}", get(api::chat::chat_history))
        .route("/events", get(api::events::events_sse))
}
