use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use utoipa::OpenApi as _;

use crate::openapi::ApiDoc;

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Meta",
    responses((status = 200, description = "Service liveness", body = serde_json::Value))
)]
pub async fn healthz() -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "time": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    }))
}

#[utoipa::path(
    get,
    path = "/spec/openapi.json",
    tag = "Meta",
    responses((status = 200, description = "Generated OpenAPI document", body = serde_json::Value))
)]
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
