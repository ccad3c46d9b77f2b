use axum::extract::{Query, State};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::IntoResponse;
use std::collections::HashMap;
use std::convert::Infallible;
use tokio_stream::{wrappers::BroadcastStream, StreamExt as _};

use crate::AppState;

/// Server-Sent Events stream of bus envelopes.
#[utoipa::path(
    get,
    path = "/events",
    tag = "Events",
    params(
        ("prefix" = Option<String>, Query, description = "CSV of event kind prefixes to include")
    ),
    responses(
        (status = 200, description = "SSE stream of events", content_type = "text/event-stream")
    )
)]
pub async fn events_sse(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let prefixes: Vec<String> = q
        .get("prefix")
        .map(|s| {
            s.split(',')
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(|p| p.to_string())
                .collect()
        })
        .unwrap_or_default();

    let rx = state.bus().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |item| {
        let env = item.ok()?;
        if !prefixes.is_empty() && !prefixes.iter().any(|p| env.kind.starts_with(p.as_str())) {
            return None;
        }
        let kind = env.kind.clone();
        let data = serde_json::to_string(&env).ok()?;
        Some(Ok::<SseEvent, Infallible>(
            SseEvent::default().event(kind).data(data),
        ))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
