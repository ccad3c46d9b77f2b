use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use intake_protocol::{ConversationRole, RequirementRecord};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::{responses, turn, AppState};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatReq {
    pub message: String,
    pub session_id: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatResp {
    pub success: bool,
    pub response: String,
    pub extracted_data: RequirementRecord,
    pub session_id: String,
}

#[utoipa::path(
    post,
    path = "/chat",
    tag = "Chat",
    request_body = ChatReq,
    responses(
        (status = 200, description = "Agent reply with the updated record", body = ChatResp),
        (status = 400, description = "Missing message or session id", body = intake_protocol::ProblemDetails),
        (status = 500, description = "Persistence failure", body = intake_protocol::ProblemDetails)
    )
)]
pub async fn chat_send(
    State(state): State<AppState>,
    Json(req): Json<ChatReq>,
) -> impl IntoResponse {
    let message = req.message.trim();
    let session_id = req.session_id.trim();
    if message.is_empty() || session_id.is_empty() {
        return responses::bad_request("message and sessionId are required");
    }
    match turn::process_turn(&state, session_id, message).await {
        Ok(outcome) => Json(ChatResp {
            success: true,
            response: outcome.reply,
            extracted_data: outcome.record,
            session_id: session_id.to_string(),
        })
        .into_response(),
        Err(err) => {
            error!(target: "intake::api", error = ?err, "chat turn failed");
            responses::internal_error()
        }
    }
}

#[derive(Serialize, ToSchema)]
pub(crate) struct HistoryTurn {
    pub role: ConversationRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<RequirementRecord>,
    pub created: String,
}

#[derive(Serialize, ToSchema)]
pub(crate) struct HistoryResp {
    pub success: bool,
    pub messages: Vec<HistoryTurn>,
}

#[utoipa::path(
    get,
    path = "/history/{session_id}",
    tag = "Chat",
    params(("session_id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Ordered turn history", body = HistoryResp),
        (status = 500, description = "Persistence failure", body = intake_protocol::ProblemDetails)
    )
)]
pub async fn chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.kernel().turns_for_session_async(&session_id).await {
        Ok(turns) => Json(HistoryResp {
            success: true,
            messages: turns
                .into_iter()
                .map(|row| HistoryTurn {
                    role: row.role,
                    content: row.content,
                    record: row.record,
                    created: row.created,
                })
                .collect(),
        })
        .into_response(),
        Err(err) => {
            error!(target: "intake::api", error = ?err, "history read failed");
            responses::internal_error()
        }
    }
}
