use intake_core::{plan_turn, validate_extraction, TurnView};
use intake_events::topics;
use intake_kernel::TurnRow;
use intake_protocol::{ConversationRole, RequirementRecord};
use serde_json::json;
use tracing::warn;

use crate::extract;
use crate::AppState;

pub(crate) struct TurnReply {
    pub reply: String,
    pub record: RequirementRecord,
}

fn turn_view(row: &TurnRow) -> TurnView {
    TurnView {
        role: row.role,
        record: row.record.clone(),
    }
}

/// One self-contained unit of work per incoming message: persist the user
/// turn, reconstruct the latest record, run both extractors, plan the turn,
/// persist the assistant turn with the new snapshot. Merges are computed into
/// a new value; only the fully-formed result is written. A model transport
/// failure degrades this turn to heuristic-only extraction; persistence
/// failures escalate.
pub(crate) async fn process_turn(
    state: &AppState,
    session_id: &str,
    message: &str,
) -> anyhow::Result<TurnReply> {
    state.kernel().ensure_session_async(session_id).await?;
    state
        .kernel()
        .append_turn_async(session_id, ConversationRole::User, message, None)
        .await?;

    let previous = state.kernel().latest_record_async(session_id).await?;
    let heuristic = intake_heuristics::parse_message(message);

    let prior_for_model = previous.clone().unwrap_or_default();
    let model_value =
        match extract::model_extract(state.model().as_ref(), message, &prior_for_model).await {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    target: "intake::turn",
                    error = %err,
                    session = session_id,
                    "model extraction unavailable; degrading to heuristic-only"
                );
                state.bus().publish(
                    topics::TOPIC_MODEL_EXTRACT_DEGRADED,
                    &json!({"sessionId": session_id, "error": err.to_string()}),
                );
                json!({})
            }
        };
    let validated = validate_extraction(model_value);

    let turns = state.kernel().turns_for_session_async(session_id).await?;
    let views: Vec<TurnView> = turns.iter().map(turn_view).collect();

    let had_recommendation = previous
        .as_ref()
        .and_then(|p| p.recommended_service_id.as_ref())
        .is_some();
    let plan = plan_turn(
        previous,
        heuristic,
        validated,
        &views,
        message,
        state.catalog(),
    );

    state
        .kernel()
        .append_turn_async(
            session_id,
            ConversationRole::Assistant,
            &plan.reply,
            Some(plan.record.clone()),
        )
        .await?;

    state.bus().publish(
        topics::TOPIC_CHAT_MESSAGE,
        &json!({"sessionId": session_id, "role": "assistant", "content": plan.reply}),
    );
    state.bus().publish(
        topics::TOPIC_RECORD_UPDATED,
        &json!({"sessionId": session_id, "missing": plan.missing, "stuck": plan.stuck}),
    );
    if !had_recommendation {
        if let Some(id) = plan.record.recommended_service_id.as_deref() {
            state.bus().publish(
                topics::TOPIC_RECOMMENDATION_READY,
                &json!({"sessionId": session_id, "serviceId": id}),
            );
        }
    }

    Ok(TurnReply {
        reply: plan.reply,
        record: plan.record,
    })
}
