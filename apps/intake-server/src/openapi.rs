use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "intake-server",
        description = "Conversational lead-qualification agent"
    ),
    paths(
        crate::api::chat::chat_send,
        crate::api::chat::chat_history,
        crate::api::events::events_sse,
        crate::api::meta::healthz,
        crate::api::meta::openapi_json,
    ),
    components(schemas(
        intake_protocol::RequirementRecord,
        intake_protocol::CompanyProfile,
        intake_protocol::HiringNeeds,
        intake_protocol::BudgetRange,
        intake_protocol::MissingField,
        intake_protocol::ServiceCatalogEntry,
        intake_protocol::ProblemDetails,
    ))
)]
pub(crate) struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi as _;

    #[test]
    fn document_includes_chat_surface() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).expect("openapi json");
        assert!(json["paths"]["/chat"].is_object());
        assert!(json["paths"]["/history/{session_id}"].is_object());
        assert!(json["paths"]["/healthz"].is_object());
    }
}
