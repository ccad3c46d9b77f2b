use crate::catalog::ServiceCatalog;
use crate::compose;
use crate::guard::{self, TurnView};
use crate::merge::merge_frozen;
use crate::missing::missing_fields;
use crate::recommend::derive_service_id;
use crate::validate::Validated;
use intake_protocol::{MissingField, RequirementRecord};

/// Everything one turn decides: the next persisted record, the recomputed
/// missing set, the guard verdict and the outgoing reply.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnPlan {
    pub record: RequirementRecord,
    pub missing: Vec<MissingField>,
    pub stuck: bool,
    pub reply: String,
}

/// Pure per-turn planner. Folds prior state, the heuristic parse and the
/// validated model output in that priority order (two freeze-merges, the
/// first result acting as "previous" for the second), derives the
/// recommendation, resolves missing fields, consults the repetition guard
/// and composes the reply. Callers persist `plan.record` as this turn's
/// snapshot.
pub fn plan_turn(
    previous: Option<RequirementRecord>,
    heuristic: RequirementRecord,
    model: Validated,
    turns: &[TurnView],
    message: &str,
    catalog: &ServiceCatalog,
) -> TurnPlan {
    let previous = previous.unwrap_or_default();
    let (mut model_record, model_message) = model.into_payload().into_parts();
    model_record.recommended_service_id =
        catalog.keep_valid_id(model_record.recommended_service_id.take());

    let merged = merge_frozen(&previous, &heuristic);
    let mut record = merge_frozen(&merged, &model_record);
    record.recommended_service_id = derive_service_id(&record, catalog);

    let missing = missing_fields(&record);
    let stuck = guard::is_stuck(turns, &missing, message);
    let reply = compose::compose_reply(&record, &missing, stuck, &model_message, catalog);
    record.missing_fields = missing.clone();

    TurnPlan {
        record,
        missing,
        stuck,
        reply,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_extraction;
    use intake_protocol::ConversationRole;
    use serde_json::json;

    fn empty_model() -> Validated {
        validate_extraction(json!({}))
    }

    fn view(role: ConversationRole, record: Option<RequirementRecord>) -> TurnView {
        TurnView { role, record }
    }

    #[test]
    fn two_turn_scenario_freezes_earlier_fields() {
        let catalog = ServiceCatalog::builtin();

        // Turn 1: roles and count arrive, location and timeline are missing.
        let first = plan_turn(
            None,
            intake_heuristics::parse_message("Need 2 software engineers"),
            empty_model(),
            &[view(ConversationRole::User, None)],
            "Need 2 software engineers",
            &catalog,
        );
        assert_eq!(first.record.hiring.roles, vec!["software engineer"]);
        assert_eq!(first.record.hiring.count, Some(2));
        assert_eq!(
            first.missing,
            vec![MissingField::Location, MissingField::Timeline]
        );
        assert!(first.reply.contains("location"));

        // Turn 2: only the location arrives; earlier fields must survive.
        let turns = vec![
            view(ConversationRole::User, None),
            view(ConversationRole::Assistant, Some(first.record.clone())),
            view(ConversationRole::User, None),
        ];
        let second = plan_turn(
            Some(first.record.clone()),
            intake_heuristics::parse_message("in Pune"),
            empty_model(),
            &turns,
            "in Pune",
            &catalog,
        );
        assert_eq!(second.record.hiring.location.as_deref(), Some("Pune"));
        assert_eq!(second.record.hiring.count, Some(2));
        assert_eq!(second.record.hiring.roles, vec!["software engineer"]);
        assert_eq!(second.missing, vec![MissingField::Timeline]);
        assert!(second.reply.ends_with("Could you share timeline?"));
    }

    #[test]
    fn heuristic_beats_model_when_prior_is_empty() {
        let catalog = ServiceCatalog::builtin();
        let model = validate_extraction(json!({
            "hiring": {"location": "Bengaluru", "timeline": "6 months"}
        }));
        let plan = plan_turn(
            None,
            intake_heuristics::parse_message("2 backend engineers in Mumbai"),
            model,
            &[],
            "2 backend engineers in Mumbai",
            &catalog,
        );
        // Heuristic filled location first; the model's value is discarded,
        // while its timeline lands in the still-empty slot.
        assert_eq!(plan.record.hiring.location.as_deref(), Some("Mumbai"));
        assert_eq!(plan.record.hiring.timeline.as_deref(), Some("6 months"));
    }

    #[test]
    fn cold_record_never_gets_a_recommendation() {
        let catalog = ServiceCatalog::builtin();
        let plan = plan_turn(
            None,
            intake_heuristics::parse_message("hello!"),
            empty_model(),
            &[],
            "hello!",
            &catalog,
        );
        assert_eq!(plan.record.recommended_service_id, None);
        assert_eq!(plan.missing.len(), 4);
    }

    #[test]
    fn complete_record_recommends_deterministically() {
        let catalog = ServiceCatalog::builtin();
        let plan = plan_turn(
            None,
            intake_heuristics::parse_message("3 backend engineers in Mumbai, 2 weeks"),
            empty_model(),
            &[],
            "3 backend engineers in Mumbai, 2 weeks",
            &catalog,
        );
        assert!(plan.missing.is_empty());
        assert_eq!(
            plan.record.recommended_service_id.as_deref(),
            Some("tech_startup_pack")
        );
        assert!(plan.reply.contains("Recommended package"));
    }

    #[test]
    fn invalid_model_service_id_is_dropped_before_merge() {
        let catalog = ServiceCatalog::builtin();
        let model = validate_extraction(json!({
            "recommendedServiceId": "imaginary_pack",
            "hiring": {"roles": ["sales"]}
        }));
        let plan = plan_turn(None, RequirementRecord::default(), model, &[], "sales", &catalog);
        assert_ne!(
            plan.record.recommended_service_id.as_deref(),
            Some("imaginary_pack")
        );
    }

    #[test]
    fn repetition_terminates_with_a_consolidated_ask() {
        let catalog = ServiceCatalog::builtin();

        let first = plan_turn(
            None,
            intake_heuristics::parse_message("hi"),
            empty_model(),
            &[view(ConversationRole::User, None)],
            "hi",
            &catalog,
        );
        assert!(!first.stuck);

        let turns = vec![
            view(ConversationRole::User, None),
            view(ConversationRole::Assistant, Some(first.record.clone())),
            view(ConversationRole::User, None),
        ];
        let second = plan_turn(
            Some(first.record.clone()),
            intake_heuristics::parse_message("please just help"),
            empty_model(),
            &turns,
            "please just help",
            &catalog,
        );
        assert!(second.stuck);
        assert_ne!(second.reply, first.reply);
        assert!(second.reply.contains("roles, location, count and timeline"));
    }

    #[test]
    fn model_message_is_used_for_a_targeted_ask() {
        let catalog = ServiceCatalog::builtin();
        let model = validate_extraction(json!({
            "hiring": {"roles": ["data scientist"], "count": 2},
            "assistant_message": "Which city are you hiring in, and by when?"
        }));
        let plan = plan_turn(
            None,
            RequirementRecord::default(),
            model,
            &[],
            "2 data scientists",
            &catalog,
        );
        assert_eq!(plan.reply, "Which city are you hiring in, and by when?");
    }
}
