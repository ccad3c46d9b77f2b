use crate::catalog::ServiceCatalog;
use crate::fill::Filled;
use intake_protocol::{MissingField, RequirementRecord};
use once_cell::sync::Lazy;
use regex::Regex;

/// A model message that walks through every mandatory field is the generic
/// ask-everything template and loses to our own targeted ask.
static RE_GENERIC_TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)roles.*location.*headcount.*timeline").expect("template regex"));

fn fmt_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Filled fields only, in the fixed order roles, location, headcount,
/// timeline, budget.
fn summary_parts(record: &RequirementRecord) -> Vec<String> {
    let hiring = &record.hiring;
    let mut parts = Vec::new();
    if hiring.roles.is_filled() {
        let roles: Vec<&str> = hiring
            .roles
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect();
        parts.push(format!("roles: {}", roles.join(", ")));
    }
    if hiring.location.is_filled() {
        parts.push(format!("location: {}", hiring.location.as_deref().unwrap()));
    }
    if let Some(count) = hiring.count {
        parts.push(format!("headcount: {}", count));
    }
    if hiring.timeline.is_filled() {
        parts.push(format!("timeline: {}", hiring.timeline.as_deref().unwrap()));
    }
    if let Some(budget) = &hiring.budget {
        if let Some(amount) = budget.max.or(budget.min) {
            let currency = budget.currency.as_deref().unwrap_or("INR");
            parts.push(format!("budget: {} {}", currency, fmt_amount(amount)));
        }
    }
    parts
}

fn field_list(missing: &[MissingField]) -> String {
    match missing {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{} and {}", first, second),
        _ => {
            let head: Vec<String> = missing[..missing.len() - 1]
                .iter()
                .map(|f| f.to_string())
                .collect();
            format!("{} and {}", head.join(", "), missing[missing.len() - 1])
        }
    }
}

/// Acknowledge what is known and ask for exactly the missing fields.
pub fn targeted_follow_up(record: &RequirementRecord, missing: &[MissingField]) -> String {
    let ask = if missing.is_empty() {
        "I have enough to recommend a package.".to_string()
    } else {
        format!("Could you share {}?", field_list(missing))
    };
    let parts = summary_parts(record);
    if parts.is_empty() {
        ask
    } else {
        format!("Got it — {}. {}", parts.join(", "), ask)
    }
}

/// Announce the recommended package, or a generic custom package when the
/// catalog had no match.
pub fn recommendation_message(record: &RequirementRecord, catalog: &ServiceCatalog) -> String {
    let parts = summary_parts(record);
    let summary = if parts.is_empty() {
        String::new()
    } else {
        format!("Great — {}. ", parts.join(", "))
    };
    let entry = record
        .recommended_service_id
        .as_deref()
        .and_then(|id| catalog.get(id));
    match entry {
        Some(service) => format!(
            "{}Recommended package: {}. {}",
            summary, service.name, service.description
        )
        .trim_end()
        .to_string(),
        None => format!("{}Recommended package: Custom Hiring Package.", summary),
    }
}

/// Best-effort path for a stuck dialogue: announce a recommendation when one
/// is derivable (inviting one refinement), otherwise a single consolidated
/// ask that does not repeat the earlier question verbatim.
pub fn proceed_with_partial(
    record: &RequirementRecord,
    missing: &[MissingField],
    catalog: &ServiceCatalog,
) -> String {
    if record.recommended_service_id.is_some() {
        let announcement = recommendation_message(record, catalog);
        return match missing.first() {
            Some(field) => format!(
                "{} If you'd like to refine, please share {}.",
                announcement, field
            ),
            None => announcement,
        };
    }
    format!(
        "Let me proceed with what I have so far. To pin down the right package, please share {} in one message.",
        field_list(missing)
    )
}

/// Decide the outgoing reply. Priority: complete record → recommendation;
/// stuck dialogue → best-effort proceed; otherwise the model's own message
/// when it is usable, else the targeted ask.
pub fn compose_reply(
    record: &RequirementRecord,
    missing: &[MissingField],
    stuck: bool,
    model_message: &str,
    catalog: &ServiceCatalog,
) -> String {
    if missing.is_empty() {
        return recommendation_message(record, catalog);
    }
    if stuck {
        return proceed_with_partial(record, missing, catalog);
    }
    let proposed = model_message.trim();
    if !proposed.is_empty() && !RE_GENERIC_TEMPLATE.is_match(proposed) {
        proposed.to_string()
    } else {
        targeted_follow_up(record, missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_protocol::{BudgetRange, HiringNeeds};

    fn full_record() -> RequirementRecord {
        let mut record = RequirementRecord::default();
        record.hiring = HiringNeeds {
            roles: vec!["backend engineer".into()],
            location: Some("Mumbai".into()),
            count: Some(3),
            timeline: Some("2 weeks".into()),
            urgency: None,
            budget: Some(BudgetRange {
                max: Some(1_000_000.0),
                currency: Some("INR".into()),
                ..Default::default()
            }),
        };
        record.recommended_service_id = Some("tech_startup_pack".into());
        record
    }

    #[test]
    fn complete_record_announces_the_package() {
        let catalog = ServiceCatalog::builtin();
        let reply = compose_reply(&full_record(), &[], false, "", &catalog);
        assert!(reply.starts_with(
            "Great — roles: backend engineer, location: Mumbai, headcount: 3, \
             timeline: 2 weeks, budget: INR 1000000."
        ));
        assert!(reply.contains("Tech Startup Hiring Pack"));
    }

    #[test]
    fn unmatched_record_gets_custom_package_message() {
        let catalog = ServiceCatalog::builtin();
        let mut record = full_record();
        record.recommended_service_id = None;
        let reply = compose_reply(&record, &[], false, "", &catalog);
        assert!(reply.contains("Custom Hiring Package"));
    }

    #[test]
    fn ask_grammar_for_one_two_and_three_fields() {
        let record = RequirementRecord::default();
        assert_eq!(
            targeted_follow_up(&record, &[MissingField::Timeline]),
            "Could you share timeline?"
        );
        assert_eq!(
            targeted_follow_up(&record, &[MissingField::Location, MissingField::Timeline]),
            "Could you share location and timeline?"
        );
        assert_eq!(
            targeted_follow_up(
                &record,
                &[
                    MissingField::Roles,
                    MissingField::Location,
                    MissingField::Timeline
                ]
            ),
            "Could you share roles, location and timeline?"
        );
    }

    #[test]
    fn summary_lists_only_filled_fields_in_order() {
        let mut record = RequirementRecord::default();
        record.hiring.roles = vec!["sales".into()];
        record.hiring.timeline = Some("1 month".into());
        let reply = targeted_follow_up(&record, &[MissingField::Location, MissingField::Count]);
        assert_eq!(
            reply,
            "Got it — roles: sales, timeline: 1 month. Could you share location and count?"
        );
    }

    #[test]
    fn usable_model_message_is_preferred() {
        let catalog = ServiceCatalog::builtin();
        let record = RequirementRecord::default();
        let missing = [MissingField::Location];
        let reply = compose_reply(
            &record,
            &missing,
            false,
            "Which city should we hire in?",
            &catalog,
        );
        assert_eq!(reply, "Which city should we hire in?");
    }

    #[test]
    fn generic_template_model_message_is_replaced() {
        let catalog = ServiceCatalog::builtin();
        let record = RequirementRecord::default();
        let missing = [MissingField::Location];
        let reply = compose_reply(
            &record,
            &missing,
            false,
            "Please share roles, location, headcount and timeline.",
            &catalog,
        );
        assert_eq!(reply, targeted_follow_up(&record, &missing));
    }

    #[test]
    fn stuck_with_recommendation_invites_one_refinement() {
        let catalog = ServiceCatalog::builtin();
        let mut record = full_record();
        record.hiring.timeline = None;
        let missing = [MissingField::Timeline];
        let reply = compose_reply(&record, &missing, true, "", &catalog);
        assert!(reply.contains("Tech Startup Hiring Pack"));
        assert!(reply.ends_with("If you'd like to refine, please share timeline."));
    }

    #[test]
    fn stuck_without_recommendation_consolidates_the_ask() {
        let catalog = ServiceCatalog::builtin();
        let record = RequirementRecord::default();
        let missing = crate::missing::missing_fields(&record);
        let stuck_reply = compose_reply(&record, &missing, true, "", &catalog);
        let normal_reply = compose_reply(&record, &missing, false, "", &catalog);
        assert_ne!(stuck_reply, normal_reply);
        assert!(stuck_reply.contains("roles, location, count and timeline"));
    }
}
