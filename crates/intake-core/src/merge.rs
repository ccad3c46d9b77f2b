use crate::fill::Filled;
use intake_protocol::{CompanyProfile, HiringNeeds, RequirementRecord};

fn frozen<T: Filled + Clone>(prev: &T, cand: &T) -> T {
    if prev.is_filled() {
        prev.clone()
    } else {
        cand.clone()
    }
}

/// Freeze-once merge: a field that is filled in `prev` is never overwritten,
/// an empty field takes whatever `cand` offers (which may itself be empty).
///
/// This is deliberately not an object override. Conversations are multi-turn
/// and later messages usually mention only a subset of fields; the answer to
/// "what's your timeline?" must not erase a previously stated location.
/// Budget is kept atomically, never merged component-wise.
pub fn merge_frozen(prev: &RequirementRecord, cand: &RequirementRecord) -> RequirementRecord {
    RequirementRecord {
        company: CompanyProfile {
            name: frozen(&prev.company.name, &cand.company.name),
            industry: frozen(&prev.company.industry, &cand.company.industry),
            location: frozen(&prev.company.location, &cand.company.location),
        },
        hiring: HiringNeeds {
            roles: frozen(&prev.hiring.roles, &cand.hiring.roles),
            location: frozen(&prev.hiring.location, &cand.hiring.location),
            count: frozen(&prev.hiring.count, &cand.hiring.count),
            urgency: frozen(&prev.hiring.urgency, &cand.hiring.urgency),
            timeline: frozen(&prev.hiring.timeline, &cand.hiring.timeline),
            budget: frozen(&prev.hiring.budget, &cand.hiring.budget),
        },
        additional: frozen(&prev.additional, &cand.additional),
        recommended_service_id: frozen(
            &prev.recommended_service_id,
            &cand.recommended_service_id,
        ),
        // Advisory only; the resolver recomputes this every turn.
        missing_fields: if cand.missing_fields.is_empty() {
            prev.missing_fields.clone()
        } else {
            cand.missing_fields.clone()
        },
    }
}
