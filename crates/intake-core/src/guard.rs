use crate::missing::{missing_fields, same_missing_set};
use intake_protocol::{ConversationRole, MissingField, RequirementRecord};
use once_cell::sync::Lazy;
use regex::Regex;

/// Read-only view of one stored turn, oldest-first when passed as a slice.
/// The guard recomputes missing sets from snapshots rather than trusting the
/// advisory `missing_fields` they carry.
#[derive(Debug, Clone)]
pub struct TurnView {
    pub role: ConversationRole,
    pub record: Option<RequirementRecord>,
}

static RE_REPEAT_COMPLAINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)already told you|same as (?:above|before)|told (?:you )?(?:already|earlier)|repeat|why (?:do you )?keep asking|why ask",
    )
    .expect("repeat complaint regex")
});

/// User is signaling that the agent keeps asking for known information.
pub fn is_repeat_complaint(message: &str) -> bool {
    RE_REPEAT_COMPLAINT.is_match(message)
}

/// Whether the dialogue is stuck on the same missing fields. True when the
/// latest user message complains about repetition, or when the previous
/// snapshot's missing set equals the current one and at least one trailing
/// assistant turn already asked for that same set. User rows are skipped
/// when counting the trailing assistant streak.
pub fn is_stuck(
    turns: &[TurnView],
    current_missing: &[MissingField],
    latest_message: &str,
) -> bool {
    if is_repeat_complaint(latest_message) {
        return true;
    }

    let Some(prev_record) = turns.iter().rev().find_map(|t| t.record.as_ref()) else {
        return false;
    };
    if !same_missing_set(&missing_fields(prev_record), current_missing) {
        return false;
    }

    let mut streak = 0usize;
    for turn in turns.iter().rev() {
        match turn.role {
            ConversationRole::User => continue,
            ConversationRole::Assistant => {
                let Some(record) = turn.record.as_ref() else {
                    break;
                };
                if same_missing_set(&missing_fields(record), current_missing) {
                    streak += 1;
                } else {
                    break;
                }
            }
        }
    }
    streak >= 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_protocol::HiringNeeds;

    fn snapshot(roles: &[&str], location: Option<&str>) -> RequirementRecord {
        let mut record = RequirementRecord::default();
        record.hiring = HiringNeeds {
            roles: roles.iter().map(|r| r.to_string()).collect(),
            location: location.map(|l| l.to_string()),
            ..Default::default()
        };
        record
    }

    fn user(text_has_record: Option<RequirementRecord>) -> TurnView {
        TurnView {
            role: ConversationRole::User,
            record: text_has_record,
        }
    }

    fn assistant(record: RequirementRecord) -> TurnView {
        TurnView {
            role: ConversationRole::Assistant,
            record: Some(record),
        }
    }

    #[test]
    fn cold_session_is_not_stuck() {
        let missing = missing_fields(&RequirementRecord::default());
        assert!(!is_stuck(&[], &missing, "hello"));
        assert!(!is_stuck(&[user(None)], &missing, "hello"));
    }

    #[test]
    fn one_repeated_ask_trips_the_guard() {
        let snap = snapshot(&[], None);
        let missing = missing_fields(&snap);
        let turns = vec![user(None), assistant(snap), user(None)];
        assert!(is_stuck(&turns, &missing, "just find me someone"));
    }

    #[test]
    fn progress_resets_the_guard() {
        // Last ask wanted everything; the new message narrowed the set, so
        // the dialogue is moving and the guard stays quiet.
        let turns = vec![user(None), assistant(snapshot(&[], None)), user(None)];
        let current = missing_fields(&snapshot(&["backend engineer"], Some("Pune")));
        assert!(!is_stuck(&turns, &current, "2 backend engineers in Pune"));
    }

    #[test]
    fn repeat_complaint_short_circuits() {
        assert!(is_stuck(&[], &[], "I already told you the location"));
        assert!(is_stuck(&[], &[], "why do you keep asking?"));
        assert!(is_stuck(&[], &[], "same as before"));
    }

    #[test]
    fn mismatched_previous_set_is_not_stuck() {
        let snap = snapshot(&[], None);
        let turns = vec![user(None), assistant(snap)];
        let current = missing_fields(&snapshot(&["sales"], Some("Delhi")));
        assert!(!is_stuck(&turns, &current, "anything"));
    }
}
