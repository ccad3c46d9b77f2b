use intake_protocol::{ExtractionPayload, MissingField};
use serde_json::Value;
use tracing::debug;

/// Outcome of gating a model response against the canonical shape. Both arms
/// carry a usable payload; validation never raises to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated {
    /// Coerced to the canonical shape; unknown keys were dropped.
    Accepted(ExtractionPayload),
    /// Shape violation; carries the sentinel "extraction failed" payload.
    Rejected(ExtractionPayload),
}

impl Validated {
    pub fn into_payload(self) -> ExtractionPayload {
        match self {
            Validated::Accepted(payload) | Validated::Rejected(payload) => payload,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Validated::Rejected(_))
    }
}

fn sentinel() -> ExtractionPayload {
    ExtractionPayload {
        missing_fields: vec![
            MissingField::Roles,
            MissingField::Location,
            MissingField::Count,
            MissingField::Timeline,
        ],
        assistant_message: "Could you share role titles, location, headcount, and timeline?"
            .to_string(),
        ..Default::default()
    }
}

/// Coerce a raw model object into [`ExtractionPayload`] or substitute the
/// sentinel record when the shape is violated (wrong types, non-positive
/// headcount). An empty object is a valid "nothing to add" payload.
pub fn validate_extraction(value: Value) -> Validated {
    match serde_json::from_value::<ExtractionPayload>(value) {
        Ok(payload) => {
            if payload.hiring.count == Some(0) {
                debug!(target: "intake::validate", "rejecting payload with zero headcount");
                return Validated::Rejected(sentinel());
            }
            Validated::Accepted(payload)
        }
        Err(err) => {
            debug!(target: "intake::validate", error = %err, "rejecting malformed extraction");
            Validated::Rejected(sentinel())
        }
    }
}
