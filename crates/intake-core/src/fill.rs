use intake_protocol::BudgetRange;
use serde_json::{Map, Value};

/// Whether a candidate value counts as "known" for merge and missing-field
/// decisions. Numeric zero and boolean false are meaningful values and count
/// as filled; strings must survive a whitespace trim; a list needs at least
/// one non-empty element; budget is judged as a whole unit.
pub trait Filled {
    fn is_filled(&self) -> bool;
}

impl Filled for Option<String> {
    fn is_filled(&self) -> bool {
        self.as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

impl Filled for Vec<String> {
    fn is_filled(&self) -> bool {
        self.iter().any(|s| !s.trim().is_empty())
    }
}

impl Filled for Option<u32> {
    fn is_filled(&self) -> bool {
        self.is_some()
    }
}

impl Filled for Option<bool> {
    fn is_filled(&self) -> bool {
        self.is_some()
    }
}

impl Filled for Option<BudgetRange> {
    fn is_filled(&self) -> bool {
        self.as_ref()
            .map(|b| {
                b.min.is_some()
                    || b.max.is_some()
                    || b.currency
                        .as_deref()
                        .map(|c| !c.trim().is_empty())
                        .unwrap_or(false)
            })
            .unwrap_or(false)
    }
}

impl Filled for Map<String, Value> {
    fn is_filled(&self) -> bool {
        !self.is_empty()
    }
}
