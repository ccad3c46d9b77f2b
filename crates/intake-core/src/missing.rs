use crate::fill::Filled;
use intake_protocol::{MissingField, RequirementRecord};
use std::collections::HashSet;

/// Fields that gate recommendation readiness, in the stable ask order.
/// Budget, urgency and contact stay in the [`MissingField`] vocabulary but
/// never block a recommendation.
pub const MANDATORY_FIELDS: [MissingField; 4] = [
    MissingField::Roles,
    MissingField::Location,
    MissingField::Count,
    MissingField::Timeline,
];

/// Mandatory fields still unknown in the record, in stable order.
pub fn missing_fields(record: &RequirementRecord) -> Vec<MissingField> {
    let hiring = &record.hiring;
    let mut missing = Vec::new();
    if !hiring.roles.is_filled() {
        missing.push(MissingField::Roles);
    }
    if !hiring.location.is_filled() {
        missing.push(MissingField::Location);
    }
    if !hiring.count.is_filled() {
        missing.push(MissingField::Count);
    }
    if !hiring.timeline.is_filled() {
        missing.push(MissingField::Timeline);
    }
    missing
}

/// Order-independent set equality over missing-field lists.
pub fn same_missing_set(a: &[MissingField], b: &[MissingField]) -> bool {
    let left: HashSet<_> = a.iter().copied().collect();
    let right: HashSet<_> = b.iter().copied().collect();
    left == right
}
