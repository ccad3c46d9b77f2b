use crate::catalog::ServiceCatalog;
use intake_protocol::RequirementRecord;
use std::collections::HashSet;

/// Headcount used for catalog eligibility: the explicit count when present,
/// else the number of distinct roles, else 1.
pub fn effective_headcount(record: &RequirementRecord) -> u32 {
    if let Some(count) = record.hiring.count {
        return count;
    }
    let distinct: HashSet<String> = record
        .hiring
        .roles
        .iter()
        .map(|r| r.trim().to_lowercase())
        .filter(|r| !r.is_empty())
        .collect();
    if distinct.is_empty() {
        1
    } else {
        distinct.len() as u32
    }
}

/// Pick a service package for the record. A previously recommended id that
/// still references a real catalog entry is sticky; otherwise the catalog is
/// scanned in its defined order for the first entry with a case-insensitive
/// role overlap whose count range contains the effective headcount.
pub fn derive_service_id(record: &RequirementRecord, catalog: &ServiceCatalog) -> Option<String> {
    if let Some(id) = record.recommended_service_id.as_deref() {
        if catalog.contains(id) {
            return Some(id.to_string());
        }
    }

    let want: Vec<String> = record
        .hiring
        .roles
        .iter()
        .map(|r| r.trim().to_lowercase())
        .filter(|r| !r.is_empty())
        .collect();
    if want.is_empty() {
        return None;
    }
    let count = effective_headcount(record);

    catalog
        .entries()
        .iter()
        .find(|entry| {
            let overlap = entry
                .roles
                .iter()
                .any(|covered| want.iter().any(|w| w == &covered.to_lowercase()));
            overlap && count >= entry.min_count && count <= entry.max_count
        })
        .map(|entry| entry.id.clone())
}
