use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use utoipa::ToSchema;

/// RFC7807-style error payload used at service edges.
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema, ToSchema)]
pub struct ProblemDetails {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: Option<String>,
}

/// The accumulating structured state for one conversation session.
///
/// Fields follow freeze-once semantics: once a field is filled in a persisted
/// snapshot, later merges never empty or replace it. The record is
/// reconstructed from the newest turn snapshot rather than cached in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct RequirementRecord {
    #[serde(default)]
    pub company: CompanyProfile,
    #[serde(default)]
    pub hiring: HiringNeeds,
    /// Free-form auxiliary fields; carried for forward-compatibility, never
    /// used for control decisions.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub additional: Map<String, Value>,
    #[serde(default, rename = "recommendedServiceId", skip_serializing_if = "Option::is_none")]
    pub recommended_service_id: Option<String>,
    /// Recomputed each turn from field state; advisory on stored snapshots.
    #[serde(default)]
    pub missing_fields: Vec<MissingField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct CompanyProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct HiringNeeds {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetRange>,
}

/// Budget is treated as one unit: any of min/max/currency makes it filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct BudgetRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Vocabulary of fields the agent may still be waiting on. Only the first
/// four gate recommendation readiness.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum MissingField {
    Roles,
    Location,
    Count,
    Timeline,
    Budget,
    Urgency,
    Contact,
}

impl MissingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingField::Roles => "roles",
            MissingField::Location => "location",
            MissingField::Count => "count",
            MissingField::Timeline => "timeline",
            MissingField::Budget => "budget",
            MissingField::Urgency => "urgency",
            MissingField::Contact => "contact",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One preconfigured service package with role and headcount eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct ServiceCatalogEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub roles: Vec<String>,
    pub min_count: u32,
    pub max_count: u32,
    pub price: f64,
}

/// Shape the model is asked to return: the record plus its own proposed
/// reply. Unknown keys are dropped on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct ExtractionPayload {
    #[serde(default)]
    pub company: CompanyProfile,
    #[serde(default)]
    pub hiring: HiringNeeds,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub additional: Map<String, Value>,
    #[serde(default)]
    pub missing_fields: Vec<MissingField>,
    #[serde(default, rename = "recommendedServiceId", skip_serializing_if = "Option::is_none")]
    pub recommended_service_id: Option<String>,
    #[serde(default)]
    pub assistant_message: String,
}

impl ExtractionPayload {
    /// Split the payload into the mergeable record part and the side channel
    /// the composer consumes.
    pub fn into_parts(self) -> (RequirementRecord, String) {
        let record = RequirementRecord {
            company: self.company,
            hiring: self.hiring,
            additional: self.additional,
            recommended_service_id: self.recommended_service_id,
            missing_fields: self.missing_fields,
        };
        (record, self.assistant_message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConversationRole {
    User,
    Assistant,
}

impl ConversationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationRole::User => "user",
            ConversationRole::Assistant => "assistant",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "user" => Some(ConversationRole::User),
            "assistant" => Some(ConversationRole::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for ConversationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
