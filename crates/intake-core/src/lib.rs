//! Decision core for the intake agent: field-fill semantics, the freeze-once
//! merge, missing-field resolution, extraction validation, the service
//! catalog and recommendation matcher, the repetition guard, and the reply
//! composer. Everything here is pure and synchronous; transport, persistence
//! and the model collaborator live outside and feed inputs in.

pub mod catalog;
pub mod compose;
pub mod fill;
pub mod guard;
pub mod merge;
pub mod missing;
pub mod recommend;
pub mod turn;
pub mod validate;

pub use catalog::{CatalogError, ServiceCatalog};
pub use fill::Filled;
pub use guard::TurnView;
pub use merge::merge_frozen;
pub use missing::{missing_fields, same_missing_set};
pub use recommend::{derive_service_id, effective_headcount};
pub use turn::{plan_turn, TurnPlan};
pub use validate::{validate_extraction, Validated};
