use intake_protocol::ServiceCatalogEntry;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate service id: {0}")]
    DuplicateId(String),
    #[error("service {id} has min_count {min} greater than max_count {max}")]
    InvalidRange { id: String, min: u32, max: u32 },
}

#[derive(Deserialize)]
struct CatalogFile {
    services: Vec<ServiceCatalogEntry>,
}

/// Fixed service catalog, loaded once and immutable for the process
/// lifetime.
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    entries: Vec<ServiceCatalogEntry>,
}

impl ServiceCatalog {
    /// Built-in default packages.
    pub fn builtin() -> Self {
        let entries = vec![
            ServiceCatalogEntry {
                id: "tech_startup_pack".into(),
                name: "Tech Startup Hiring Pack".into(),
                description: "Ideal for startups hiring core product/engineering/design roles. \
                              Includes sourcing, screening, and 3 shortlisted candidates per role."
                    .into(),
                roles: vec![
                    "software engineer".into(),
                    "backend engineer".into(),
                    "frontend engineer".into(),
                    "full stack engineer".into(),
                    "ui/ux designer".into(),
                    "product designer".into(),
                ],
                min_count: 1,
                max_count: 10,
                price: 5000.0,
            },
            ServiceCatalogEntry {
                id: "growth_pack".into(),
                name: "Growth Team Bundle".into(),
                description: "For fast-scaling teams hiring multiple IC roles across engineering \
                              and product. Volume pricing and parallel pipelines."
                    .into(),
                roles: vec![
                    "software engineer".into(),
                    "backend engineer".into(),
                    "frontend engineer".into(),
                    "qa engineer".into(),
                    "devops engineer".into(),
                    "product manager".into(),
                ],
                min_count: 3,
                max_count: 20,
                price: 12000.0,
            },
            ServiceCatalogEntry {
                id: "executive_search".into(),
                name: "Executive Search".into(),
                description: "Confidential search for senior leadership (Director/VP/C-Level) \
                              with targeted headhunting."
                    .into(),
                roles: vec![
                    "cto".into(),
                    "cfo".into(),
                    "ceo".into(),
                    "vp engineering".into(),
                    "head of product".into(),
                ],
                min_count: 1,
                max_count: 3,
                price: 15000.0,
            },
            ServiceCatalogEntry {
                id: "contract_staffing".into(),
                name: "Contract / Staff Aug".into(),
                description: "On-demand contractors with flexible engagements. Good for urgent \
                              or short-term needs."
                    .into(),
                roles: vec![
                    "software engineer".into(),
                    "data engineer".into(),
                    "ui/ux designer".into(),
                    "qa engineer".into(),
                    "devops engineer".into(),
                ],
                min_count: 1,
                max_count: 30,
                // priced per seat/month
                price: 0.0,
            },
        ];
        Self::from_entries(entries).expect("builtin catalog is valid")
    }

    pub fn from_entries(entries: Vec<ServiceCatalogEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.id.clone()) {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
            if entry.min_count > entry.max_count {
                return Err(CatalogError::InvalidRange {
                    id: entry.id.clone(),
                    min: entry.min_count,
                    max: entry.max_count,
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(raw)?;
        Self::from_entries(file.services)
    }

    pub fn load_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&raw)?;
        info!(
            target: "intake::catalog",
            path = %path.display(),
            services = catalog.entries.len(),
            "loaded service catalog"
        );
        Ok(catalog)
    }

    /// Catalog from `INTAKE_CATALOG_PATH`, or the built-in default. An
    /// unreadable or invalid file is a startup error, not a silent fallback.
    pub fn load_from_env() -> Result<Self, CatalogError> {
        match std::env::var("INTAKE_CATALOG_PATH") {
            Ok(path) if !path.trim().is_empty() => Self::load_file(Path::new(path.trim())),
            _ => Ok(Self::builtin()),
        }
    }

    pub fn entries(&self) -> &[ServiceCatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&ServiceCatalogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Drop a proposed id unless it references a real catalog entry.
    pub fn keep_valid_id(&self, id: Option<String>) -> Option<String> {
        id.filter(|candidate| self.contains(candidate))
    }

    /// Reduced view embedded in the model prompt: ids and eligibility only.
    pub fn light(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|entry| {
                    json!({
                        "id": entry.id,
                        "name": entry.name,
                        "description": entry.description,
                        "roles": entry.roles,
                        "minCount": entry.min_count,
                        "maxCount": entry.max_count,
                    })
                })
                .collect(),
        )
    }
}
