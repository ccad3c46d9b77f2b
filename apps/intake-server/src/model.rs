use std::sync::Arc;

use async_trait::async_trait;
use intake_core::ServiceCatalog;
use intake_protocol::{ExtractionPayload, RequirementRecord};
use serde_json::{json, Value};
use thiserror::Error;

use crate::http_timeout;

#[derive(Debug, Error)]
pub enum ModelError {
    /// Network/auth/timeout talking to the provider. Escalates to the turn
    /// pipeline, which degrades to heuristic-only extraction.
    #[error("model transport failure: {0}")]
    Transport(String),
    /// Output that is not a single JSON object. Recovered locally with one
    /// repair attempt, then treated as an empty extraction.
    #[error("model output was not valid JSON")]
    Format,
}

/// External model collaborator: latest message + prior normalized record in,
/// raw text that should parse as one JSON object out. Injected explicitly so
/// tests can script it.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn extract(
        &self,
        message: &str,
        previous: &RequirementRecord,
        repair: bool,
    ) -> Result<String, ModelError>;

    fn label(&self) -> &'static str;
}

const REPAIR_NOTE: &str = "The previous response was not valid JSON for the required structure.\n\
                           Re-output ONLY a strict JSON object matching the structure.";

/// OpenAI-compatible chat-completions client, configured from
/// `INTAKE_MODEL_*` env vars.
pub struct HttpModelClient {
    base_url: String,
    api_key: String,
    model: String,
    catalog: Arc<ServiceCatalog>,
}

impl HttpModelClient {
    /// None when no API key is configured; the caller falls back to the
    /// synthetic client and the agent runs heuristic-only.
    pub fn from_env(catalog: Arc<ServiceCatalog>) -> Option<Self> {
        let api_key = std::env::var("INTAKE_MODEL_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())?;
        let base_url = std::env::var("INTAKE_MODEL_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let model =
            std::env::var("INTAKE_MODEL_NAME").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        Some(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key,
            model,
            catalog,
        })
    }

    fn system_prompt(&self) -> String {
        let schema = schemars::schema_for!(ExtractionPayload);
        let schema_json =
            serde_json::to_string(&schema).unwrap_or_else(|_| "{}".to_string());
        [
            "You are a sales assistant for a recruitment agency.",
            "Return ONE JSON object that matches the response schema exactly (no extra keys).",
            "",
            "Extraction rules:",
            "- roles: clean human titles (array).",
            "- location: city/region/country only.",
            "- count: integer number of hires.",
            "- timeline: short strings like \"10 days\", \"2 weeks\", \"3 months\".",
            "- urgency: boolean from words like \"urgent\", \"ASAP\".",
            "- budget: parse \"10 lakh\" => 1000000 (INR).",
            "",
            "Behavior:",
            "- Use prior context plus the latest message.",
            "- If enough info is present, set recommendedServiceId using the catalog ids.",
            "- ALWAYS produce assistant_message that asks ONLY still-missing fields.",
            "",
            "Service catalog (pick by id only):",
            &self.catalog.light().to_string(),
            "",
            "Response schema:",
            &schema_json,
        ]
        .join("\n")
    }

    fn user_prompt(message: &str, previous: &RequirementRecord) -> String {
        let previous_json =
            serde_json::to_string_pretty(previous).unwrap_or_else(|_| "{}".to_string());
        let quoted_message =
            serde_json::to_string(message).unwrap_or_else(|_| format!("\"{message}\""));
        [
            "Previous normalized context (may be empty):",
            &previous_json,
            "",
            "Latest user message:",
            &quoted_message,
            "",
            "Return ONLY a strict JSON object (no extra text).",
        ]
        .join("\n")
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn extract(
        &self,
        message: &str,
        previous: &RequirementRecord,
        repair: bool,
    ) -> Result<String, ModelError> {
        let api_url = format!("{}/v1/chat/completions", self.base_url);
        let mut user = Self::user_prompt(message, previous);
        if repair {
            user = format!("{}\n\n{}", REPAIR_NOTE, user);
        }
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": self.system_prompt()},
                {"role": "user", "content": user},
            ],
            "temperature": 0.2,
            "response_format": {"type": "json_object"},
        });

        let client = reqwest::Client::builder()
            .timeout(http_timeout::get_duration())
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        let resp = client
            .post(&api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(ModelError::Transport(format!(
                "provider returned status {status}"
            )));
        }
        let envelope: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ModelError::Transport(format!("unreadable provider response: {e}")))?;
        let content = envelope
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .unwrap_or_default();
        Ok(content.to_string())
    }

    fn label(&self) -> &'static str {
        "openai-compatible"
    }
}

/// Offline stand-in used when no API key is configured: always "nothing to
/// add", so the agent runs on the heuristic extractor alone.
pub struct SyntheticModelClient;

#[async_trait]
impl ModelClient for SyntheticModelClient {
    async fn extract(
        &self,
        _message: &str,
        _previous: &RequirementRecord,
        _repair: bool,
    ) -> Result<String, ModelError> {
        Ok("{}".to_string())
    }

    fn label(&self) -> &'static str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpModelClient {
        HttpModelClient {
            base_url: "https://example.invalid".into(),
            api_key: "test-key".into(),
            model: "test-model".into(),
            catalog: Arc::new(ServiceCatalog::builtin()),
        }
    }

    #[test]
    fn system_prompt_embeds_catalog_and_schema() {
        let prompt = client().system_prompt();
        assert!(prompt.contains("growth_pack"));
        assert!(prompt.contains("assistant_message"));
        assert!(prompt.contains("Response schema:"));
    }

    #[test]
    fn user_prompt_quotes_the_message() {
        let previous = RequirementRecord::default();
        let prompt = HttpModelClient::user_prompt("need \"2\" devs", &previous);
        assert!(prompt.contains("\"need \\\"2\\\" devs\""));
        assert!(prompt.contains("Previous normalized context"));
    }

    #[tokio::test]
    async fn synthetic_client_has_nothing_to_add() {
        let raw = SyntheticModelClient
            .extract("anything", &RequirementRecord::default(), false)
            .await
            .expect("synthetic");
        assert_eq!(raw, "{}");
    }
}
