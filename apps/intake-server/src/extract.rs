use intake_protocol::RequirementRecord;
use serde_json::{json, Value};
use tracing::debug;

use crate::model::{ModelClient, ModelError};

/// Parse raw model text as one JSON object, tolerating code fences and
/// surrounding commentary by slicing from the first `{` to the last `}`.
fn lenient_json(raw: &str) -> Result<Value, ModelError> {
    let txt = raw.trim();
    if txt.is_empty() {
        return Err(ModelError::Format);
    }
    let body = if txt.starts_with('{') {
        txt
    } else {
        let start = txt.find('{').ok_or(ModelError::Format)?;
        let end = txt.rfind('}').ok_or(ModelError::Format)?;
        if end <= start {
            return Err(ModelError::Format);
        }
        &txt[start..=end]
    };
    let value: Value = serde_json::from_str(body).map_err(|_| ModelError::Format)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ModelError::Format)
    }
}

/// Run the schema-constrained extraction with one repair retry on malformed
/// output. A second parse failure degrades to an empty object ("the model
/// had nothing to add"); only transport failures escalate.
pub async fn model_extract(
    client: &dyn ModelClient,
    message: &str,
    previous: &RequirementRecord,
) -> Result<Value, ModelError> {
    let raw = client.extract(message, previous, false).await?;
    match lenient_json(&raw) {
        Ok(value) => Ok(value),
        Err(ModelError::Format) => {
            debug!(target: "intake::extract", "model output unparsable, issuing repair request");
            let raw = client.extract(message, previous, true).await?;
            Ok(lenient_json(&raw).unwrap_or_else(|_| json!({})))
        }
        Err(err) => Err(err),
    }
}
