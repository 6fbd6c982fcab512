//! Source trait for fetching raw layer index tables

#[cfg(test)]
use mockall::automock;

use serde_json::Value;

use crate::layerindex::error::IndexError;
use crate::layerindex::types::Endpoint;

/// Trait for fetching the records of one layer index endpoint
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait IndexSource: Send + Sync {
    /// Fetches every record served by `endpoint`
    ///
    /// # Returns
    /// * `Ok(Vec<Value>)` - Records in the order the registry returned them
    /// * `Err(IndexError)` - If the fetch fails or the body is not a JSON array
    async fn fetch(&self, endpoint: Endpoint) -> Result<Vec<Value>, IndexError>;
}

/// Interpret a response body as a list of records
pub(crate) fn into_records(body: Value, endpoint: Endpoint) -> Result<Vec<Value>, IndexError> {
    match body {
        Value::Array(records) => Ok(records),
        other => Err(IndexError::InvalidResponse(format!(
            "expected a JSON array from {}, got {}",
            endpoint.as_str(),
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
