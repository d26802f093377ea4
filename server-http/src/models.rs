use relay::ResultRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const PROCESSING_STATUS: &str = "processing";
pub const PROCESSING_MESSAGE: &str =
    "Workflow is still running. Results will be available when complete.";
pub const STATUS_USAGE: &str = "/api/intake/status?session_id=xxx";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    pub backend: String,
    pub entries: u64,
}

// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            usage: None,
        }
    }
}

// === Completion Callback Models ===

/// Completion callback body. Only `session_id` and `status` are required;
/// anything else the workflow engine sends is ignored except `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionCallback {
    pub session_id: Option<String>,
    pub status: Option<String>,
    pub data: Value,
}

impl CompletionCallback {
    /// Parse a raw body; bodies that are not JSON read as an empty object
    pub fn from_body(body: &[u8]) -> Self {
        let value = serde_json::from_slice::<Value>(body).unwrap_or(Value::Null);
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Self {
        let text = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            session_id: text("session_id"),
            status: text("status"),
            data: value
                .get("data")
                .filter(|d| !d.is_null())
                .cloned()
                .unwrap_or_else(|| json!({})),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub received: bool,
    pub session_id: String,
    pub cached: bool,
}

// === Status Poll Models ===

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl StatusResponse {
    pub fn from_record(record: ResultRecord) -> Self {
        Self {
            status: record.status,
            data: Some(record.payload),
            message: None,
            cached: true,
            timestamp: Some(record.stored_at_ms),
        }
    }

    pub fn processing() -> Self {
        Self {
            status: PROCESSING_STATUS.to_string(),
            data: None,
            message: Some(PROCESSING_MESSAGE.to_string()),
            cached: false,
            timestamp: None,
        }
    }
}
