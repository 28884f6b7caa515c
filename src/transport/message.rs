use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire envelope for a single RPC command.
///
/// `pattern` selects the handler on the backend by string equality; `id`
/// correlates the reply with the call that produced it, so a reply arriving
/// after the caller gave up can be recognized and discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: String,
    pub pattern: String,
    pub payload: Value,
}

/// Wire envelope for the reply to a command. Exactly one of `value` and
/// `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    pub fn ok(id: &str, value: Value) -> Self {
        Self {
            id: id.to_string(),
            value: Some(value),
            error: None,
        }
    }

    pub fn err(id: &str, reason: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            value: None,
            error: Some(reason.into()),
        }
    }
}
