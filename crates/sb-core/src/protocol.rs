//! Messages exchanged between the extension UI and its background process.

use serde::{Deserialize, Serialize};

/// Request sent from a UI surface to the background process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Message {
    /// Replace the active rules with ones derived from `sites`.
    #[serde(rename = "updateRules")]
    UpdateRules { sites: Vec<String> },
}

impl Message {
    /// Parse a message, turning anything unrecognized into an error response.
    pub fn parse(json: &str) -> Result<Self, Response> {
        serde_json::from_str(json).map_err(|e| Response::error(format!("Invalid message: {}", e)))
    }
}

/// Reply to a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Ok,
    Error { error: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { error: message.into() }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(_) => r#"{"status":"error","error":"failed to encode response"}"#.to_string(),
        }
    }
}

impl<E: std::fmt::Display> From<Result<(), E>> for Response {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(e) => Self::error(e.to_string()),
        }
    }
}
