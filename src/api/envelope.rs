//! The uniform `{success, data, error}` response envelope.

use serde::{Deserialize, Serialize};

/// Fallback message when a failed envelope carries no error text.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// JSON object returned by the API.
pub type ApiData = serde_json::Map<String, serde_json::Value>;

/// Response envelope wrapping every API payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    /// Whether the call succeeded
    #[serde(default)]
    pub success: bool,

    /// Payload on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Error details on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

/// Error details inside a failed envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of unwrapping an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Unwrapped {
    /// `success = true`; holds `data`, empty when absent.
    Data(ApiData),
    /// `success = false`; holds the error message.
    Failure(String),
}

impl ApiEnvelope {
    /// Parse an envelope from a response body.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Split the envelope into its data or its error message.
    ///
    /// A non-object `data` value on success is wrapped under a `"value"` key.
    pub fn into_result(self) -> Unwrapped {
        if !self.success {
            let message = self
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            return Unwrapped::Failure(message);
        }

        match self.data {
            None | Some(serde_json::Value::Null) => Unwrapped::Data(ApiData::new()),
            Some(serde_json::Value::Object(map)) => Unwrapped::Data(map),
            Some(other) => {
                let mut map = ApiData::new();
                map.insert("value".to_string(), other);
                Unwrapped::Data(map)
            }
        }
    }
}
