//! Wire types for the design backend and the decode step at its boundary.
//!
//! The backend answers a chat request with either JSON or a raw image, and
//! tells the two apart with its `Content-Type` header. [`decode_response`]
//! turns that pair into a [`ServerResponse`] before anything is rendered, so
//! the widget never looks at transport details.
//!
//! # Example
//!
//! ```rust
//! use netcafe_chat::protocol::{ServerResponse, decode_response};
//!
//! let body = r#"{"response": "Đã ghi nhận."}"#.as_bytes();
//! let decoded = decode_response(Some("application/json"), body.to_vec().into()).unwrap();
//! assert_eq!(
//!     decoded,
//!     ServerResponse::Text { message: "Đã ghi nhận.".to_string() }
//! );
//! ```

use axum::body::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ChatError, Result};

/// Default path of the backend chat endpoint.
pub const DEFAULT_CHAT_PATH: &str = "/api/chat";

/// MIME type of JSON replies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// MIME type of binary (image) replies.
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// Request body sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Trimmed user message.
    pub message: String,
}

/// One layout-sizing entity as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRow {
    /// Entity-type code (`lối`, `giữa`, `quầy`, or a literal label).
    #[serde(rename = "type", default)]
    pub entity_type: String,
    /// Size scalar; the backend sends numbers (`5`) or strings (`"700x500"`).
    #[serde(default)]
    pub size: Value,
    /// Unit of `size`.
    #[serde(
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit: Option<String>,
    /// Presence flag, only set on reception counter rows.
    #[serde(
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub present: Option<String>,
}

/// Accept any JSON scalar as a display cell; `null` means absent.
fn scalar_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

impl ParameterRow {
    /// Display text of the size scalar.
    #[must_use]
    pub fn size_text(&self) -> String {
        match &self.size {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Parameters in the order the backend listed them.
pub type Parameters = Vec<(String, ParameterRow)>;

/// A backend reply after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerResponse {
    /// Plain text reply.
    Text {
        /// Bot message.
        message: String,
    },
    /// Text reply plus the current parameter set.
    Parameters {
        /// Bot message (empty when the backend omitted it).
        message: String,
        /// Parameter rows keyed by the backend's row key.
        parameters: Parameters,
    },
    /// Generated design image.
    Binary {
        /// Raw image bytes.
        image: Bytes,
    },
}

/// Content kind declared by the `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    /// `application/json`, with or without parameters such as a charset.
    Json,
    /// `application/octet-stream`.
    Binary,
    /// Anything else; the header value, or empty when absent.
    Other(String),
}

impl ContentKind {
    /// Classify a `Content-Type` header value.
    #[must_use]
    pub fn from_header(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.contains(JSON_CONTENT_TYPE) => Self::Json,
            Some(ct) if ct.contains(BINARY_CONTENT_TYPE) => Self::Binary,
            Some(ct) => Self::Other(ct.to_string()),
            None => Self::Other(String::new()),
        }
    }
}

/// Decode a successful backend reply.
///
/// Callers must have rejected non-success statuses already.
pub fn decode_response(content_type: Option<&str>, body: Bytes) -> Result<ServerResponse> {
    match ContentKind::from_header(content_type) {
        ContentKind::Json => decode_json(&body),
        ContentKind::Binary => Ok(ServerResponse::Binary { image: body }),
        ContentKind::Other(ct) if ct.is_empty() => Err(ChatError::UnsupportedContentType(
            "(không có Content-Type)".to_string(),
        )),
        ContentKind::Other(ct) => Err(ChatError::UnsupportedContentType(ct)),
    }
}

fn decode_json(body: &[u8]) -> Result<ServerResponse> {
    let value: Value = serde_json::from_slice(body)?;
    let Value::Object(mut object) = value else {
        return Err(ChatError::NoSuitableResponse);
    };

    let message = match object.remove("response") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            return Err(ChatError::Malformed(format!(
                "`response` không phải chuỗi: {other}"
            )));
        }
    };

    match object.remove("parameters") {
        None | Some(Value::Null) => {}
        Some(Value::Object(rows)) => {
            return Ok(ServerResponse::Parameters {
                message: message.unwrap_or_default(),
                parameters: parameter_rows(rows)?,
            });
        }
        // A list is keyed by position, so `[]` is an empty table.
        Some(Value::Array(items)) => {
            let rows = items
                .into_iter()
                .enumerate()
                .map(|(index, row)| (index.to_string(), row));
            return Ok(ServerResponse::Parameters {
                message: message.unwrap_or_default(),
                parameters: parameter_rows(rows)?,
            });
        }
        Some(other) => {
            return Err(ChatError::Malformed(format!(
                "`parameters` không phải đối tượng: {other}"
            )));
        }
    }

    match message {
        Some(message) if !message.is_empty() => Ok(ServerResponse::Text { message }),
        _ => Err(ChatError::NoSuitableResponse),
    }
}

fn parameter_rows(rows: impl IntoIterator<Item = (String, Value)>) -> Result<Parameters> {
    rows.into_iter()
        .map(|(key, row)| {
            let row: ParameterRow = serde_json::from_value(row)
                .map_err(|e| ChatError::Malformed(format!("thông số `{key}`: {e}")))?;
            Ok((key, row))
        })
        .collect()
}
