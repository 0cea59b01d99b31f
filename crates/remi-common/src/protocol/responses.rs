use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::error::{RemiError, Result};
use crate::protocol::fault::Fault;

/// Outcome tag of a response. Serialized as the literal strings
/// `"success"`, `"void"` and `"failed"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Void,
    Failed,
}

/// One reply, server to client: the return value, nothing (for a void
/// method), or a serialized [`Fault`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Response {
    pub fn success(value: Value) -> Self {
        Response {
            status: Status::Success,
            payload: Some(value),
        }
    }

    pub fn void() -> Self {
        Response {
            status: Status::Void,
            payload: None,
        }
    }

    pub fn failed(fault: Fault) -> Self {
        Response {
            status: Status::Failed,
            payload: serde_json::to_value(&fault).ok(),
        }
    }

    /// Decodes the fault carried by a failed response.
    pub fn fault(&self) -> Result<Fault> {
        let payload = self
            .payload
            .clone()
            .ok_or_else(|| RemiError::transport("failed response carries no fault payload"))?;
        Ok(serde_json::from_value(payload)?)
    }
}
