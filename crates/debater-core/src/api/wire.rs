//! JSON bodies exchanged with the backend.
//!
//! Every reply shares one envelope: `{"success": true, ...payload}` or
//! `{"success": false, "error": "..."}`. Decoding goes through [`Reply`], which
//! refuses anything that fits neither shape.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::documents::Document;

#[derive(Debug, Deserialize)]
pub struct GenerateReply {
    pub result: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentsReply {
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    pub message: String,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Replies that carry only a human-readable message.
#[derive(Debug, Deserialize)]
pub struct MessageReply {
    pub message: String,
}

/// The two legal shapes of a reply.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply<T> {
    Success(T),
    Failure(Option<String>),
}

impl<T: DeserializeOwned> Reply<T> {
    /// `None` when the body is not a well-formed envelope for `T`.
    pub fn decode(body: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(body).ok()?;
        match value.get("success")?.as_bool()? {
            true => serde_json::from_value(value).ok().map(Reply::Success),
            false => Some(Reply::Failure(
                value.get("error").and_then(Value::as_str).map(str::to_string),
            )),
        }
    }
}

/// Best-effort `error` field from a body that may or may not be JSON.
pub fn error_field(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success_payload() {
        let reply = Reply::<GenerateReply>::decode(r#"{"success":true,"result":"R"}"#);
        assert!(matches!(reply, Some(Reply::Success(GenerateReply { ref result })) if result == "R"));
    }

    #[test]
    fn test_decode_failure_carries_error() {
        let reply = Reply::<GenerateReply>::decode(r#"{"success":false,"error":"x"}"#);
        assert!(matches!(reply, Some(Reply::Failure(Some(ref e))) if e == "x"));
    }

    #[test]
    fn test_decode_rejects_shape_mismatch() {
        // success without the payload field
        assert!(Reply::<GenerateReply>::decode(r#"{"success":true}"#).is_none());
        // success flag of the wrong type
        assert!(Reply::<GenerateReply>::decode(r#"{"success":"yes","result":"R"}"#).is_none());
        assert!(Reply::<GenerateReply>::decode(r#"{"result":"R"}"#).is_none());
        assert!(Reply::<GenerateReply>::decode("<html></html>").is_none());
    }

    #[test]
    fn test_upload_receipt_files_default() {
        let reply = Reply::<UploadReceipt>::decode(r#"{"success":true,"message":"ok"}"#);
        match reply {
            Some(Reply::Success(receipt)) => assert!(receipt.files.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_field() {
        assert_eq!(error_field(r#"{"error":"boom"}"#).as_deref(), Some("boom"));
        assert_eq!(error_field(r#"{"error":"  "}"#), None);
        assert_eq!(error_field("Internal Server Error"), None);
    }
}
