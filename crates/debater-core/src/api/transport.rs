use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// Whatever came back over the wire, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }
}

/// A file selected for upload, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Wire boundary the client consumes. Implementations must be cancel-safe:
/// dropping a returned future aborts the underlying request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError>;

    async fn post_json(&self, path: &str, body: Value) -> Result<RawResponse, TransportError>;

    async fn post_files(
        &self,
        path: &str,
        field: &str,
        files: Vec<UploadFile>,
    ) -> Result<RawResponse, TransportError>;
}
