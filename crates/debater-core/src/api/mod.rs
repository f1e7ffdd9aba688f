pub mod http;
pub mod transport;
pub mod wire;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info};

pub use http::HttpTransport;
pub use transport::{RawResponse, Transport, UploadFile};
pub use wire::UploadReceipt;

use crate::classify::Classifier;
use crate::documents::Document;
use crate::error::RequestOutcome;
use crate::request::bounded;
use wire::{DocumentsReply, GenerateReply, MessageReply};

pub const GENERATE_PATH: &str = "/api/generate";
pub const DOCUMENTS_PATH: &str = "/api/documents";
pub const UPLOAD_PATH: &str = "/api/upload";
pub const HEALTH_PATH: &str = "/api/test";
pub const CREATE_DATABASE_PATH: &str = "/api/create_database";
pub const UPLOAD_FIELD: &str = "files";

/// Upper bounds for each request family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPolicy {
    pub generate_timeout: Duration,
    pub upload_timeout: Duration,
    pub list_timeout: Duration,
    pub database_timeout: Duration,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            generate_timeout: Duration::from_secs(600),
            upload_timeout: Duration::from_secs(120),
            list_timeout: Duration::from_secs(30),
            database_timeout: Duration::from_secs(180),
        }
    }
}

/// Typed operations against the debate backend. Cheap to clone; clones share
/// the transport.
#[derive(Clone)]
pub struct DebateClient {
    transport: Arc<dyn Transport>,
    policy: RequestPolicy,
}

impl DebateClient {
    pub fn new(transport: Arc<dyn Transport>, policy: RequestPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn http(base_url: &str, policy: RequestPolicy) -> Self {
        Self::new(Arc::new(HttpTransport::new(base_url)), policy)
    }

    pub async fn generate(&self, topic: &str) -> RequestOutcome<String> {
        info!(topic, "requesting debate generation");
        let attempt = bounded(
            self.policy.generate_timeout,
            self.transport.post_json(GENERATE_PATH, json!({ "topic": topic })),
        )
        .await;
        Classifier::generation()
            .classify::<GenerateReply>(attempt)
            .map(|reply| reply.result)
    }

    pub async fn documents(&self) -> RequestOutcome<Vec<Document>> {
        debug!("listing documents");
        let attempt = bounded(self.policy.list_timeout, self.transport.get(DOCUMENTS_PATH)).await;
        Classifier::library()
            .classify::<DocumentsReply>(attempt)
            .map(|reply| reply.documents)
    }

    pub async fn upload(&self, files: Vec<UploadFile>) -> RequestOutcome<UploadReceipt> {
        info!(count = files.len(), "uploading documents");
        let attempt = bounded(
            self.policy.upload_timeout,
            self.transport.post_files(UPLOAD_PATH, UPLOAD_FIELD, files),
        )
        .await;
        Classifier::upload().classify::<UploadReceipt>(attempt)
    }

    pub async fn ping(&self) -> RequestOutcome<String> {
        let attempt = bounded(self.policy.list_timeout, self.transport.get(HEALTH_PATH)).await;
        Classifier::library()
            .classify::<MessageReply>(attempt)
            .map(|reply| reply.message)
    }

    /// Rebuild the backend's retrieval index from the uploaded documents.
    pub async fn create_database(&self) -> RequestOutcome<String> {
        info!("rebuilding document database");
        let attempt = bounded(
            self.policy.database_timeout,
            self.transport.post_json(CREATE_DATABASE_PATH, json!({})),
        )
        .await;
        Classifier::database()
            .classify::<MessageReply>(attempt)
            .map(|reply| reply.message)
    }
}
