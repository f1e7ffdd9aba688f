//! Source documents known to the backend, and uploading new ones.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{DebateClient, UploadFile, UploadReceipt};
use crate::error::RequestOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Document {
    /// Size in megabytes, two decimals.
    pub fn size_mb(&self) -> String {
        format!("{:.2}", self.size as f64 / (1024.0 * 1024.0))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentLibrary {
    documents: Vec<Document>,
    selected: Option<String>,
}

impl DocumentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Replace the list. The selection survives if the document is still there.
    pub fn replace(&mut self, documents: Vec<Document>) {
        if let Some(name) = &self.selected {
            if !documents.iter().any(|d| &d.name == name) {
                self.selected = None;
            }
        }
        self.documents = documents;
    }

    /// Fetch the current list. On failure the old list is kept.
    pub async fn refresh(&mut self, client: &DebateClient) -> RequestOutcome<usize> {
        let listing = client.documents().await;
        self.apply_listing(listing)
    }

    /// Apply a listing fetched elsewhere, e.g. on a spawned task. Same rules
    /// as [`refresh`](Self::refresh).
    pub fn apply_listing(
        &mut self,
        listing: RequestOutcome<Vec<Document>>,
    ) -> RequestOutcome<usize> {
        match listing {
            Ok(documents) => {
                info!(count = documents.len(), "documents refreshed");
                self.replace(documents);
                Ok(self.documents.len())
            }
            Err(failure) => {
                warn!(kind = ?failure.kind, "document refresh failed");
                Err(failure)
            }
        }
    }

    pub fn select(&mut self, name: &str) -> bool {
        if self.documents.iter().any(|d| d.name == name) {
            self.selected = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&Document> {
        let name = self.selected.as_deref()?;
        self.documents.iter().find(|d| d.name == name)
    }

    pub fn selected_index(&self) -> Option<usize> {
        let name = self.selected.as_deref()?;
        self.documents.iter().position(|d| d.name == name)
    }
}

/// Read the selected files for upload.
pub async fn load_upload_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<UploadFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("Not a file path: {}", path.display()))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(UploadFile { name, bytes });
    }
    Ok(files)
}

/// Upload `files`. An empty selection does nothing and returns `None`.
pub async fn upload(
    client: &DebateClient,
    files: Vec<UploadFile>,
) -> Option<RequestOutcome<UploadReceipt>> {
    if files.is_empty() {
        return None;
    }
    Some(client.upload(files).await)
}
