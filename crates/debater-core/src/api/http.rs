use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use super::transport::{RawResponse, Transport, UploadFile};
use crate::error::TransportError;

/// `reqwest` transport against the debate backend.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read(response: Response) -> Result<RawResponse, TransportError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        debug!(status, ?content_type, bytes = body.len(), "response received");
        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::read(response).await
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn post_files(
        &self,
        path: &str,
        field: &str,
        files: Vec<UploadFile>,
    ) -> Result<RawResponse, TransportError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.name)
                .mime_str("application/pdf")?;
            form = form.part(field.to_string(), part);
        }

        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await?;
        Self::read(response).await
    }
}
