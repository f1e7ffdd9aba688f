//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{RawResponse, Transport, UploadFile};
use crate::error::TransportError;

pub(crate) enum Script {
    Respond(RawResponse),
    Refuse,
    Hang,
}

/// Plays back one scripted reply per request, whatever the path.
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Script>>,
    pub(crate) topics: Mutex<Vec<String>>,
    pub(crate) paths: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub(crate) fn with(script: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            topics: Mutex::new(Vec::new()),
            paths: Mutex::new(Vec::new()),
        })
    }

    async fn play(&self, path: &str) -> Result<RawResponse, TransportError> {
        self.paths.lock().unwrap().push(path.to_string());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Script::Respond(raw)) => Ok(raw),
            Some(Script::Refuse) | None => Err(TransportError("connection refused".into())),
            Some(Script::Hang) => std::future::pending().await,
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError> {
        self.play(path).await
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<RawResponse, TransportError> {
        if let Some(topic) = body.get("topic").and_then(Value::as_str) {
            self.topics.lock().unwrap().push(topic.to_string());
        }
        self.play(path).await
    }

    async fn post_files(
        &self,
        path: &str,
        _field: &str,
        _files: Vec<UploadFile>,
    ) -> Result<RawResponse, TransportError> {
        self.play(path).await
    }
}

/// A JSON reply with the given status.
pub(crate) fn reply(status: u16, body: Value) -> Script {
    Script::Respond(RawResponse::json(status, body.to_string()))
}
