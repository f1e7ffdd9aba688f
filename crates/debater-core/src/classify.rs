//! Maps raw request outcomes onto [`ErrorKind`].
//!
//! Precedence, first match wins:
//!
//! 1. cancelled because the bound elapsed → `Timeout`
//! 2. transport failed before a response → `Network`
//! 3. non-2xx status → `HttpStatus(code)`
//! 4. content type is not JSON → `MalformedResponse`
//! 5. envelope says `success: false` → `ApplicationError(error)`
//!
//! A response that passes all five is decoded into the caller's payload type;
//! a payload that doesn't fit is `MalformedResponse` as well.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::transport::RawResponse;
use crate::api::wire::{error_field, Reply};
use crate::error::{ErrorKind, RequestFailure, RequestOutcome, TransportError};

/// Why no response was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interruption {
    TimedOut,
    Transport(TransportError),
}

/// One attempt as seen by the classifier.
pub type Attempt = Result<RawResponse, Interruption>;

/// User-facing copy for one family of requests. The taxonomy is shared; only
/// the wording differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureCopy {
    pub timeout: &'static str,
    pub network: &'static str,
    pub malformed: &'static str,
    /// Prefix for HTTP failures.
    pub error_prefix: &'static str,
    /// Prefix for server-reported application errors.
    pub refused_prefix: &'static str,
}

pub const GENERATION_COPY: FailureCopy = FailureCopy {
    timeout: "Request timed out. Please try a simpler topic or check system resources.",
    network: "Network error. Please check your connection and try again.",
    malformed: "Error: Expected a JSON response from the server.",
    error_prefix: "Error: ",
    refused_prefix: "Error: ",
};

pub const UPLOAD_COPY: FailureCopy = FailureCopy {
    timeout: "Upload timed out. Please try uploading fewer files.",
    network: "Network error during upload. Please check your connection.",
    malformed: "Upload error: Expected a JSON response from the server.",
    error_prefix: "Upload error: ",
    refused_prefix: "Upload failed: ",
};

pub const LIBRARY_COPY: FailureCopy = FailureCopy {
    timeout: "Timed out talking to the server.",
    network: "Network error. Is the debate server running?",
    malformed: "Error: Expected a JSON response from the server.",
    error_prefix: "Error: ",
    refused_prefix: "Error: ",
};

pub const DATABASE_COPY: FailureCopy = FailureCopy {
    timeout: "Database creation timed out. Please try again.",
    network: "Network error during database creation.",
    malformed: "Database creation error: Expected a JSON response from the server.",
    error_prefix: "Database creation error: ",
    refused_prefix: "Database creation failed: ",
};

#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    copy: FailureCopy,
}

impl Classifier {
    pub const fn new(copy: FailureCopy) -> Self {
        Self { copy }
    }

    pub const fn generation() -> Self {
        Self::new(GENERATION_COPY)
    }

    pub const fn upload() -> Self {
        Self::new(UPLOAD_COPY)
    }

    pub const fn library() -> Self {
        Self::new(LIBRARY_COPY)
    }

    pub const fn database() -> Self {
        Self::new(DATABASE_COPY)
    }

    /// Resolve an attempt into the decoded payload or exactly one failure.
    pub fn classify<T: DeserializeOwned>(&self, attempt: Attempt) -> RequestOutcome<T> {
        let outcome = match attempt {
            Err(interruption) => Err(self.interrupted(interruption)),
            Ok(raw) => self.response(&raw),
        };
        match &outcome {
            Ok(_) => debug!("request succeeded"),
            Err(failure) => warn!(kind = ?failure.kind, message = %failure.message, "request failed"),
        }
        outcome
    }

    fn interrupted(&self, interruption: Interruption) -> RequestFailure {
        match interruption {
            Interruption::TimedOut => RequestFailure::new(ErrorKind::Timeout, self.copy.timeout),
            Interruption::Transport(err) => {
                debug!(error = %err, "transport failure");
                RequestFailure::new(ErrorKind::Network, self.copy.network)
            }
        }
    }

    fn response<T: DeserializeOwned>(&self, raw: &RawResponse) -> RequestOutcome<T> {
        if !raw.is_success() {
            let message = match error_field(&raw.body) {
                Some(server) => format!("{}{} (HTTP {})", self.copy.error_prefix, server, raw.status),
                None => format!("{}HTTP error! status: {}", self.copy.error_prefix, raw.status),
            };
            return Err(RequestFailure::new(ErrorKind::HttpStatus(raw.status), message));
        }

        if !raw.is_json() {
            debug!(content_type = ?raw.content_type, "expected JSON response");
            return Err(self.malformed());
        }

        match Reply::<T>::decode(&raw.body) {
            Some(Reply::Success(payload)) => Ok(payload),
            Some(Reply::Failure(error)) => {
                let error = error.unwrap_or_else(|| "Unknown error".to_string());
                let message = format!("{}{}", self.copy.refused_prefix, error);
                Err(RequestFailure::new(ErrorKind::ApplicationError(error), message))
            }
            None => Err(self.malformed()),
        }
    }

    fn malformed(&self) -> RequestFailure {
        RequestFailure::new(ErrorKind::MalformedResponse, self.copy.malformed)
    }
}
