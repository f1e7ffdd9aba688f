use thiserror::Error;

/// Closed set of ways a request against the backend can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The bound elapsed before any response arrived.
    #[error("request timed out")]
    Timeout,
    /// Transport failed before a response was obtained.
    #[error("network error")]
    Network,
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),
    /// Wrong content type or a payload that doesn't fit the envelope.
    #[error("malformed response")]
    MalformedResponse,
    /// Well-formed reply with `success: false`.
    #[error("{0}")]
    ApplicationError(String),
    #[error("topic is empty")]
    InvalidInput,
}

/// A classified failure plus the copy shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl RequestFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub type RequestOutcome<T> = Result<T, RequestFailure>;

/// Why a submission was refused before touching the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("topic is empty")]
    EmptyTopic,
    #[error("a generation is already in flight")]
    Busy,
}

impl Rejected {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Rejected::EmptyTopic => Some(ErrorKind::InvalidInput),
            Rejected::Busy => None,
        }
    }
}

/// Failure from the wire layer, before any classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport failed: {0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}
