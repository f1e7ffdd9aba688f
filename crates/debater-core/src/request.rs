//! Time-bounded request execution.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::api::transport::RawResponse;
use crate::classify::{Attempt, Interruption};
use crate::error::TransportError;

/// Run `call` for at most `bound`.
///
/// When the bound elapses the call future is dropped, which aborts the
/// in-flight transport operation, so no late response can surface. When the
/// call finishes first the timer is dropped with it.
pub async fn bounded<F>(bound: Duration, call: F) -> Attempt
where
    F: Future<Output = Result<RawResponse, TransportError>>,
{
    match tokio::time::timeout(bound, call).await {
        Ok(Ok(raw)) => Ok(raw),
        Ok(Err(err)) => Err(Interruption::Transport(err)),
        Err(_) => {
            warn!(bound_secs = bound.as_secs(), "request exceeded its bound, aborting");
            Err(Interruption::TimedOut)
        }
    }
}
