//! Per-attempt deadlines.
//!
//! Timeout errors are distinct from upstream errors so callers can tell a
//! hung call from a rejected one.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// An attempt exceeded its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation timed out after {}ms", .0.as_millis())]
pub struct AttemptTimeout(pub Duration);

/// Run `fut` under `limit`; `None` means no deadline.
pub async fn with_timeout<T, E, F>(limit: Option<Duration>, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<AttemptTimeout>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(AttemptTimeout(limit).into()),
        },
        None => fut.await,
    }
}
