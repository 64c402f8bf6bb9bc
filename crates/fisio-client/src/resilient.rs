//! Remote-first execution with an offline fallback.
//!
//! Per call: attempt the primary; on a connectivity failure run the fallback
//! once and hand back its result as if it were the primary's. Every other
//! failure propagates untouched. No retries, no backoff.

use std::future::Future;

use tracing::warn;

use crate::error::{ClientError, ErrorKind};

/// Where a successful result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Remote,
    Offline,
}

pub async fn with_fallback<T, P, F, Fut>(
    operation: &'static str,
    primary: P,
    fallback: F,
) -> Result<(T, Source), ClientError>
where
    P: Future<Output = Result<T, ClientError>>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    match primary.await {
        Ok(value) => Ok((value, Source::Remote)),
        Err(err) if err.kind() == ErrorKind::Connectivity => {
            warn!(operation, error = %err, "API unreachable, using offline store");
            let value = fallback().await?;
            Ok((value, Source::Offline))
        }
        Err(err) => Err(err),
    }
}
