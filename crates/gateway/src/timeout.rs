use std::future::Future;
use std::time::Duration;

use arbiter_ports::{ConnectorError, ConnectorResult};

/// Run a venue call under a deadline
///
/// Elapsing the deadline yields `ConnectorError::Timeout`; the call's
/// future is dropped.
pub async fn call_with_timeout<T, F>(limit: Duration, call: F) -> ConnectorResult<T>
where
    F: Future<Output = ConnectorResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ConnectorError::Timeout(limit.as_millis() as u64)),
    }
}
