use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;

/// The operation did not resolve before its deadline. The operation's
/// future has been dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} did not complete within {deadline:?}")]
pub struct DeadlineElapsed {
    pub operation: String,
    pub deadline: Duration,
}

/// Race `operation` against `deadline`; whichever resolves first wins.
pub async fn with_deadline<Fut, T>(
    deadline: Duration,
    operation_name: &str,
    operation: Fut,
) -> Result<T, DeadlineElapsed>
where
    Fut: Future<Output = T>,
{
    match timeout(deadline, operation).await {
        Ok(result) => {
            log::debug!("{} completed within {:?}", operation_name, deadline);
            Ok(result)
        }
        Err(_) => {
            log::warn!(
                "{} timed out after {:?}, abandoning it",
                operation_name,
                deadline
            );
            Err(DeadlineElapsed {
                operation: operation_name.to_string(),
                deadline,
            })
        }
    }
}
