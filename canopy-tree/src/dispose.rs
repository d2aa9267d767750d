//! Binding async work to a node's lifetime.
//!
//! A node's dispose token ([`WidgetTree::dispose_token`](crate::WidgetTree::dispose_token))
//! is cancelled when the node is disposed. Work running on other tasks or
//! threads never touches the tree; it only watches the token.

use std::future::Future;
pub use tokio_util::sync::CancellationToken;

/// The owning node was disposed before the work finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("interrupted: owning node was disposed")]
pub struct Interrupted;

/// Drive `future` until it completes or the token is cancelled.
///
/// A token that is already cancelled resolves to `Err(Interrupted)` without
/// polling the future.
pub async fn run_until_disposed<F>(token: &CancellationToken, future: F) -> Result<F::Output, Interrupted>
where
    F: Future,
{
    if token.is_cancelled() {
        return Err(Interrupted);
    }
    token.run_until_cancelled(future).await.ok_or(Interrupted)
}

/// Like [`run_until_disposed`] for fallible work, flattening both failures
/// into the caller's error type.
pub async fn try_run_until_disposed<F, T, E>(token: &CancellationToken, future: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<Interrupted>,
{
    run_until_disposed(token, future).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_completes_when_not_cancelled() {
        let token = CancellationToken::new();
        let value = run_until_disposed(&token, async { 7 }).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test]
    async fn test_interrupted_by_cancel() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            canceller.cancel();
        });

        let result = run_until_disposed(&token, std::future::pending::<()>()).await;
        assert_eq!(result, Err(Interrupted));
    }

    #[tokio::test]
    async fn test_already_cancelled_token() {
        let token = CancellationToken::new();
        token.cancel();
        let result = run_until_disposed(&token, async { 1 }).await;
        assert_eq!(result, Err(Interrupted));
    }

    #[derive(Debug, PartialEq)]
    enum LoadError {
        Interrupted,
        Missing,
    }

    impl From<Interrupted> for LoadError {
        fn from(_: Interrupted) -> Self {
            LoadError::Interrupted
        }
    }

    #[tokio::test]
    async fn test_try_run_flattens_errors() {
        let token = CancellationToken::new();
        let result: Result<u8, LoadError> =
            try_run_until_disposed(&token, async { Err(LoadError::Missing) }).await;
        assert_eq!(result, Err(LoadError::Missing));

        token.cancel();
        let result: Result<u8, LoadError> = try_run_until_disposed(&token, async { Ok(1) }).await;
        assert_eq!(result, Err(LoadError::Interrupted));
    }
}
