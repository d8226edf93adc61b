use std::convert::Infallible;
use std::future::{Future, pending};
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

use crate::core::error::Error;
use crate::core::state::AppState;

/// Deadline and shutdown signal that every store call is bounded by.
#[derive(Clone, Debug, Default)]
pub(crate) struct Context {
    deadline: Option<Instant>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl Context {
    pub(crate) fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            shutdown: None,
        }
    }

    pub(crate) fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub(crate) fn is_canceled(&self) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }

        self.shutdown
            .as_ref()
            .map(|shutdown| *shutdown.borrow())
            .unwrap_or(false)
    }

    /// Drives `operation` until it finishes or the context is canceled,
    /// whichever comes first. A canceled operation is dropped.
    pub(crate) async fn run<F, T>(&self, operation: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        if self.is_canceled() {
            return Err(Error::Canceled);
        }

        let deadline = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending().await,
            }
        };

        let shutdown = async {
            match self.shutdown.clone() {
                Some(mut shutdown) => {
                    let closed = shutdown.wait_for(|stop| *stop).await.is_err();

                    if closed {
                        // sender gone without ever signalling
                        pending::<()>().await;
                    }
                }
                None => pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = deadline => Err(Error::Canceled),
            _ = shutdown => Err(Error::Canceled),
            result = operation => result,
        }
    }
}

impl FromRequestParts<AppState> for Context {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Context::with_timeout(state.request_timeout).with_shutdown(state.shutdown.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expired_deadline_never_runs_operation() {
        let ctx = Context::with_timeout(Duration::ZERO);
        let mut ran = false;

        let result = ctx
            .run(async {
                ran = true;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(Error::Canceled)));
        assert!(!ran);
    }

    #[tokio::test]
    async fn test_deadline_cancels_slow_operation() {
        let ctx = Context::with_timeout(Duration::from_millis(20));

        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(Error::Canceled)));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_operation() {
        let (tx, rx) = watch::channel(false);
        let ctx = Context::default().with_shutdown(rx);

        let stop = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tx.send(true).unwrap();
        };

        let work = ctx.run(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        });

        let (_, result) = tokio::join!(stop, work);

        assert!(matches!(result, Err(Error::Canceled)));
    }

    #[tokio::test]
    async fn test_uncanceled_operation_completes() {
        let ctx = Context::with_timeout(Duration::from_secs(5));

        let result = ctx.run(async { Ok(7) }).await;

        assert_eq!(result.unwrap(), 7);
    }
}
