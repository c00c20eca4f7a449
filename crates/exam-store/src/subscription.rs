//! Periodic refetch published over a watch channel.
//!
//! A [`Subscription`] runs one fetch at a time: the next fetch is scheduled
//! `interval` after the previous one completes. A value is published only
//! when it differs from the last published one. Fetch errors are logged and
//! the last value stays current. The task stops when the subscription is
//! cancelled or dropped.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::Result;

pub struct Subscription<T> {
    receiver: watch::Receiver<Option<T>>,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl<T> Subscription<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Start polling `fetch` every `interval` on the current runtime.
    pub fn spawn<F, Fut>(interval: Duration, fetch: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self::with_token(interval, CancellationToken::new(), fetch)
    }

    /// Like [`Subscription::spawn`], stopping when `token` (or a parent of it) is cancelled.
    pub fn with_token<F, Fut>(interval: Duration, token: CancellationToken, mut fetch: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (sender, receiver) = watch::channel(None);
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            loop {
                let result = tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    result = fetch() => result,
                };

                match result {
                    Ok(value) => {
                        let published = sender.send_if_modified(|current| {
                            if current.as_ref() == Some(&value) {
                                false
                            } else {
                                *current = Some(value);
                                true
                            }
                        });
                        if published {
                            debug!("subscription published a new value");
                        }
                    }
                    Err(err) => warn!(error = %err, "subscription fetch failed, keeping last value"),
                }

                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            debug!("subscription stopped");
        });

        Self {
            receiver,
            token,
            handle,
        }
    }

    /// The last published value, if any fetch has succeeded yet.
    pub fn latest(&self) -> Option<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next published value. Returns `None` once the task has stopped.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        self.receiver.borrow_and_update().clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to stop after cancellation.
    pub async fn join(mut self) {
        self.token.cancel();
        if let Err(err) = (&mut self.handle).await {
            warn!(error = %err, "subscription task ended abnormally");
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
