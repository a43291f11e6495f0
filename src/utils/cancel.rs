use std::future::Future;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{Error, Result};

/// Cancellation context for one aggregation pass.
///
/// Every API call of the pass goes through [`Cancellation::run`], so a fired
/// signal or an expired deadline aborts the pass mid-page or mid-resolution.
#[derive(Clone, Debug)]
pub struct Cancellation {
    cancelled: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

/// Sending half of a [`Cancellation`]
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // Receivers may all be gone already; nothing left to cancel then.
        let _ = self.sender.send(true);
    }
}

impl Cancellation {
    pub fn new() -> (CancelHandle, Self) {
        let (sender, cancelled) = watch::channel(false);
        (
            CancelHandle { sender },
            Self {
                cancelled,
                deadline: None,
            },
        )
    }

    /// A context that never fires
    #[cfg(test)]
    pub fn none() -> Self {
        Self::new().1
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Drive `operation` to completion unless the context fires first.
    pub async fn run<F, T>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        // Mark the current value seen so a later signal still wakes `changed()`.
        let mut cancelled = self.cancelled.clone();
        if *cancelled.borrow_and_update() {
            return Err(Error::Cancelled);
        }
        if matches!(self.deadline, Some(deadline) if deadline <= Instant::now()) {
            return Err(Error::DeadlineExceeded);
        }

        let cancel_signal = async move {
            loop {
                if cancelled.changed().await.is_err() {
                    // Handle dropped without cancelling: never fires.
                    std::future::pending::<()>().await;
                }
                if *cancelled.borrow() {
                    return;
                }
            }
        };
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel_signal => Err(Error::Cancelled),
            _ = deadline => Err(Error::DeadlineExceeded),
            result = operation => result,
        }
    }
}
