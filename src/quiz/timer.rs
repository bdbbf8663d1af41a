use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Wall-clock countdown for a timed attempt. A single background task ticks
/// once per second, publishes the remaining seconds through a watch channel,
/// and invokes `on_expire` exactly once when it reaches zero.
///
/// Untimed attempts simply never construct one.
pub struct Countdown {
    remaining_rx: watch::Receiver<u32>,
    handle: JoinHandle<()>,
}

impl Countdown {
    pub fn start<F>(limit_seconds: u32, on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (tx, remaining_rx) = watch::channel(limit_seconds);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;

            let mut remaining = limit_seconds;
            while remaining > 0 {
                interval.tick().await;
                remaining -= 1;
                let _ = tx.send(remaining);
            }

            on_expire();
        });

        Self {
            remaining_rx,
            handle,
        }
    }

    pub fn remaining(&self) -> u32 {
        *self.remaining_rx.borrow()
    }

    /// Cancels the countdown. Expiry will not fire after this returns; a
    /// manual submission uses this to close the race with the timeout path.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
