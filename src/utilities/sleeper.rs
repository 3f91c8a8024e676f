//! Delayed execution.
//!
//! Backoff and pacing go through a [`Sleeper`] so that the delays can be
//! observed in tests instead of waited out.

use std::fmt;
#[cfg(test)]
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

/// Something that can wait for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync + fmt::Debug {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested delays and returns immediately.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

#[cfg(test)]
impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far, in order.
    pub fn calls(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(duration);
        }
    }
}
