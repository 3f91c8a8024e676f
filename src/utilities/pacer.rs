//! Pacing between successive calls to the text-generation service.
//!
//! The first call of a round goes out immediately; each later call waits
//! one fixed interval first. Unlike a requests-per-minute limiter there is
//! no window and no background timer: pacing is scoped to one round.

use std::time::Duration;

use crate::utilities::sleeper::Sleeper;

/// Spaces out the calls of one fan-out round.
#[derive(Debug)]
pub struct Pacer<'a> {
    /// Wait inserted before every call but the first.
    interval: Duration,
    sleeper: &'a dyn Sleeper,
    issued: usize,
}

impl<'a> Pacer<'a> {
    pub fn new(interval: Duration, sleeper: &'a dyn Sleeper) -> Self {
        Self {
            interval,
            sleeper,
            issued: 0,
        }
    }

    /// Wait if a call has already been issued this round, then count this one.
    pub async fn check_or_wait(&mut self) {
        if self.issued > 0 && !self.interval.is_zero() {
            log::debug!("Pacing: waiting {:?} before call {}", self.interval, self.issued + 1);
            self.sleeper.sleep(self.interval).await;
        }
        self.issued += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::sleeper::RecordingSleeper;

    #[tokio::test]
    async fn test_first_call_not_paced() {
        let sleeper = RecordingSleeper::new();
        let mut pacer = Pacer::new(Duration::from_millis(500), &sleeper);
        pacer.check_or_wait().await;
        assert!(sleeper.calls().is_empty());

        pacer.check_or_wait().await;
        pacer.check_or_wait().await;
        assert_eq!(sleeper.calls(), vec![Duration::from_millis(500); 2]);
        assert_eq!(pacer.issued, 3);
    }

    #[tokio::test]
    async fn test_zero_interval_never_sleeps() {
        let sleeper = RecordingSleeper::new();
        let mut pacer = Pacer::new(Duration::ZERO, &sleeper);
        for _ in 0..3 {
            pacer.check_or_wait().await;
        }
        assert!(sleeper.calls().is_empty());
    }
}
