use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// `mm:ss`
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Countdown shown on the payment page while the quoted price is held.
///
/// Ticks once per second on a spawned task; the task is aborted when the
/// lock is stopped or dropped.
pub struct PriceLock {
    remaining: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl PriceLock {
    pub fn start(duration: Duration) -> Self {
        let total = duration.as_secs();
        let (tx, rx) = watch::channel(total);
        let task = tokio::spawn(async move {
            let mut remaining = total;
            let mut ticker = interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            // first tick completes immediately
            ticker.tick().await;
            while remaining > 0 {
                ticker.tick().await;
                remaining -= 1;
                if tx.send(remaining).is_err() {
                    break;
                }
            }
        });
        Self {
            remaining: rx,
            task,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        *self.remaining.borrow()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs() == 0
    }

    pub fn clock(&self) -> String {
        format_clock(self.remaining_secs())
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.clone()
    }

    /// Resolves when the countdown reaches zero; `false` if it was stopped first.
    pub async fn expired(&self) -> bool {
        wait_expired(self.subscribe()).await
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

/// Waits on a subscription from [`PriceLock::subscribe`].
pub async fn wait_expired(mut remaining: watch::Receiver<u64>) -> bool {
    remaining.wait_for(|secs| *secs == 0).await.is_ok()
}

impl Drop for PriceLock {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(0), "00:00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_once_per_second() {
        let lock = PriceLock::start(Duration::from_secs(600));
        assert_eq!(lock.clock(), "10:00");

        let mut rx = lock.subscribe();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 599);
        assert_eq!(lock.clock(), "09:59");

        assert!(lock.expired().await);
        assert!(lock.is_expired());
        assert_eq!(lock.clock(), "00:00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_lock_never_expires() {
        let lock = PriceLock::start(Duration::from_secs(5));
        let rx = lock.subscribe();
        lock.stop();
        drop(lock);
        assert!(!wait_expired(rx).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_is_already_expired() {
        let lock = PriceLock::start(Duration::ZERO);
        assert!(lock.is_expired());
        assert!(lock.expired().await);
    }
}
