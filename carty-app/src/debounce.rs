use carty_core::{GenerationCounter, Ticket};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Runs only the latest scheduled job, `delay` after it was scheduled.
///
/// Scheduling aborts the pending job (still waiting or already in flight)
/// and issues a new ticket. A job must check [`Debouncer::is_current`]
/// before publishing its result.
pub struct Debouncer {
    delay: Duration,
    generation: Arc<GenerationCounter>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(GenerationCounter::new()),
            pending: Mutex::new(None),
        }
    }

    pub fn generation(&self) -> Arc<GenerationCounter> {
        self.generation.clone()
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.is_current(ticket)
    }

    pub async fn schedule<F, Fut>(&self, job: F) -> Ticket
    where
        F: FnOnce(Ticket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        let ticket = self.generation.issue();
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job(ticket).await;
        }));
        ticket
    }

    /// Drops the pending job and makes every issued ticket stale.
    pub async fn cancel(&self) {
        self.generation.invalidate();
        if let Some(previous) = self.pending.lock().await.take() {
            previous.abort();
        }
    }

    /// Waits for the pending job, if any, to finish.
    pub async fn settle(&self) {
        let pending = self.pending.lock().await.take();
        if let Some(handle) = pending {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::error!(error = %e, "debounced job failed");
                }
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().take() {
            pending.abort();
        }
    }
}
