//! Event lifetime extension.
//!
//! Work registered here outlives the handler that spawned it, the way
//! `waitUntil` keeps a worker alive. Failures inside never reach the
//! response that was already returned.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Set of background tasks attached to handled events.
#[derive(Debug, Clone, Default)]
pub struct WaitUntil {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl WaitUntil {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` in the background, keeping it attached to this set.
    pub async fn wait_until<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }

    /// Number of tasks not yet reaped.
    pub async fn pending(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Wait for every registered task, including ones added while waiting.
    ///
    /// Cancelling the returned future leaves the remaining tasks running.
    pub async fn settle(&self) {
        loop {
            let mut batch = Detached(std::mem::take(&mut *self.tasks.lock().await));
            if batch.0.is_empty() {
                return;
            }
            while let Some(result) = batch.0.join_next().await {
                if let Err(e) = result {
                    tracing::warn!("background task ended abnormally: {}", e);
                }
            }
        }
    }
}

/// Tasks taken out of the shared set; dropping it detaches instead of aborting.
struct Detached(JoinSet<()>);

impl Drop for Detached {
    fn drop(&mut self) {
        self.0.detach_all();
    }
}
