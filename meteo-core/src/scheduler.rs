use std::{future::Future, time::Duration};
use tokio::task::JoinHandle;

/// Runs at most one delayed task at a time.
///
/// Scheduling a new task aborts the pending one, whether it is still
/// waiting out its delay or already running. Must be used from within a
/// tokio runtime.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel_pending();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Returns whether a task was still pending.
    pub fn cancel_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn counter_task(counter: Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_last_of_a_burst_runs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new();

        for _ in 0..5 {
            debouncer.schedule(Duration::from_millis(500), counter_task(runs.clone()));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_runs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new();

        debouncer.schedule(Duration::from_millis(150), counter_task(runs.clone()));
        assert!(debouncer.cancel_pending());
        assert!(!debouncer.cancel_pending());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
