use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Quiet period for keystroke-driven suggestion requests
pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(150);

type Callback<T> = Arc<dyn Fn(T) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Collapses bursts of calls into one callback run after `delay` of quiet
///
/// Each `call` replaces whatever invocation is still waiting out its delay.
/// Once the delay elapses the callback runs in its own task, so a later `call`
/// never cancels work that has already started.
pub struct Debouncer<T> {
    delay: Duration,
    callback: Callback<T>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(delay: Duration, callback: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            delay,
            callback: Arc::new(
                move |arg: T| -> Pin<Box<dyn Future<Output = ()> + Send>> {
                    Box::pin(callback(arg))
                },
            ),
            pending: Mutex::new(None),
        }
    }

    /// Schedules the callback with `arg`, superseding any pending call
    pub fn call(&self, arg: T) {
        let delay = self.delay;
        let callback = Arc::clone(&self.callback);

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(callback(arg));
        });

        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = pending.replace(timer) {
            previous.abort();
        }
    }

    /// Drops the pending call, if it has not fired yet
    pub fn cancel(&self) {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Ok(pending) = self.pending.get_mut() {
            if let Some(timer) = pending.take() {
                timer.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn recording_debouncer(delay: Duration) -> (Debouncer<String>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(delay, move |query: String| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(query);
            }
        });
        (debouncer, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_call() {
        let (debouncer, mut rx) = recording_debouncer(SUGGESTION_DEBOUNCE);

        for query in ["a", "ac", "act"] {
            debouncer.call(query.to_string());
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(rx.recv().await.as_deref(), Some("act"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_fire() {
        let (debouncer, mut rx) = recording_debouncer(SUGGESTION_DEBOUNCE);

        debouncer.call("dr".to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.call("drama".to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(rx.recv().await.as_deref(), Some("dr"));
        assert_eq!(rx.recv().await.as_deref(), Some("drama"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_fires_before_quiet_period() {
        let (debouncer, mut rx) = recording_debouncer(SUGGESTION_DEBOUNCE);

        debouncer.call("c".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_call() {
        let (debouncer, mut rx) = recording_debouncer(SUGGESTION_DEBOUNCE);

        debouncer.call("horror".to_string());
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_callback_is_not_cancelled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(Duration::from_millis(10), move |query: String| {
            let tx = tx.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                let _ = tx.send(query);
            }
        });

        debouncer.call("slow".to_string());
        tokio::time::sleep(Duration::from_millis(20)).await;
        debouncer.call("fast".to_string());
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(rx.recv().await.as_deref(), Some("slow"));
        assert_eq!(rx.recv().await.as_deref(), Some("fast"));
    }
}
