use tokio::task::JoinHandle;

/// Single-slot holder for a cancellable background task.
///
/// Installing a new task aborts the previous holder first, so at most one
/// task per slot is ever live.
#[derive(Debug, Default)]
pub struct TaskSlot {
    handle: Option<JoinHandle<()>>,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the current task (if any) and install `next`.
    pub fn replace(&mut self, next: Option<JoinHandle<()>>) {
        if let Some(previous) = self.handle.take() {
            previous.abort();
        }
        self.handle = next;
    }

    pub fn cancel(&mut self) {
        self.replace(None);
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_task(counter: Arc<AtomicUsize>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            loop {
                ticker.tick().await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_aborts_previous_holder() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut slot = TaskSlot::new();

        slot.replace(Some(counting_task(first.clone())));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        let first_count = first.load(Ordering::SeqCst);
        assert_eq!(first_count, 3);

        slot.replace(Some(counting_task(second.clone())));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(first.load(Ordering::SeqCst), first_count);
        assert!(second.load(Ordering::SeqCst) > 0);
        assert!(slot.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop_stop_the_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut slot = TaskSlot::new();
        slot.replace(Some(counting_task(counter.clone())));
        tokio::time::sleep(Duration::from_millis(500)).await;
        slot.cancel();
        let after_cancel = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(counter.load(Ordering::SeqCst), after_cancel);
        assert!(!slot.is_active());

        {
            let mut dropped = TaskSlot::new();
            dropped.replace(Some(counting_task(counter.clone())));
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        let after_drop = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(counter.load(Ordering::SeqCst), after_drop);
    }
}
