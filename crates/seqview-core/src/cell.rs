//! Latest-known-value cell shared between the view and its poll loops.
//!
//! Readers always observe the most recently published value at the moment
//! they read, never a copy captured when they subscribed.

use tokio::sync::watch;

#[derive(Debug)]
pub struct LatestCell<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> LatestCell<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the current value and wake subscribers.
    ///
    /// Succeeds even when nobody is subscribed.
    pub fn publish(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Modify the value in place while holding the cell's lock.
    ///
    /// `f` returns whether it changed anything; subscribers are woken only
    /// then. No publish can interleave between reading and writing.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Publish `value` only if `keep` accepts the value currently held.
    ///
    /// Subscribers are woken only when the value was replaced.
    pub fn publish_if(&self, value: T, keep: impl FnOnce(&T) -> bool) -> bool {
        self.update_if(|current| {
            if keep(current) {
                *current = value;
                true
            } else {
                false
            }
        })
    }

    pub fn latest(&self) -> T {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone + Default> Default for LatestCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let cell = LatestCell::new(1);
        cell.publish(2);
        assert_eq!(cell.latest(), 2);
    }

    #[test]
    fn test_subscriber_reads_latest_not_captured() {
        let cell = LatestCell::new(String::from("first"));
        let rx = cell.subscribe();
        cell.publish("second".to_string());
        cell.publish("third".to_string());
        assert_eq!(*rx.borrow(), "third");
    }

    #[test]
    fn test_publish_if_rejected_leaves_value_unseen() {
        let cell = LatestCell::new("demo".to_string());
        let rx = cell.subscribe();
        assert!(!cell.publish_if("other".to_string(), |v| v == "sockshop"));
        assert_eq!(cell.latest(), "demo");
        assert!(!rx.has_changed().unwrap());

        assert!(cell.publish_if("demo-2".to_string(), |v| v == "demo"));
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_subscriber_is_woken_on_publish() {
        let cell = LatestCell::new(0u32);
        let mut rx = cell.subscribe();
        assert!(cell.update_if(|v| {
            *v += 5;
            true
        }));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 5);
    }

    #[test]
    fn test_update_if_unchanged_does_not_wake() {
        let cell = LatestCell::new(vec![1, 2]);
        let rx = cell.subscribe();
        assert!(!cell.update_if(|v| v.contains(&3)));
        assert!(!rx.has_changed().unwrap());
    }
}
