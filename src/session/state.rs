//! Reactive state slots
//!
//! Each piece of session state lives in a [`StateSlot`], a thin wrapper over
//! a `tokio::sync::watch` channel holding `Option<T>`. Readers get the latest
//! value synchronously, waiters suspend until a value is first published.

use tokio::sync::watch;

/// Single value that can be read, replaced, observed and awaited
#[derive(Debug)]
pub struct StateSlot<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T: Clone> StateSlot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Latest value, if any
    pub fn get(&self) -> Option<T> {
        self.tx.borrow().clone()
    }

    /// Whether a value is present
    pub fn is_set(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Publish a value, returning the previous one
    pub fn set(&self, value: T) -> Option<T> {
        self.tx.send_replace(Some(value))
    }

    /// Remove the value, returning the previous one
    pub fn clear(&self) -> Option<T> {
        self.tx.send_replace(None)
    }

    /// Receiver observing every change of the slot
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.tx.subscribe()
    }

    /// Wait until the slot holds a value
    ///
    /// Returns immediately when a value is already present. Never returns if
    /// nothing is ever published, so callers wanting a bound must wrap this
    /// in `tokio::time::timeout`.
    pub async fn wait(&self) -> T {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(value) = rx.borrow_and_update().as_ref() {
                return value.clone();
            }
            // The sender lives in `self`, so this cannot observe a closed channel.
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl<T: Clone> Default for StateSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
