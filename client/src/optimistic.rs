//! Optimistic local state.
//!
//! Apply a change locally, await the backend's confirmation, then either
//! commit the confirmed value or roll back to the snapshot taken before the
//! change. A failed write raises exactly one user-visible notice and is
//! never retried.

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::error;

/// Sink for user-visible failure notices.
pub trait Notifier: Send + Sync {
    /// Surface a failure to the user.
    fn notify_failure(&self, message: &str);
}

/// Notifier that only writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_failure(&self, message: &str) {
        error!("{}", message);
    }
}

/// Notifier that keeps every notice for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices raised so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Number of notices raised so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_failure(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

/// A locally held value that may run ahead of the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimistic<T> {
    current: T,
}

/// Snapshot taken by [`Optimistic::apply`]; settle it with
/// [`Optimistic::commit`] or [`Optimistic::rollback`].
#[must_use = "an applied change must be committed or rolled back"]
#[derive(Debug)]
pub struct Pending<T> {
    snapshot: T,
}

impl<T> Pending<T> {
    /// The value as it was before the change.
    pub const fn snapshot(&self) -> &T {
        &self.snapshot
    }
}

impl<T: Clone> Optimistic<T> {
    pub const fn new(value: T) -> Self {
        Self { current: value }
    }

    /// The value as currently shown, including unconfirmed changes.
    pub const fn get(&self) -> &T {
        &self.current
    }

    pub fn into_inner(self) -> T {
        self.current
    }

    /// Apply `mutate` immediately and remember how to undo it.
    pub fn apply(&mut self, mutate: impl FnOnce(&mut T)) -> Pending<T> {
        let snapshot = self.current.clone();
        mutate(&mut self.current);
        Pending { snapshot }
    }

    /// Replace the local value with the one the backend confirmed.
    pub fn commit(&mut self, pending: Pending<T>, confirmed: T) {
        drop(pending);
        self.current = confirmed;
    }

    /// Restore the value captured before the change.
    pub fn rollback(&mut self, pending: Pending<T>) {
        self.current = pending.snapshot;
    }

    /// Commit on `Ok`, roll back on `Err`.
    pub fn settle<E>(&mut self, pending: Pending<T>, result: Result<T, E>) -> Result<(), E> {
        match result {
            Ok(confirmed) => {
                self.commit(pending, confirmed);
                Ok(())
            }
            Err(e) => {
                self.rollback(pending);
                Err(e)
            }
        }
    }

    /// Apply, await `write`, then commit or roll back.
    ///
    /// On failure the notifier receives one message of the form
    /// `"{failure_message}: {error}"` and the error is returned.
    pub async fn run<E, Fut>(
        &mut self,
        mutate: impl FnOnce(&mut T),
        write: Fut,
        notifier: &dyn Notifier,
        failure_message: &str,
    ) -> Result<(), E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let pending = self.apply(mutate);
        let result = self.settle(pending, write.await);
        if let Err(e) = &result {
            notifier.notify_failure(&format!("{failure_message}: {e}"));
        }
        result
    }
}
