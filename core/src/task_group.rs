//! Run N independent tasks and wait for all of them on a single barrier.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::JoinHandle;

/// Result of one task in a [`TaskGroup`].
#[derive(Debug)]
pub struct TaskOutcome<T> {
    pub label: String,
    /// `Err` carries the join error message when the task panicked or was aborted.
    pub result: Result<T, String>,
}

/// A set of concurrently running tasks with no early cancellation: every
/// spawned task runs to completion regardless of what its siblings do.
pub struct TaskGroup<T> {
    handles: Vec<(String, JoinHandle<T>)>,
}

impl<T: Send + 'static> TaskGroup<T> {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Start a task immediately on the runtime.
    pub fn spawn<F>(&mut self, label: impl Into<String>, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.handles.push((label.into(), tokio::spawn(task)));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every task. Outcomes come back in completion order, one per
    /// spawned task.
    pub async fn join_all(self) -> Vec<TaskOutcome<T>> {
        let mut pending: FuturesUnordered<_> = self
            .handles
            .into_iter()
            .map(|(label, handle)| async move {
                let result = handle.await.map_err(|e| e.to_string());
                TaskOutcome { label, result }
            })
            .collect();

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some(outcome) = pending.next().await {
            outcomes.push(outcome);
        }
        outcomes
    }
}

impl<T: Send + 'static> Default for TaskGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}
