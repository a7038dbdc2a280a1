use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::models::Return;

/// Plain LIFO stack. Unbounded; nothing is ever evicted.
#[derive(Debug)]
pub struct UndoStack<T> {
    items: Vec<T>,
}

impl<T> Default for UndoStack<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> UndoStack<T> {
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Removes and returns the most recently pushed item.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Snapshots of deleted returns, shared by every request in this process.
///
/// Not persisted and not shared between instances: each replica behind a load
/// balancer keeps its own history, and a restart empties it.
///
/// Every access goes through one async mutex. Callers that need a
/// check-then-act sequence (empty check, pop, re-insert, push back on failure)
/// take the guard from [`UndoBuffer::lock`] and hold it for the whole sequence.
#[derive(Debug, Clone, Default)]
pub struct UndoBuffer {
    inner: Arc<Mutex<UndoStack<Return>>>,
}

impl UndoBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, snapshot: Return) {
        self.inner.lock().await.push(snapshot);
    }

    pub async fn lock(&self) -> MutexGuard<'_, UndoStack<Return>> {
        self.inner.lock().await
    }
}
