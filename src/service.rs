use std::sync::Arc;

use tracing::warn;

use crate::db::ReturnStore;
use crate::error::{AppError, AppResult};
use crate::models::{CreateReturn, NewReturn, RefundMode, Return};
use crate::undo::UndoBuffer;

pub const NOTHING_TO_UNDO: &str = "No returns to undo";

/// Return lifecycle: create as `Pending`, approve once a refund mode is
/// chosen, delete into the undo buffer, restore from it.
#[derive(Clone)]
pub struct ReturnService {
    store: Arc<dyn ReturnStore>,
    undo: UndoBuffer,
}

impl ReturnService {
    pub fn new(store: Arc<dyn ReturnStore>, undo: UndoBuffer) -> Self {
        Self { store, undo }
    }

    pub fn store(&self) -> &dyn ReturnStore {
        self.store.as_ref()
    }

    pub fn undo_buffer(&self) -> &UndoBuffer {
        &self.undo
    }

    pub async fn list(&self) -> AppResult<Vec<Return>> {
        self.store.fetch_all().await
    }

    /// Always persists as `Pending`; the payload type has no room for a
    /// client-chosen status, refund mode or id.
    pub async fn create(&self, payload: &CreateReturn) -> AppResult<Return> {
        if payload.item.trim().is_empty() {
            return Err(AppError::invalid_input("item must not be empty"));
        }
        self.store
            .insert(&NewReturn::pending(&payload.item, &payload.reason))
            .await
    }

    pub async fn get(&self, id: i64) -> AppResult<Return> {
        self.store.fetch_by_id(id).await
    }

    /// The refund mode is validated before the store is touched, so a bad
    /// value never reaches the record. Approving twice overwrites the mode.
    pub async fn approve(&self, id: i64, refund_mode: &str) -> AppResult<Return> {
        let refund_mode: RefundMode = refund_mode.parse()?;
        self.store.approve(id, refund_mode).await
    }

    /// Removes the record and remembers it for [`ReturnService::undo`].
    pub async fn delete(&self, id: i64) -> AppResult<Return> {
        let removed = self.store.delete(id).await?;
        self.undo.push(removed.clone()).await;
        Ok(removed)
    }

    /// Re-creates the most recently deleted record under a new id.
    ///
    /// The buffer lock is held across the insert. If the insert fails the
    /// snapshot goes back on top of the stack and the error is returned.
    pub async fn undo(&self) -> AppResult<Return> {
        let mut history = self.undo.lock().await;
        let Some(snapshot) = history.pop() else {
            return Err(AppError::invalid_input(NOTHING_TO_UNDO));
        };

        match self.store.insert(&NewReturn::from_snapshot(&snapshot)).await {
            Ok(restored) => Ok(restored),
            Err(err) => {
                warn!(
                    deleted_id = snapshot.id,
                    error = %err,
                    "Restore failed, snapshot kept for retry"
                );
                history.push(snapshot);
                Err(err)
            }
        }
    }
}
