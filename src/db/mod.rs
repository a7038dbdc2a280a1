use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{NewReturn, RefundMode, Return};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::InMemoryReturnStore;
pub use postgres::PgReturnStore;

/// Durable collection of return records.
///
/// Every method is a single statement against the backend; nothing here knows
/// about the undo buffer.
#[async_trait]
pub trait ReturnStore: Send + Sync {
    /// All records, oldest id first.
    async fn fetch_all(&self) -> AppResult<Vec<Return>>;

    async fn fetch_by_id(&self, id: i64) -> AppResult<Return>;

    /// Persists the candidate exactly as given and returns it with its new id.
    async fn insert(&self, candidate: &NewReturn) -> AppResult<Return>;

    async fn insert_batch(&self, candidates: &[NewReturn]) -> AppResult<Vec<Return>>;

    /// Sets the refund mode and marks the record approved in one conditional
    /// update. Re-approving overwrites the previous refund mode.
    async fn approve(&self, id: i64, refund_mode: RefundMode) -> AppResult<Return>;

    /// Removes the record and returns what was removed.
    async fn delete(&self, id: i64) -> AppResult<Return>;

    async fn count(&self) -> AppResult<i64>;
}

pub(crate) fn not_found(id: i64) -> crate::error::AppError {
    crate::error::AppError::not_found(format!("Return {} not found", id))
}
