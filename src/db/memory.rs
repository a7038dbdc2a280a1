use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{not_found, ReturnStore};
use crate::error::{AppError, AppResult};
use crate::models::{NewReturn, RefundMode, Return, ReturnStatus};

struct MemoryData {
    rows: BTreeMap<i64, Return>,
    next_id: i64,
}

/// In-memory return store with a switch to simulate an unavailable backend.
pub struct InMemoryReturnStore {
    data: RwLock<MemoryData>,
    unavailable: AtomicBool,
}

impl Default for InMemoryReturnStore {
    fn default() -> Self {
        Self {
            data: RwLock::new(MemoryData {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
            unavailable: AtomicBool::new(false),
        }
    }
}

impl InMemoryReturnStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with a storage error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::storage("in-memory store marked unavailable"));
        }
        Ok(())
    }
}

impl MemoryData {
    fn insert(&mut self, candidate: &NewReturn) -> Return {
        let id = self.next_id;
        self.next_id += 1;

        let now = Utc::now();
        let record = Return {
            id,
            item: candidate.item.clone(),
            reason: candidate.reason.clone(),
            status: candidate.status,
            refund_mode: candidate.refund_mode,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(id, record.clone());
        record
    }
}

#[async_trait]
impl ReturnStore for InMemoryReturnStore {
    async fn fetch_all(&self) -> AppResult<Vec<Return>> {
        self.check_available()?;
        Ok(self.data.read().await.rows.values().cloned().collect())
    }

    async fn fetch_by_id(&self, id: i64) -> AppResult<Return> {
        self.check_available()?;
        self.data
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn insert(&self, candidate: &NewReturn) -> AppResult<Return> {
        self.check_available()?;
        Ok(self.data.write().await.insert(candidate))
    }

    async fn insert_batch(&self, candidates: &[NewReturn]) -> AppResult<Vec<Return>> {
        self.check_available()?;
        let mut data = self.data.write().await;
        Ok(candidates.iter().map(|c| data.insert(c)).collect())
    }

    async fn approve(&self, id: i64, refund_mode: RefundMode) -> AppResult<Return> {
        self.check_available()?;
        let mut data = self.data.write().await;
        let record = data.rows.get_mut(&id).ok_or_else(|| not_found(id))?;
        record.status = ReturnStatus::Approved;
        record.refund_mode = Some(refund_mode);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<Return> {
        self.check_available()?;
        self.data
            .write()
            .await
            .rows
            .remove(&id)
            .ok_or_else(|| not_found(id))
    }

    async fn count(&self) -> AppResult<i64> {
        self.check_available()?;
        Ok(self.data.read().await.rows.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_store_starts_empty_and_available() {
        let store = InMemoryReturnStore::default();
        assert_eq!(store.count().await.unwrap(), 0);
        let first = store.insert(&NewReturn::pending("A", "r")).await.unwrap();
        assert_eq!(first.id, 1);
    }

    #[tokio::test]
    async fn assigns_increasing_ids_and_never_reuses_them() {
        let store = InMemoryReturnStore::new();
        let a = store.insert(&NewReturn::pending("A", "r")).await.unwrap();
        store.delete(a.id).await.unwrap();
        let b = store.insert(&NewReturn::pending("B", "r")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn unavailable_store_fails_with_storage_error() {
        let store = InMemoryReturnStore::new();
        store.set_unavailable(true);
        let err = store.fetch_all().await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        store.set_unavailable(false);
        assert!(store.fetch_all().await.unwrap().is_empty());
    }
}
