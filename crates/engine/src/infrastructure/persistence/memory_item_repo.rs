//! In-memory item store for development and testing
//!
//! Items live in a map keyed by `(user_id, item_id)` behind a tokio `RwLock`.
//! Nothing is persisted across restarts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dismissible_domain::{DismissibleItem, ItemId, UserId};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{DismissibleItemRepo, RepoError};

type ItemKey = (UserId, ItemId);

fn key_of(item: &DismissibleItem) -> ItemKey {
    (item.user_id().clone(), item.id().clone())
}

/// In-memory item repository
#[derive(Clone, Default)]
pub struct InMemoryItemRepo {
    items: Arc<RwLock<HashMap<ItemKey, DismissibleItem>>>,
}

impl InMemoryItemRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items (all users).
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl DismissibleItemRepo for InMemoryItemRepo {
    async fn get(
        &self,
        user_id: &UserId,
        item_id: &ItemId,
    ) -> Result<Option<DismissibleItem>, RepoError> {
        let items = self.items.read().await;
        Ok(items.get(&(user_id.clone(), item_id.clone())).cloned())
    }

    async fn get_many(
        &self,
        user_id: &UserId,
        item_ids: &[ItemId],
    ) -> Result<Vec<DismissibleItem>, RepoError> {
        let items = self.items.read().await;
        Ok(item_ids
            .iter()
            .filter_map(|id| items.get(&(user_id.clone(), id.clone())).cloned())
            .collect())
    }

    /// Stores `item` unless its key is already taken; the stored row is returned.
    ///
    /// Two racing first accesses both see the item absent and both create it.
    /// The later write is a no-op rather than a duplicate-key failure.
    async fn create(&self, item: &DismissibleItem) -> Result<DismissibleItem, RepoError> {
        let mut items = self.items.write().await;
        Ok(items.entry(key_of(item)).or_insert_with(|| item.clone()).clone())
    }

    async fn create_many(
        &self,
        new_items: &[DismissibleItem],
    ) -> Result<Vec<DismissibleItem>, RepoError> {
        let mut items = self.items.write().await;
        Ok(new_items
            .iter()
            .map(|item| items.entry(key_of(item)).or_insert_with(|| item.clone()).clone())
            .collect())
    }

    async fn update(&self, item: &DismissibleItem) -> Result<DismissibleItem, RepoError> {
        let mut items = self.items.write().await;
        match items.get_mut(&key_of(item)) {
            Some(stored) => {
                *stored = item.clone();
                Ok(item.clone())
            }
            None => Err(RepoError::not_found("DismissibleItem", item.id())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: &str, user: &str) -> DismissibleItem {
        DismissibleItem::new(
            ItemId::new(id).unwrap(),
            UserId::new(user).unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn create_then_get() {
        let repo = InMemoryItemRepo::new();
        let created = repo.create(&item("a", "u1")).await.unwrap();

        let found = repo
            .get(created.user_id(), created.id())
            .await
            .unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn items_are_scoped_per_user() {
        let repo = InMemoryItemRepo::new();
        repo.create(&item("a", "u1")).await.unwrap();

        let other = repo
            .get(&UserId::new("u2").unwrap(), &ItemId::new("a").unwrap())
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn repeated_create_keeps_first_write() {
        let repo = InMemoryItemRepo::new();
        let first = repo.create(&item("a", "u1")).await.unwrap();

        let mut later = item("a", "u1");
        later.dismiss(Utc::now()).unwrap();
        let second = repo.create(&later).await.unwrap();

        assert_eq!(second, first);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn create_many_skips_taken_keys() {
        let repo = InMemoryItemRepo::new();
        let existing = repo.create(&item("b", "u1")).await.unwrap();

        let created = repo
            .create_many(&[item("a", "u1"), item("b", "u1"), item("a", "u1")])
            .await
            .unwrap();

        assert_eq!(created.len(), 3);
        assert_eq!(created[1], existing);
        assert_eq!(created[2], created[0]);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn get_many_returns_only_existing() {
        let repo = InMemoryItemRepo::new();
        repo.create_many(&[item("a", "u1"), item("c", "u1")])
            .await
            .unwrap();

        let ids: Vec<ItemId> = ["a", "b", "c"]
            .iter()
            .map(|s| ItemId::new(*s).unwrap())
            .collect();
        let found = repo
            .get_many(&UserId::new("u1").unwrap(), &ids)
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn update_missing_item_is_not_found() {
        let repo = InMemoryItemRepo::new();
        let result = repo.update(&item("a", "u1")).await;
        assert!(matches!(result, Err(e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn update_overwrites_stored_item() {
        let repo = InMemoryItemRepo::new();
        let mut stored = repo.create(&item("a", "u1")).await.unwrap();
        stored.dismiss(Utc::now()).unwrap();

        repo.update(&stored).await.unwrap();

        let found = repo
            .get(stored.user_id(), stored.id())
            .await
            .unwrap()
            .unwrap();
        assert!(found.is_dismissed());
    }
}
