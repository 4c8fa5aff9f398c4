//! Repository port for dismissible item storage.

use async_trait::async_trait;
use dismissible_domain::{DismissibleItem, ItemId, UserId};

use super::error::RepoError;

// =============================================================================
// Item Store Gateway
// =============================================================================

/// Durable lookup/write of item records keyed by `(user_id, item_id)`.
///
/// No compare-and-swap is offered; `update` overwrites whatever is stored.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DismissibleItemRepo: Send + Sync {
    async fn get(
        &self,
        user_id: &UserId,
        item_id: &ItemId,
    ) -> Result<Option<DismissibleItem>, RepoError>;

    /// Items that exist among `item_ids`, in no particular order.
    async fn get_many(
        &self,
        user_id: &UserId,
        item_ids: &[ItemId],
    ) -> Result<Vec<DismissibleItem>, RepoError>;

    /// Insert `item`. A key that is already taken is not an error: the stored
    /// row is returned unchanged.
    async fn create(&self, item: &DismissibleItem) -> Result<DismissibleItem, RepoError>;

    /// Insert every item; same duplicate-key rule as `create`.
    async fn create_many(
        &self,
        items: &[DismissibleItem],
    ) -> Result<Vec<DismissibleItem>, RepoError>;

    async fn update(&self, item: &DismissibleItem) -> Result<DismissibleItem, RepoError>;
}
