//! Dismissible item entity module.
//!
//! The only code allowed to read or write the item store. Enforces the
//! two-state invariant (active <-> dismissed) and validates every item
//! before it is persisted.

use std::sync::Arc;

use dismissible_domain::{DismissibleItem, ItemId, UserId};

use crate::infrastructure::ports::{
    ClockPort, DismissibleItemRepo, FieldError, ItemValidator, RepoError,
};

/// Result of [`DismissibleItems::get_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOrCreateOutcome {
    pub item: DismissibleItem,
    pub created: bool,
}

/// Result of a state transition: the stored item and its pre-image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTransition {
    pub item: DismissibleItem,
    /// The record as read, before the in-memory mutation.
    pub previous_item: DismissibleItem,
}

/// Errors raised by item operations.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("Item {item_id} not found")]
    NotFound { item_id: ItemId },
    #[error("Item {item_id} is already dismissed")]
    AlreadyDismissed { item_id: ItemId },
    #[error("Item {item_id} is not dismissed")]
    NotDismissed { item_id: ItemId },
    #[error("Validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl ItemError {
    /// Whether the caller sent a bad request (as opposed to an infrastructure failure).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Dismissible item entity - handles item reads and state transitions.
pub struct DismissibleItems {
    repo: Arc<dyn DismissibleItemRepo>,
    clock: Arc<dyn ClockPort>,
    validator: Arc<dyn ItemValidator>,
}

impl DismissibleItems {
    pub fn new(
        repo: Arc<dyn DismissibleItemRepo>,
        clock: Arc<dyn ClockPort>,
        validator: Arc<dyn ItemValidator>,
    ) -> Self {
        Self {
            repo,
            clock,
            validator,
        }
    }

    /// Look up an item. Absence is not an error.
    pub async fn get(
        &self,
        item_id: &ItemId,
        user_id: &UserId,
    ) -> Result<Option<DismissibleItem>, ItemError> {
        Ok(self.repo.get(user_id, item_id).await?)
    }

    /// Look up several items; the result holds only those that exist.
    pub async fn get_many(
        &self,
        item_ids: &[ItemId],
        user_id: &UserId,
    ) -> Result<Vec<DismissibleItem>, ItemError> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.repo.get_many(user_id, item_ids).await?)
    }

    /// Create a new active item stamped with the current time.
    pub async fn create(
        &self,
        item_id: &ItemId,
        user_id: &UserId,
    ) -> Result<DismissibleItem, ItemError> {
        let item = DismissibleItem::new(item_id.clone(), user_id.clone(), self.clock.now());
        self.validate(&item)?;
        Ok(self.repo.create(&item).await?)
    }

    /// Create several items in one write. Every item is validated before any is stored.
    pub async fn create_many(
        &self,
        item_ids: &[ItemId],
        user_id: &UserId,
    ) -> Result<Vec<DismissibleItem>, ItemError> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let now = self.clock.now();
        let items: Vec<DismissibleItem> = item_ids
            .iter()
            .map(|id| DismissibleItem::new(id.clone(), user_id.clone(), now))
            .collect();
        for item in &items {
            self.validate(item)?;
        }
        Ok(self.repo.create_many(&items).await?)
    }

    pub async fn get_or_create(
        &self,
        item_id: &ItemId,
        user_id: &UserId,
    ) -> Result<GetOrCreateOutcome, ItemError> {
        if let Some(item) = self.get(item_id, user_id).await? {
            return Ok(GetOrCreateOutcome {
                item,
                created: false,
            });
        }
        let item = self.create(item_id, user_id).await?;
        Ok(GetOrCreateOutcome {
            item,
            created: true,
        })
    }

    /// Move an active item to the dismissed state.
    ///
    /// No concurrency token is used: two racing calls can both see the item
    /// active and both write a dismissal.
    pub async fn dismiss(
        &self,
        item_id: &ItemId,
        user_id: &UserId,
    ) -> Result<ItemTransition, ItemError> {
        let previous_item = self.load(item_id, user_id).await?;
        if previous_item.is_dismissed() {
            return Err(ItemError::AlreadyDismissed {
                item_id: item_id.clone(),
            });
        }

        let mut item = previous_item.clone();
        item.dismiss(self.clock.now())
            .map_err(|_| ItemError::AlreadyDismissed {
                item_id: item_id.clone(),
            })?;
        self.validate(&item)?;
        let item = self.repo.update(&item).await?;

        Ok(ItemTransition {
            item,
            previous_item,
        })
    }

    /// Move a dismissed item back to the active state.
    pub async fn restore(
        &self,
        item_id: &ItemId,
        user_id: &UserId,
    ) -> Result<ItemTransition, ItemError> {
        let previous_item = self.load(item_id, user_id).await?;
        if !previous_item.is_dismissed() {
            return Err(ItemError::NotDismissed {
                item_id: item_id.clone(),
            });
        }

        let mut item = previous_item.clone();
        item.restore().map_err(|_| ItemError::NotDismissed {
            item_id: item_id.clone(),
        })?;
        self.validate(&item)?;
        let item = self.repo.update(&item).await?;

        Ok(ItemTransition {
            item,
            previous_item,
        })
    }

    async fn load(&self, item_id: &ItemId, user_id: &UserId) -> Result<DismissibleItem, ItemError> {
        self.get(item_id, user_id)
            .await?
            .ok_or_else(|| ItemError::NotFound {
                item_id: item_id.clone(),
            })
    }

    fn validate(&self, item: &DismissibleItem) -> Result<(), ItemError> {
        self.validator.validate(item).map_err(ItemError::Validation)
    }
}
