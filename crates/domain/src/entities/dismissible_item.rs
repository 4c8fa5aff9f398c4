//! Dismissible item entity - per-user state of a named UI element
//!
//! An item is identified by `(user_id, id)` and has exactly two states:
//!
//! ```text
//!   active (dismissed_at = None)  --dismiss-->  dismissed (dismissed_at = Some(t))
//!   active                        <--restore--  dismissed
//! ```
//!
//! `created_at` is set once and never changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ItemId, UserId};

/// A dismissible item record.
///
/// Fields are private because `created_at` must stay immutable after creation
/// and `dismissed_at` only moves through [`dismiss`](Self::dismiss) and
/// [`restore`](Self::restore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissibleItem {
    id: ItemId,
    user_id: UserId,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dismissed_at: Option<DateTime<Utc>>,
}

impl DismissibleItem {
    /// Create a new, active item.
    pub fn new(id: ItemId, user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            created_at,
            dismissed_at: None,
        }
    }

    /// Rebuild an item from stored fields (no state checks).
    pub fn from_parts(
        id: ItemId,
        user_id: UserId,
        created_at: DateTime<Utc>,
        dismissed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            user_id,
            created_at,
            dismissed_at,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn dismissed_at(&self) -> Option<DateTime<Utc>> {
        self.dismissed_at
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed_at.is_some()
    }

    /// Move the item to the dismissed state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStateTransition` if the item is already dismissed.
    pub fn dismiss(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_dismissed() {
            return Err(DomainError::invalid_state_transition(format!(
                "item {} is already dismissed",
                self.id
            )));
        }
        self.dismissed_at = Some(at);
        Ok(())
    }

    /// Move the item back to the active state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStateTransition` if the item is not dismissed.
    pub fn restore(&mut self) -> Result<(), DomainError> {
        if !self.is_dismissed() {
            return Err(DomainError::invalid_state_transition(format!(
                "item {} is not dismissed",
                self.id
            )));
        }
        self.dismissed_at = None;
        Ok(())
    }
}
