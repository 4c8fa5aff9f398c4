//! Domain Events
//!
//! Coarse-grained events emitted after a lifecycle operation succeeds.
//! Delivery is fire-and-forget: consumers outside the pipeline subscribe,
//! nothing waits for them.

use serde::{Deserialize, Serialize};

use crate::{DismissibleItem, ItemId, RequestContext, UserId};

pub const ITEM_CREATED: &str = "ITEM_CREATED";
pub const ITEM_RETRIEVED: &str = "ITEM_RETRIEVED";
pub const ITEM_DISMISSED: &str = "ITEM_DISMISSED";
pub const ITEM_RESTORED: &str = "ITEM_RESTORED";

/// Domain event for item state changes and reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum DomainEvent {
    ItemCreated {
        item_id: ItemId,
        item: DismissibleItem,
        user_id: UserId,
        context: Option<RequestContext>,
    },
    ItemRetrieved {
        item_id: ItemId,
        item: DismissibleItem,
        user_id: UserId,
        context: Option<RequestContext>,
    },
    ItemDismissed {
        item_id: ItemId,
        item: DismissibleItem,
        previous_item: DismissibleItem,
        user_id: UserId,
        context: Option<RequestContext>,
    },
    ItemRestored {
        item_id: ItemId,
        item: DismissibleItem,
        previous_item: DismissibleItem,
        user_id: UserId,
        context: Option<RequestContext>,
    },
}

impl DomainEvent {
    /// Stable event name (`ITEM_CREATED`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::ItemCreated { .. } => ITEM_CREATED,
            Self::ItemRetrieved { .. } => ITEM_RETRIEVED,
            Self::ItemDismissed { .. } => ITEM_DISMISSED,
            Self::ItemRestored { .. } => ITEM_RESTORED,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        match self {
            Self::ItemCreated { item_id, .. }
            | Self::ItemRetrieved { item_id, .. }
            | Self::ItemDismissed { item_id, .. }
            | Self::ItemRestored { item_id, .. } => item_id,
        }
    }

    pub fn user_id(&self) -> &UserId {
        match self {
            Self::ItemCreated { user_id, .. }
            | Self::ItemRetrieved { user_id, .. }
            | Self::ItemDismissed { user_id, .. }
            | Self::ItemRestored { user_id, .. } => user_id,
        }
    }

    pub fn item(&self) -> &DismissibleItem {
        match self {
            Self::ItemCreated { item, .. }
            | Self::ItemRetrieved { item, .. }
            | Self::ItemDismissed { item, .. }
            | Self::ItemRestored { item, .. } => item,
        }
    }

    pub fn previous_item(&self) -> Option<&DismissibleItem> {
        match self {
            Self::ItemDismissed { previous_item, .. } | Self::ItemRestored { previous_item, .. } => {
                Some(previous_item)
            }
            Self::ItemCreated { .. } | Self::ItemRetrieved { .. } => None,
        }
    }
}
