//! Restore item use case.
//!
//! Moves the caller's dismissed item back to the active state.

use std::sync::Arc;

use dismissible_domain::{DomainEvent, ItemId, RequestContext, UserId};

use crate::entities::{DismissibleItems, ItemTransition};
use crate::infrastructure::ports::EventPublisher;

use super::error::LifecycleError;
use super::publish_event;
use super::runner::{HookRunner, PostPhase, PreHookOutcome, PrePhase};

/// Restore item use case.
pub struct RestoreItem {
    items: Arc<DismissibleItems>,
    hooks: Arc<HookRunner>,
    events: Arc<dyn EventPublisher>,
}

impl RestoreItem {
    pub fn new(
        items: Arc<DismissibleItems>,
        hooks: Arc<HookRunner>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            items,
            hooks,
            events,
        }
    }

    pub async fn execute(
        &self,
        item_id: ItemId,
        user_id: UserId,
        context: Option<RequestContext>,
    ) -> Result<ItemTransition, LifecycleError> {
        let request = self
            .hooks
            .run_pre(PrePhase::Request, item_id, user_id, context)
            .await?;
        HookRunner::throw_if_blocked(&request)?;

        let restore = self
            .hooks
            .run_pre(
                PrePhase::Restore,
                request.item_id,
                request.user_id,
                request.context,
            )
            .await?;
        HookRunner::throw_if_blocked(&restore)?;
        let PreHookOutcome {
            item_id,
            user_id,
            context,
            ..
        } = restore;

        let transition = self.items.restore(&item_id, &user_id).await?;

        self.hooks
            .run_post(
                PostPhase::Restore,
                &item_id,
                &transition.item,
                &user_id,
                context.as_ref(),
            )
            .await;
        publish_event(
            self.events.as_ref(),
            DomainEvent::ItemRestored {
                item_id: item_id.clone(),
                item: transition.item.clone(),
                previous_item: transition.previous_item.clone(),
                user_id: user_id.clone(),
                context: context.clone(),
            },
        )
        .await;
        self.hooks
            .run_post(
                PostPhase::Request,
                &item_id,
                &transition.item,
                &user_id,
                context.as_ref(),
            )
            .await;

        tracing::debug!(item_id = %item_id, user_id = %user_id, "Item restored");
        Ok(transition)
    }
}
