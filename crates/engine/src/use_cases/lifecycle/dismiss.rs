//! Dismiss item use case.
//!
//! Moves the caller's active item to the dismissed state.

use std::sync::Arc;

use dismissible_domain::{DomainEvent, ItemId, RequestContext, UserId};

use crate::entities::{DismissibleItems, ItemTransition};
use crate::infrastructure::ports::EventPublisher;

use super::error::LifecycleError;
use super::publish_event;
use super::runner::{HookRunner, PostPhase, PreHookOutcome, PrePhase};

/// Dismiss item use case.
///
/// Orchestrates: pre-request, pre-dismiss, the core transition, post-dismiss,
/// the `ITEM_DISMISSED` event and post-request.
pub struct DismissItem {
    items: Arc<DismissibleItems>,
    hooks: Arc<HookRunner>,
    events: Arc<dyn EventPublisher>,
}

impl DismissItem {
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

    /// Execute the dismiss use case.
    ///
    /// # Returns
    /// * `Ok(ItemTransition)` - The dismissed item and its pre-image
    /// * `Err(LifecycleError)` - Blocked, hook failure, not found, or already dismissed
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

        let dismiss = self
            .hooks
            .run_pre(
                PrePhase::Dismiss,
                request.item_id,
                request.user_id,
                request.context,
            )
            .await?;
        HookRunner::throw_if_blocked(&dismiss)?;
        let PreHookOutcome {
            item_id,
            user_id,
            context,
            ..
        } = dismiss;

        let transition = self.items.dismiss(&item_id, &user_id).await?;

        self.hooks
            .run_post(
                PostPhase::Dismiss,
                &item_id,
                &transition.item,
                &user_id,
                context.as_ref(),
            )
            .await;
        publish_event(
            self.events.as_ref(),
            DomainEvent::ItemDismissed {
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

        tracing::debug!(item_id = %item_id, user_id = %user_id, "Item dismissed");
        Ok(transition)
    }
}
