//! Get-or-create use case.
//!
//! Returns the caller's item, creating it on first access.

use std::sync::Arc;

use dismissible_domain::{DomainEvent, ItemId, RequestContext, UserId};

use crate::entities::{DismissibleItems, GetOrCreateOutcome};
use crate::infrastructure::ports::EventPublisher;

use super::error::LifecycleError;
use super::publish_event;
use super::runner::{HookRunner, ItemPrePhase, PostPhase, PreHookOutcome, PrePhase};

/// Get-or-create use case.
///
/// Orchestrates: pre-request, then either pre-get (item exists) or
/// pre-create (item missing), the core read or write, post hooks and the
/// matching domain event.
pub struct GetOrCreateItem {
    items: Arc<DismissibleItems>,
    hooks: Arc<HookRunner>,
    events: Arc<dyn EventPublisher>,
}

impl GetOrCreateItem {
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

    /// Execute the get-or-create use case.
    ///
    /// # Returns
    /// * `Ok(GetOrCreateOutcome)` - The item and whether this call created it
    /// * `Err(LifecycleError)` - Blocked by a hook, hook failure, or item error
    pub async fn execute(
        &self,
        item_id: ItemId,
        user_id: UserId,
        context: Option<RequestContext>,
    ) -> Result<GetOrCreateOutcome, LifecycleError> {
        let request = self
            .hooks
            .run_pre(PrePhase::Request, item_id, user_id, context)
            .await?;
        HookRunner::throw_if_blocked(&request)?;
        let PreHookOutcome {
            item_id,
            user_id,
            context,
            ..
        } = request;

        if let Some(item) = self.items.get(&item_id, &user_id).await? {
            let get = self
                .hooks
                .run_pre_with_item(ItemPrePhase::Get, item_id, &item, user_id, context)
                .await?;
            HookRunner::throw_if_blocked(&get)?;
            let PreHookOutcome {
                item_id,
                user_id,
                context,
                ..
            } = get;

            publish_event(
                self.events.as_ref(),
                DomainEvent::ItemRetrieved {
                    item_id: item_id.clone(),
                    item: item.clone(),
                    user_id: user_id.clone(),
                    context: context.clone(),
                },
            )
            .await;
            self.hooks
                .run_post(PostPhase::Get, &item_id, &item, &user_id, context.as_ref())
                .await;
            self.hooks
                .run_post(PostPhase::Request, &item_id, &item, &user_id, context.as_ref())
                .await;

            tracing::debug!(item_id = %item_id, user_id = %user_id, "Item retrieved");
            return Ok(GetOrCreateOutcome {
                item,
                created: false,
            });
        }

        let create = self
            .hooks
            .run_pre(PrePhase::Create, item_id, user_id, context)
            .await?;
        HookRunner::throw_if_blocked(&create)?;
        let PreHookOutcome {
            item_id,
            user_id,
            context,
            ..
        } = create;

        let item = self.items.create(&item_id, &user_id).await?;

        self.hooks
            .run_post(PostPhase::Create, &item_id, &item, &user_id, context.as_ref())
            .await;
        publish_event(
            self.events.as_ref(),
            DomainEvent::ItemCreated {
                item_id: item_id.clone(),
                item: item.clone(),
                user_id: user_id.clone(),
                context: context.clone(),
            },
        )
        .await;
        self.hooks
            .run_post(PostPhase::Request, &item_id, &item, &user_id, context.as_ref())
            .await;

        tracing::debug!(item_id = %item_id, user_id = %user_id, "Item created");
        Ok(GetOrCreateOutcome {
            item,
            created: true,
        })
    }
}
