//! Lifecycle use cases.
//!
//! The externally callable surface for dismissible items. Each operation
//! sequences hook phases around the core item engine:
//!
//! `pre-request -> pre-<op> -> core operation -> post-<op> -> event -> post-request`
//!
//! A blocking pre-hook aborts with [`LifecycleError::Forbidden`] before any
//! write happens.

use std::sync::Arc;

use dismissible_domain::DomainEvent;

use crate::entities::DismissibleItems;
use crate::infrastructure::ports::EventPublisher;

mod batch_get_or_create;
mod dismiss;
mod error;
mod get_or_create;
mod hooks;
mod restore;
mod runner;

#[cfg(test)]
pub(crate) mod test_support;

pub use batch_get_or_create::{BatchGetOrCreateItems, MAX_BATCH_SIZE};
pub use dismiss::DismissItem;
pub use error::{LifecycleError, DEFAULT_BLOCK_REASON};
pub use get_or_create::GetOrCreateItem;
pub use hooks::{BatchHookMutations, BatchHookResult, HookMutations, HookResult, LifecycleHook};
pub use restore::RestoreItem;
pub use runner::{
    BatchItemsPrePhase, BatchPostPhase, BatchPreHookOutcome, BatchPrePhase, Gate, HookRunner,
    ItemPrePhase, PostPhase, PreHookOutcome, PrePhase,
};

/// Container for lifecycle use cases.
pub struct LifecycleUseCases {
    pub get_or_create: Arc<GetOrCreateItem>,
    pub dismiss: Arc<DismissItem>,
    pub restore: Arc<RestoreItem>,
    pub batch_get_or_create: Arc<BatchGetOrCreateItems>,
}

impl LifecycleUseCases {
    /// Wire every use case over one item engine, hook runner and event sink.
    pub fn new(
        items: Arc<DismissibleItems>,
        hooks: Arc<HookRunner>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            get_or_create: Arc::new(GetOrCreateItem::new(
                items.clone(),
                hooks.clone(),
                events.clone(),
            )),
            dismiss: Arc::new(DismissItem::new(items.clone(), hooks.clone(), events.clone())),
            restore: Arc::new(RestoreItem::new(items.clone(), hooks.clone(), events.clone())),
            batch_get_or_create: Arc::new(BatchGetOrCreateItems::new(items, hooks, events)),
        }
    }
}

/// Fire-and-forget publish; failures are logged, never returned.
async fn publish_event(events: &dyn EventPublisher, event: DomainEvent) {
    let name = event.name();
    let item_id = event.item_id().clone();
    let user_id = event.user_id().clone();
    if let Err(error) = events.publish(event).await {
        tracing::warn!(
            event = name,
            item_id = %item_id,
            user_id = %user_id,
            error = %error,
            "Failed to publish domain event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::infrastructure::persistence::InMemoryItemRepo;
    use crate::infrastructure::ports::{EventBusError, MockEventPublisher};
    use dismissible_domain::RequestContext;

    #[tokio::test]
    async fn publish_failure_does_not_fail_the_operation() {
        let mut events = MockEventPublisher::new();
        events
            .expect_publish()
            .times(1)
            .returning(|_| Err(EventBusError::Transport("bus closed".into())));

        let use_cases = LifecycleUseCases::new(
            items_over(Arc::new(InMemoryItemRepo::new())),
            Arc::new(HookRunner::empty()),
            Arc::new(events),
        );

        let outcome = use_cases
            .get_or_create
            .execute(item_id("banner"), user_id("u1"), None)
            .await
            .unwrap();
        assert!(outcome.created);
    }

    #[tokio::test]
    async fn full_lifecycle_through_shared_container() {
        let log = new_log();
        let (events, published) = recording_events();
        let use_cases = LifecycleUseCases::new(
            items_over(Arc::new(InMemoryItemRepo::new())),
            Arc::new(HookRunner::new(vec![PhaseRecorder::arc("audit", 0, &log)])),
            events,
        );
        let ctx = Some(RequestContext::new("req-1"));

        use_cases
            .get_or_create
            .execute(item_id("banner"), user_id("u1"), ctx.clone())
            .await
            .unwrap();
        let dismissed = use_cases
            .dismiss
            .execute(item_id("banner"), user_id("u1"), ctx.clone())
            .await
            .unwrap();
        let restored = use_cases
            .restore
            .execute(item_id("banner"), user_id("u1"), ctx)
            .await
            .unwrap();

        assert!(dismissed.item.is_dismissed());
        assert!(!restored.item.is_dismissed());
        assert_eq!(restored.item.created_at(), dismissed.item.created_at());
        assert_eq!(
            event_names(&published),
            vec!["ITEM_CREATED", "ITEM_DISMISSED", "ITEM_RESTORED"]
        );
        assert_eq!(entries(&log).len(), 12);
    }
}
