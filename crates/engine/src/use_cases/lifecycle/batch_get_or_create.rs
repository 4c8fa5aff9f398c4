//! Batch get-or-create use case.
//!
//! Resolves a list of item ids for one user in a single pass. Hooks see the
//! batch as a whole: one call per phase, not one per item.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dismissible_domain::{DismissibleItem, DomainEvent, ItemId, RequestContext, UserId};

use crate::entities::{DismissibleItems, GetOrCreateOutcome, ItemError};
use crate::infrastructure::ports::{EventPublisher, FieldError};

use super::error::LifecycleError;
use super::publish_event;
use super::runner::{
    BatchItemsPrePhase, BatchPostPhase, BatchPreHookOutcome, BatchPrePhase, HookRunner,
};

/// Largest accepted batch.
pub const MAX_BATCH_SIZE: usize = 50;

/// Batch get-or-create use case.
///
/// Orchestrates: size check and de-duplication, pre-batch-request, one
/// read for all ids, pre-batch-get over the existing subset, pre-batch-create
/// over the missing subset, one write for all missing items, post phases,
/// per-item events and post-batch-request.
pub struct BatchGetOrCreateItems {
    items: Arc<DismissibleItems>,
    hooks: Arc<HookRunner>,
    events: Arc<dyn EventPublisher>,
}

impl BatchGetOrCreateItems {
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

    /// Execute the batch use case.
    ///
    /// Results follow the (de-duplicated) input order. A block in any pre
    /// phase aborts the whole batch before anything is written, and so does a
    /// hook mutation that grows the batch past [`MAX_BATCH_SIZE`].
    pub async fn execute(
        &self,
        item_ids: Vec<ItemId>,
        user_id: UserId,
        context: Option<RequestContext>,
    ) -> Result<Vec<GetOrCreateOutcome>, LifecycleError> {
        check_batch_size(item_ids.len())?;
        let item_ids = dedupe(item_ids);

        let request = self
            .hooks
            .run_pre_batch(BatchPrePhase::Request, item_ids, user_id, context)
            .await?;
        HookRunner::throw_if_blocked(&request)?;
        let BatchPreHookOutcome {
            item_ids,
            mut user_id,
            mut context,
            ..
        } = request;
        let item_ids = dedupe(item_ids);
        check_batch_size(item_ids.len())?;

        let mut found: HashMap<ItemId, DismissibleItem> = self
            .items
            .get_many(&item_ids, &user_id)
            .await?
            .into_iter()
            .map(|item| (item.id().clone(), item))
            .collect();

        // `None` marks a position to be filled by a created item.
        let mut slots: Vec<Option<DismissibleItem>> = Vec::with_capacity(item_ids.len());
        let mut existing_ids = Vec::new();
        let mut existing = Vec::new();
        let mut missing_ids = Vec::new();
        for id in &item_ids {
            match found.remove(id) {
                Some(item) => {
                    existing_ids.push(id.clone());
                    existing.push(item.clone());
                    slots.push(Some(item));
                }
                None => {
                    missing_ids.push(id.clone());
                    slots.push(None);
                }
            }
        }

        if !existing.is_empty() {
            let get = self
                .hooks
                .run_pre_batch_with_items(
                    BatchItemsPrePhase::Get,
                    existing_ids,
                    &existing,
                    user_id,
                    context,
                )
                .await?;
            HookRunner::throw_if_blocked(&get)?;
            existing_ids = get.item_ids;
            user_id = get.user_id;
            context = get.context;
        }

        if !missing_ids.is_empty() {
            let create = self
                .hooks
                .run_pre_batch(BatchPrePhase::Create, missing_ids, user_id, context)
                .await?;
            HookRunner::throw_if_blocked(&create)?;
            missing_ids = dedupe(create.item_ids);
            check_batch_limit(existing.len() + missing_ids.len())?;
            user_id = create.user_id;
            context = create.context;
        }

        let created = self.items.create_many(&missing_ids, &user_id).await?;

        if !existing.is_empty() {
            self.hooks
                .run_post_batch(
                    BatchPostPhase::Get,
                    &existing_ids,
                    &existing,
                    &user_id,
                    context.as_ref(),
                )
                .await;
        }
        if !created.is_empty() {
            self.hooks
                .run_post_batch(
                    BatchPostPhase::Create,
                    &missing_ids,
                    &created,
                    &user_id,
                    context.as_ref(),
                )
                .await;
        }

        for item in &existing {
            publish_event(
                self.events.as_ref(),
                DomainEvent::ItemRetrieved {
                    item_id: item.id().clone(),
                    item: item.clone(),
                    user_id: user_id.clone(),
                    context: context.clone(),
                },
            )
            .await;
        }
        for item in &created {
            publish_event(
                self.events.as_ref(),
                DomainEvent::ItemCreated {
                    item_id: item.id().clone(),
                    item: item.clone(),
                    user_id: user_id.clone(),
                    context: context.clone(),
                },
            )
            .await;
        }

        let created_count = created.len();
        let results = fill_slots(slots, created);

        let result_ids: Vec<ItemId> = results.iter().map(|r| r.item.id().clone()).collect();
        let result_items: Vec<DismissibleItem> = results.iter().map(|r| r.item.clone()).collect();
        self.hooks
            .run_post_batch(
                BatchPostPhase::Request,
                &result_ids,
                &result_items,
                &user_id,
                context.as_ref(),
            )
            .await;

        tracing::debug!(
            user_id = %user_id,
            retrieved = existing.len(),
            created = created_count,
            "Batch get-or-create completed"
        );
        Ok(results)
    }
}

fn check_batch_size(len: usize) -> Result<(), LifecycleError> {
    if len == 0 {
        return Err(batch_size_error("must contain at least one item id".to_string()));
    }
    check_batch_limit(len)
}

/// Upper bound only; a create phase may legitimately shrink to nothing.
fn check_batch_limit(len: usize) -> Result<(), LifecycleError> {
    if len > MAX_BATCH_SIZE {
        return Err(batch_size_error(format!(
            "must contain at most {MAX_BATCH_SIZE} item ids"
        )));
    }
    Ok(())
}

fn batch_size_error(message: String) -> LifecycleError {
    ItemError::Validation(vec![FieldError::new("itemIds", message)]).into()
}

/// Drop repeated ids, keeping the first occurrence.
fn dedupe(item_ids: Vec<ItemId>) -> Vec<ItemId> {
    let mut seen = HashSet::with_capacity(item_ids.len());
    item_ids
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Place created items into the missing positions, in order.
///
/// A pre-batch-create hook may change how many ids get created: unfilled
/// positions are dropped and surplus items are appended.
fn fill_slots(
    slots: Vec<Option<DismissibleItem>>,
    created: Vec<DismissibleItem>,
) -> Vec<GetOrCreateOutcome> {
    let mut created = created.into_iter();
    let mut results: Vec<GetOrCreateOutcome> = slots
        .into_iter()
        .filter_map(|slot| match slot {
            Some(item) => Some(GetOrCreateOutcome {
                item,
                created: false,
            }),
            None => created.next().map(|item| GetOrCreateOutcome {
                item,
                created: true,
            }),
        })
        .collect();
    results.extend(created.map(|item| GetOrCreateOutcome {
        item,
        created: true,
    }));
    results
}
