//! Hook registry and runner.
//!
//! Holds the registered hooks sorted by priority and executes one lifecycle
//! phase at a time:
//!
//! - pre phases walk the ascending list, thread mutations from hook to hook,
//!   and stop at the first hook that blocks or fails;
//! - post phases walk the descending list and never fail.
//!
//! The list is fixed at construction, so one runner is shared by all calls.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use dismissible_domain::{DismissibleItem, ItemId, RequestContext, UserId};
use futures_util::FutureExt;

use super::error::LifecycleError;
use super::hooks::{BatchHookMutations, BatchHookResult, HookMutations, HookResult, LifecycleHook};

// =============================================================================
// Phases
// =============================================================================

/// Single-item pre phases that do not see an existing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrePhase {
    Request,
    Create,
    Dismiss,
    Restore,
}

/// Single-item pre phases that inspect the existing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemPrePhase {
    Get,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostPhase {
    Request,
    Get,
    Create,
    Dismiss,
    Restore,
}

/// Batch pre phases that do not see existing items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPrePhase {
    Request,
    Create,
}

/// Batch pre phases that inspect existing items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchItemsPrePhase {
    Get,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPostPhase {
    Request,
    Get,
    Create,
}

impl PrePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Request => "before_request",
            Self::Create => "before_create",
            Self::Dismiss => "before_dismiss",
            Self::Restore => "before_restore",
        }
    }
}

impl ItemPrePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "before_get",
        }
    }
}

impl PostPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Request => "after_request",
            Self::Get => "after_get",
            Self::Create => "after_create",
            Self::Dismiss => "after_dismiss",
            Self::Restore => "after_restore",
        }
    }
}

impl BatchPrePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Request => "before_batch_request",
            Self::Create => "before_batch_create",
        }
    }
}

impl BatchItemsPrePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "before_batch_get",
        }
    }
}

impl BatchPostPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Request => "after_batch_request",
            Self::Get => "after_batch_get",
            Self::Create => "after_batch_create",
        }
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of a single-item pre phase with the fully threaded values.
///
/// When blocked, the values are those in effect when the blocking hook ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreHookOutcome {
    pub proceed: bool,
    pub reason: Option<String>,
    pub item_id: ItemId,
    pub user_id: UserId,
    pub context: Option<RequestContext>,
}

/// Result of a batch pre phase with the fully threaded values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPreHookOutcome {
    pub proceed: bool,
    pub reason: Option<String>,
    pub item_ids: Vec<ItemId>,
    pub user_id: UserId,
    pub context: Option<RequestContext>,
}

/// Anything that can stop the pipeline.
pub trait Gate {
    fn proceeds(&self) -> bool;
    fn block_reason(&self) -> Option<&str>;
}

impl Gate for PreHookOutcome {
    fn proceeds(&self) -> bool {
        self.proceed
    }

    fn block_reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl Gate for BatchPreHookOutcome {
    fn proceeds(&self) -> bool {
        self.proceed
    }

    fn block_reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

enum SinglePre<'a> {
    Plain(PrePhase),
    WithItem(ItemPrePhase, &'a DismissibleItem),
}

impl SinglePre<'_> {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Plain(phase) => phase.as_str(),
            Self::WithItem(phase, _) => phase.as_str(),
        }
    }
}

enum BatchPre<'a> {
    Plain(BatchPrePhase),
    WithItems(BatchItemsPrePhase, &'a [DismissibleItem]),
}

impl BatchPre<'_> {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Plain(phase) => phase.as_str(),
            Self::WithItems(phase, _) => phase.as_str(),
        }
    }
}

fn patch_context(
    context: &mut Option<RequestContext>,
    patch: Option<dismissible_domain::ContextPatch>,
    hook: &str,
    phase: &str,
) {
    let Some(patch) = patch else {
        return;
    };
    match context.as_mut() {
        Some(ctx) => ctx.apply(patch),
        None => {
            tracing::debug!(hook, phase, "Context mutation dropped: call has no context");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Ordered hook list plus the phase execution algorithms.
pub struct HookRunner {
    pre_order: Vec<Arc<dyn LifecycleHook>>,
    post_order: Vec<Arc<dyn LifecycleHook>>,
}

impl HookRunner {
    /// Register hooks. Pre phases run them by ascending priority, ties in
    /// registration order; post phases run the exact reverse.
    pub fn new(hooks: Vec<Arc<dyn LifecycleHook>>) -> Self {
        let mut pre_order = hooks;
        pre_order.sort_by_key(|hook| hook.priority());
        let post_order = pre_order.iter().rev().cloned().collect();
        Self {
            pre_order,
            post_order,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.pre_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pre_order.is_empty()
    }

    /// Hook names in pre-phase order.
    pub fn hook_names(&self) -> Vec<&str> {
        self.pre_order.iter().map(|hook| hook.name()).collect()
    }

    /// Fail with [`LifecycleError::Forbidden`] unless the outcome proceeds.
    pub fn throw_if_blocked(outcome: &impl Gate) -> Result<(), LifecycleError> {
        if outcome.proceeds() {
            Ok(())
        } else {
            Err(LifecycleError::forbidden(outcome.block_reason()))
        }
    }

    pub async fn run_pre(
        &self,
        phase: PrePhase,
        item_id: ItemId,
        user_id: UserId,
        context: Option<RequestContext>,
    ) -> anyhow::Result<PreHookOutcome> {
        self.run_single_pre(SinglePre::Plain(phase), item_id, user_id, context)
            .await
    }

    /// Like [`run_pre`](Self::run_pre) but hands every hook a snapshot of the
    /// existing item. Hooks cannot change the item itself.
    pub async fn run_pre_with_item(
        &self,
        phase: ItemPrePhase,
        item_id: ItemId,
        item: &DismissibleItem,
        user_id: UserId,
        context: Option<RequestContext>,
    ) -> anyhow::Result<PreHookOutcome> {
        self.run_single_pre(SinglePre::WithItem(phase, item), item_id, user_id, context)
            .await
    }

    pub async fn run_pre_batch(
        &self,
        phase: BatchPrePhase,
        item_ids: Vec<ItemId>,
        user_id: UserId,
        context: Option<RequestContext>,
    ) -> anyhow::Result<BatchPreHookOutcome> {
        self.run_batch_pre(BatchPre::Plain(phase), item_ids, user_id, context)
            .await
    }

    pub async fn run_pre_batch_with_items(
        &self,
        phase: BatchItemsPrePhase,
        item_ids: Vec<ItemId>,
        items: &[DismissibleItem],
        user_id: UserId,
        context: Option<RequestContext>,
    ) -> anyhow::Result<BatchPreHookOutcome> {
        self.run_batch_pre(BatchPre::WithItems(phase, items), item_ids, user_id, context)
            .await
    }

    async fn run_single_pre(
        &self,
        phase: SinglePre<'_>,
        mut item_id: ItemId,
        mut user_id: UserId,
        mut context: Option<RequestContext>,
    ) -> anyhow::Result<PreHookOutcome> {
        let phase_name = phase.as_str();

        for hook in &self.pre_order {
            let result = match &phase {
                SinglePre::Plain(PrePhase::Request) => {
                    hook.on_before_request(&item_id, &user_id, context.as_ref())
                        .await
                }
                SinglePre::Plain(PrePhase::Create) => {
                    hook.on_before_create(&item_id, &user_id, context.as_ref())
                        .await
                }
                SinglePre::Plain(PrePhase::Dismiss) => {
                    hook.on_before_dismiss(&item_id, &user_id, context.as_ref())
                        .await
                }
                SinglePre::Plain(PrePhase::Restore) => {
                    hook.on_before_restore(&item_id, &user_id, context.as_ref())
                        .await
                }
                SinglePre::WithItem(ItemPrePhase::Get, item) => {
                    hook.on_before_get(&item_id, item, &user_id, context.as_ref())
                        .await
                }
            };

            let HookResult {
                proceed,
                reason,
                mutations,
            } = match result {
                Ok(result) => result,
                Err(error) => {
                    tracing::error!(
                        hook = hook.name(),
                        phase = phase_name,
                        item_id = %item_id,
                        user_id = %user_id,
                        error = %error,
                        "Pre-hook failed"
                    );
                    return Err(error);
                }
            };

            if !proceed {
                tracing::debug!(
                    hook = hook.name(),
                    phase = phase_name,
                    item_id = %item_id,
                    user_id = %user_id,
                    reason = ?reason,
                    "Pre-hook blocked operation"
                );
                return Ok(PreHookOutcome {
                    proceed: false,
                    reason,
                    item_id,
                    user_id,
                    context,
                });
            }

            if let Some(HookMutations {
                item_id: new_item_id,
                user_id: new_user_id,
                context: patch,
            }) = mutations
            {
                if let Some(new_item_id) = new_item_id {
                    item_id = new_item_id;
                }
                if let Some(new_user_id) = new_user_id {
                    user_id = new_user_id;
                }
                patch_context(&mut context, patch, hook.name(), phase_name);
            }
        }

        Ok(PreHookOutcome {
            proceed: true,
            reason: None,
            item_id,
            user_id,
            context,
        })
    }

    async fn run_batch_pre(
        &self,
        phase: BatchPre<'_>,
        mut item_ids: Vec<ItemId>,
        mut user_id: UserId,
        mut context: Option<RequestContext>,
    ) -> anyhow::Result<BatchPreHookOutcome> {
        let phase_name = phase.as_str();

        for hook in &self.pre_order {
            let result = match &phase {
                BatchPre::Plain(BatchPrePhase::Request) => {
                    hook.on_before_batch_request(&item_ids, &user_id, context.as_ref())
                        .await
                }
                BatchPre::Plain(BatchPrePhase::Create) => {
                    hook.on_before_batch_create(&item_ids, &user_id, context.as_ref())
                        .await
                }
                BatchPre::WithItems(BatchItemsPrePhase::Get, items) => {
                    hook.on_before_batch_get(&item_ids, items, &user_id, context.as_ref())
                        .await
                }
            };

            let BatchHookResult {
                proceed,
                reason,
                mutations,
            } = match result {
                Ok(result) => result,
                Err(error) => {
                    tracing::error!(
                        hook = hook.name(),
                        phase = phase_name,
                        item_count = item_ids.len(),
                        user_id = %user_id,
                        error = %error,
                        "Batch pre-hook failed"
                    );
                    return Err(error);
                }
            };

            if !proceed {
                tracing::debug!(
                    hook = hook.name(),
                    phase = phase_name,
                    item_count = item_ids.len(),
                    user_id = %user_id,
                    reason = ?reason,
                    "Batch pre-hook blocked operation"
                );
                return Ok(BatchPreHookOutcome {
                    proceed: false,
                    reason,
                    item_ids,
                    user_id,
                    context,
                });
            }

            if let Some(BatchHookMutations {
                item_ids: new_item_ids,
                user_id: new_user_id,
                context: patch,
            }) = mutations
            {
                if let Some(new_item_ids) = new_item_ids {
                    item_ids = new_item_ids;
                }
                if let Some(new_user_id) = new_user_id {
                    user_id = new_user_id;
                }
                patch_context(&mut context, patch, hook.name(), phase_name);
            }
        }

        Ok(BatchPreHookOutcome {
            proceed: true,
            reason: None,
            item_ids,
            user_id,
            context,
        })
    }

    /// Run a post phase. Failures (errors or panics) are logged and skipped.
    pub async fn run_post(
        &self,
        phase: PostPhase,
        item_id: &ItemId,
        item: &DismissibleItem,
        user_id: &UserId,
        context: Option<&RequestContext>,
    ) {
        for hook in &self.post_order {
            let call = async {
                match phase {
                    PostPhase::Request => {
                        hook.on_after_request(item_id, item, user_id, context).await
                    }
                    PostPhase::Get => hook.on_after_get(item_id, item, user_id, context).await,
                    PostPhase::Create => {
                        hook.on_after_create(item_id, item, user_id, context).await
                    }
                    PostPhase::Dismiss => {
                        hook.on_after_dismiss(item_id, item, user_id, context).await
                    }
                    PostPhase::Restore => {
                        hook.on_after_restore(item_id, item, user_id, context).await
                    }
                }
            };

            match AssertUnwindSafe(call).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::warn!(
                        hook = hook.name(),
                        phase = phase.as_str(),
                        item_id = %item_id,
                        user_id = %user_id,
                        error = %error,
                        "Post-hook failed, continuing"
                    );
                }
                Err(payload) => {
                    tracing::warn!(
                        hook = hook.name(),
                        phase = phase.as_str(),
                        item_id = %item_id,
                        user_id = %user_id,
                        panic = %panic_message(payload.as_ref()),
                        "Post-hook panicked, continuing"
                    );
                }
            }
        }
    }

    /// Batch counterpart of [`run_post`](Self::run_post).
    pub async fn run_post_batch(
        &self,
        phase: BatchPostPhase,
        item_ids: &[ItemId],
        items: &[DismissibleItem],
        user_id: &UserId,
        context: Option<&RequestContext>,
    ) {
        for hook in &self.post_order {
            let call = async {
                match phase {
                    BatchPostPhase::Request => {
                        hook.on_after_batch_request(item_ids, items, user_id, context)
                            .await
                    }
                    BatchPostPhase::Get => {
                        hook.on_after_batch_get(item_ids, items, user_id, context)
                            .await
                    }
                    BatchPostPhase::Create => {
                        hook.on_after_batch_create(item_ids, items, user_id, context)
                            .await
                    }
                }
            };

            match AssertUnwindSafe(call).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::warn!(
                        hook = hook.name(),
                        phase = phase.as_str(),
                        item_count = item_ids.len(),
                        user_id = %user_id,
                        error = %error,
                        "Batch post-hook failed, continuing"
                    );
                }
                Err(payload) => {
                    tracing::warn!(
                        hook = hook.name(),
                        phase = phase.as_str(),
                        item_count = item_ids.len(),
                        user_id = %user_id,
                        panic = %panic_message(payload.as_ref()),
                        "Batch post-hook panicked, continuing"
                    );
                }
            }
        }
    }
}
