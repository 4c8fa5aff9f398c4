//! Lifecycle hook contract.
//!
//! A hook is a policy module (auth, rate limiting, auditing, quotas) plugged
//! into the operation pipeline. Every method has a no-op default, so a hook
//! implements only the phases it cares about.
//!
//! - `on_before_*` (pre-hooks) run in ascending [`priority`](LifecycleHook::priority)
//!   order. They may block the operation or mutate the ids/context seen by
//!   later hooks and by the storage call. An `Err` aborts the operation.
//! - `on_after_*` (post-hooks) run in the reverse order after the operation
//!   committed. Errors and panics are logged and swallowed.

use async_trait::async_trait;
use dismissible_domain::{ContextPatch, DismissibleItem, ItemId, RequestContext, UserId};

/// Replacements a single-item pre-hook applies before the next hook runs.
///
/// `item_id` / `user_id` replace the current value; `context` is a shallow
/// patch, dropped when the call carries no context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookMutations {
    pub item_id: Option<ItemId>,
    pub user_id: Option<UserId>,
    pub context: Option<ContextPatch>,
}

/// Batch counterpart of [`HookMutations`]; `item_ids` replaces the whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchHookMutations {
    pub item_ids: Option<Vec<ItemId>>,
    pub user_id: Option<UserId>,
    pub context: Option<ContextPatch>,
}

/// What a single-item pre-hook decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookResult {
    pub proceed: bool,
    pub reason: Option<String>,
    pub mutations: Option<HookMutations>,
}

impl HookResult {
    pub fn proceed() -> Self {
        Self {
            proceed: true,
            reason: None,
            mutations: None,
        }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            proceed: false,
            reason: Some(reason.into()),
            mutations: None,
        }
    }

    pub fn with_mutations(mutations: HookMutations) -> Self {
        Self {
            proceed: true,
            reason: None,
            mutations: Some(mutations),
        }
    }
}

/// What a batch pre-hook decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchHookResult {
    pub proceed: bool,
    pub reason: Option<String>,
    pub mutations: Option<BatchHookMutations>,
}

impl BatchHookResult {
    pub fn proceed() -> Self {
        Self {
            proceed: true,
            reason: None,
            mutations: None,
        }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            proceed: false,
            reason: Some(reason.into()),
            mutations: None,
        }
    }

    pub fn with_mutations(mutations: BatchHookMutations) -> Self {
        Self {
            proceed: true,
            reason: None,
            mutations: Some(mutations),
        }
    }
}

/// A policy module that observes and gates item lifecycle operations.
///
/// Hooks are registered once and shared by every call, so any internal
/// state (counters, caches) must be synchronized by the hook itself.
#[async_trait]
pub trait LifecycleHook: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Lower runs earlier among pre-hooks and later among post-hooks.
    fn priority(&self) -> i32 {
        0
    }

    // -------------------------------------------------------------------------
    // Single-item phases
    // -------------------------------------------------------------------------

    async fn on_before_request(
        &self,
        _item_id: &ItemId,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        Ok(HookResult::proceed())
    }

    async fn on_after_request(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs when the item already exists; `item` is a read-only snapshot.
    async fn on_before_get(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        Ok(HookResult::proceed())
    }

    async fn on_after_get(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_before_create(
        &self,
        _item_id: &ItemId,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        Ok(HookResult::proceed())
    }

    async fn on_after_create(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_before_dismiss(
        &self,
        _item_id: &ItemId,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        Ok(HookResult::proceed())
    }

    async fn on_after_dismiss(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_before_restore(
        &self,
        _item_id: &ItemId,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        Ok(HookResult::proceed())
    }

    async fn on_after_restore(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Batch phases (one call per batch, not per item)
    // -------------------------------------------------------------------------

    async fn on_before_batch_request(
        &self,
        _item_ids: &[ItemId],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<BatchHookResult> {
        Ok(BatchHookResult::proceed())
    }

    async fn on_after_batch_request(
        &self,
        _item_ids: &[ItemId],
        _items: &[DismissibleItem],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_before_batch_get(
        &self,
        _item_ids: &[ItemId],
        _items: &[DismissibleItem],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<BatchHookResult> {
        Ok(BatchHookResult::proceed())
    }

    async fn on_after_batch_get(
        &self,
        _item_ids: &[ItemId],
        _items: &[DismissibleItem],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_before_batch_create(
        &self,
        _item_ids: &[ItemId],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<BatchHookResult> {
        Ok(BatchHookResult::proceed())
    }

    async fn on_after_batch_create(
        &self,
        _item_ids: &[ItemId],
        _items: &[DismissibleItem],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
