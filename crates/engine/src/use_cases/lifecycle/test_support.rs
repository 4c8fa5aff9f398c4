//! Shared fixtures for lifecycle use case tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dismissible_domain::{DismissibleItem, DomainEvent, ItemId, RequestContext, UserId};

use crate::entities::DismissibleItems;
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::ports::{
    DismissibleItemRepo, EventPublisher, MockEventPublisher, MockItemValidator,
};

use super::hooks::{BatchHookResult, HookResult, LifecycleHook};

pub(crate) type Log = Arc<Mutex<Vec<String>>>;

pub(crate) fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

pub(crate) fn item_id(raw: &str) -> ItemId {
    ItemId::new(raw).unwrap()
}

pub(crate) fn user_id(raw: &str) -> UserId {
    UserId::new(raw).unwrap()
}

pub(crate) fn stored_item(id: &str, user: &str) -> DismissibleItem {
    DismissibleItem::new(item_id(id), user_id(user), fixed_now())
}

/// Core engine over `repo` with a fixed clock and an accept-all validator.
pub(crate) fn items_over(repo: Arc<dyn DismissibleItemRepo>) -> Arc<DismissibleItems> {
    let mut validator = MockItemValidator::new();
    validator.expect_validate().returning(|_| Ok(()));
    Arc::new(DismissibleItems::new(
        repo,
        Arc::new(FixedClock(fixed_now())),
        Arc::new(validator),
    ))
}

/// Event publisher that keeps everything it receives.
pub(crate) fn recording_events() -> (Arc<dyn EventPublisher>, Arc<Mutex<Vec<DomainEvent>>>) {
    let published = Arc::new(Mutex::new(Vec::new()));
    let sink = published.clone();
    let mut events = MockEventPublisher::new();
    events.expect_publish().returning(move |event| {
        sink.lock().unwrap().push(event);
        Ok(())
    });
    (Arc::new(events), published)
}

pub(crate) fn event_names(published: &Arc<Mutex<Vec<DomainEvent>>>) -> Vec<&'static str> {
    published.lock().unwrap().iter().map(DomainEvent::name).collect()
}

/// Hook that records every phase it sees as `"<label>:<phase>"`.
pub(crate) struct PhaseRecorder {
    pub label: &'static str,
    pub priority: i32,
    pub log: Log,
}

impl PhaseRecorder {
    pub(crate) fn arc(label: &'static str, priority: i32, log: &Log) -> Arc<dyn LifecycleHook> {
        Arc::new(Self {
            label,
            priority,
            log: log.clone(),
        })
    }

    fn record(&self, phase: &str) {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.label, phase));
    }
}

#[async_trait]
impl LifecycleHook for PhaseRecorder {
    fn priority(&self) -> i32 {
        self.priority
    }

    async fn on_before_request(
        &self,
        _item_id: &ItemId,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        self.record("before_request");
        Ok(HookResult::proceed())
    }

    async fn on_after_request(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        self.record("after_request");
        Ok(())
    }

    async fn on_before_get(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        self.record("before_get");
        Ok(HookResult::proceed())
    }

    async fn on_after_get(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        self.record("after_get");
        Ok(())
    }

    async fn on_before_create(
        &self,
        _item_id: &ItemId,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        self.record("before_create");
        Ok(HookResult::proceed())
    }

    async fn on_after_create(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        self.record("after_create");
        Ok(())
    }

    async fn on_before_dismiss(
        &self,
        _item_id: &ItemId,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        self.record("before_dismiss");
        Ok(HookResult::proceed())
    }

    async fn on_after_dismiss(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        self.record("after_dismiss");
        Ok(())
    }

    async fn on_before_restore(
        &self,
        _item_id: &ItemId,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        self.record("before_restore");
        Ok(HookResult::proceed())
    }

    async fn on_after_restore(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        self.record("after_restore");
        Ok(())
    }

    async fn on_before_batch_request(
        &self,
        item_ids: &[ItemId],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<BatchHookResult> {
        self.record(&format!("before_batch_request({})", item_ids.len()));
        Ok(BatchHookResult::proceed())
    }

    async fn on_after_batch_request(
        &self,
        item_ids: &[ItemId],
        _items: &[DismissibleItem],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        self.record(&format!("after_batch_request({})", item_ids.len()));
        Ok(())
    }

    async fn on_before_batch_get(
        &self,
        item_ids: &[ItemId],
        _items: &[DismissibleItem],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<BatchHookResult> {
        self.record(&format!("before_batch_get({})", item_ids.len()));
        Ok(BatchHookResult::proceed())
    }

    async fn on_after_batch_get(
        &self,
        item_ids: &[ItemId],
        _items: &[DismissibleItem],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        self.record(&format!("after_batch_get({})", item_ids.len()));
        Ok(())
    }

    async fn on_before_batch_create(
        &self,
        item_ids: &[ItemId],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<BatchHookResult> {
        self.record(&format!("before_batch_create({})", item_ids.len()));
        Ok(BatchHookResult::proceed())
    }

    async fn on_after_batch_create(
        &self,
        item_ids: &[ItemId],
        _items: &[DismissibleItem],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        self.record(&format!("after_batch_create({})", item_ids.len()));
        Ok(())
    }
}

/// Hook that blocks a single named pre phase with a fixed reason.
pub(crate) struct BlockPhase {
    pub phase: &'static str,
    pub reason: &'static str,
}

impl BlockPhase {
    fn decide(&self, phase: &str) -> HookResult {
        if self.phase == phase {
            HookResult::block(self.reason)
        } else {
            HookResult::proceed()
        }
    }

    fn decide_batch(&self, phase: &str) -> BatchHookResult {
        if self.phase == phase {
            BatchHookResult::block(self.reason)
        } else {
            BatchHookResult::proceed()
        }
    }
}

#[async_trait]
impl LifecycleHook for BlockPhase {
    async fn on_before_request(
        &self,
        _item_id: &ItemId,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        Ok(self.decide("before_request"))
    }

    async fn on_before_get(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        Ok(self.decide("before_get"))
    }

    async fn on_before_create(
        &self,
        _item_id: &ItemId,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        Ok(self.decide("before_create"))
    }

    async fn on_before_dismiss(
        &self,
        _item_id: &ItemId,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        Ok(self.decide("before_dismiss"))
    }

    async fn on_before_restore(
        &self,
        _item_id: &ItemId,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        Ok(self.decide("before_restore"))
    }

    async fn on_before_batch_request(
        &self,
        _item_ids: &[ItemId],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<BatchHookResult> {
        Ok(self.decide_batch("before_batch_request"))
    }

    async fn on_before_batch_get(
        &self,
        _item_ids: &[ItemId],
        _items: &[DismissibleItem],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<BatchHookResult> {
        Ok(self.decide_batch("before_batch_get"))
    }

    async fn on_before_batch_create(
        &self,
        _item_ids: &[ItemId],
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<BatchHookResult> {
        Ok(self.decide_batch("before_batch_create"))
    }
}

/// Hook whose post phases always fail.
pub(crate) struct FailingPostHook;

#[async_trait]
impl LifecycleHook for FailingPostHook {
    async fn on_after_request(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        anyhow::bail!("audit sink unavailable")
    }

    async fn on_after_create(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        anyhow::bail!("audit sink unavailable")
    }

    async fn on_after_get(
        &self,
        _item_id: &ItemId,
        _item: &DismissibleItem,
        _user_id: &UserId,
        _context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        anyhow::bail!("audit sink unavailable")
    }
}
