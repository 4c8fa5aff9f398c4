//! Audit trail of committed item operations.

use async_trait::async_trait;
use dismissible_domain::{DismissibleItem, ItemId, RequestContext, UserId};

use crate::use_cases::lifecycle::LifecycleHook;

pub const AUDIT_PRIORITY: i32 = 0;

/// Writes one `info!` record per committed operation under the `audit` target.
///
/// Post phases only; never blocks.
#[derive(Debug, Default)]
pub struct AuditLogHook;

impl AuditLogHook {
    pub fn new() -> Self {
        Self
    }

    fn record(
        action: &'static str,
        item_id: &ItemId,
        item: &DismissibleItem,
        user_id: &UserId,
        context: Option<&RequestContext>,
    ) {
        tracing::info!(
            target: "audit",
            action,
            item_id = %item_id,
            user_id = %user_id,
            dismissed = item.is_dismissed(),
            request_id = context.map(|c| c.request_id.as_str()),
            ip = context.and_then(|c| c.ip.as_deref()),
            "Item operation committed"
        );
    }
}

#[async_trait]
impl LifecycleHook for AuditLogHook {
    fn name(&self) -> &str {
        "audit_log"
    }

    fn priority(&self) -> i32 {
        AUDIT_PRIORITY
    }

    async fn on_after_get(
        &self,
        item_id: &ItemId,
        item: &DismissibleItem,
        user_id: &UserId,
        context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        Self::record("get", item_id, item, user_id, context);
        Ok(())
    }

    async fn on_after_create(
        &self,
        item_id: &ItemId,
        item: &DismissibleItem,
        user_id: &UserId,
        context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        Self::record("create", item_id, item, user_id, context);
        Ok(())
    }

    async fn on_after_dismiss(
        &self,
        item_id: &ItemId,
        item: &DismissibleItem,
        user_id: &UserId,
        context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        Self::record("dismiss", item_id, item, user_id, context);
        Ok(())
    }

    async fn on_after_restore(
        &self,
        item_id: &ItemId,
        item: &DismissibleItem,
        user_id: &UserId,
        context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        Self::record("restore", item_id, item, user_id, context);
        Ok(())
    }

    async fn on_after_batch_request(
        &self,
        item_ids: &[ItemId],
        items: &[DismissibleItem],
        user_id: &UserId,
        context: Option<&RequestContext>,
    ) -> anyhow::Result<()> {
        tracing::info!(
            target: "audit",
            action = "batch_get_or_create",
            item_count = item_ids.len(),
            dismissed = items.iter().filter(|i| i.is_dismissed()).count(),
            user_id = %user_id,
            request_id = context.map(|c| c.request_id.as_str()),
            "Batch operation committed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn post_phases_succeed_and_pre_phases_pass_through() {
        let hook = AuditLogHook::new();
        let item_id = ItemId::new("banner").unwrap();
        let user_id = UserId::new("u1").unwrap();
        let item = DismissibleItem::new(item_id.clone(), user_id.clone(), Utc::now());
        let ctx = RequestContext::new("r1").with_ip("10.0.0.1");

        hook.on_after_create(&item_id, &item, &user_id, Some(&ctx)).await.unwrap();
        hook.on_after_dismiss(&item_id, &item, &user_id, None).await.unwrap();
        hook.on_after_batch_request(&[item_id.clone()], &[item], &user_id, None)
            .await
            .unwrap();

        let pre = hook.on_before_request(&item_id, &user_id, None).await.unwrap();
        assert!(pre.proceed);
        assert_eq!(hook.name(), "audit_log");
    }
}
