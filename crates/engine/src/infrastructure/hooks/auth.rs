//! Shared-secret bearer authentication.
//!
//! Checks the `authorization` header of the request context against a
//! configured token. Calls without a context carry no credentials and are
//! rejected.

use async_trait::async_trait;
use dismissible_domain::{ItemId, RequestContext, UserId};

use crate::use_cases::lifecycle::{BatchHookResult, HookResult, LifecycleHook};

/// Runs before every other hook.
pub const AUTH_PRIORITY: i32 = -100;
pub const UNAUTHORIZED_REASON: &str = "Unauthorized";

/// Blocks requests whose `authorization` header is not `Bearer <token>`.
pub struct BearerAuthHook {
    token: String,
}

impl BearerAuthHook {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    fn is_authorized(&self, context: Option<&RequestContext>) -> bool {
        context
            .and_then(|ctx| ctx.header("authorization"))
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|presented| presented.trim() == self.token)
    }
}

#[async_trait]
impl LifecycleHook for BearerAuthHook {
    fn name(&self) -> &str {
        "bearer_auth"
    }

    fn priority(&self) -> i32 {
        AUTH_PRIORITY
    }

    async fn on_before_request(
        &self,
        item_id: &ItemId,
        user_id: &UserId,
        context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        if self.is_authorized(context) {
            return Ok(HookResult::proceed());
        }
        tracing::info!(item_id = %item_id, user_id = %user_id, "Rejected unauthenticated request");
        Ok(HookResult::block(UNAUTHORIZED_REASON))
    }

    async fn on_before_batch_request(
        &self,
        item_ids: &[ItemId],
        user_id: &UserId,
        context: Option<&RequestContext>,
    ) -> anyhow::Result<BatchHookResult> {
        if self.is_authorized(context) {
            return Ok(BatchHookResult::proceed());
        }
        tracing::info!(
            item_count = item_ids.len(),
            user_id = %user_id,
            "Rejected unauthenticated batch request"
        );
        Ok(BatchHookResult::block(UNAUTHORIZED_REASON))
    }
}
