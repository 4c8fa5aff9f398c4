//! Fixed-window request rate limiting.
//!
//! Counts requests per client (IP from the request context, falling back to
//! the user id) inside fixed windows. Counters live in memory only, so each
//! process limits independently. Expired windows are swept at most once per
//! window length, from the request path itself.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use dismissible_domain::{ItemId, RequestContext, UserId};

use crate::infrastructure::config::RateLimitConfig;
use crate::use_cases::lifecycle::{BatchHookResult, HookResult, LifecycleHook};

/// Runs after auth, before everything else.
pub const RATE_LIMIT_PRIORITY: i32 = -50;
pub const RATE_LIMIT_REASON: &str = "Rate limit exceeded";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Blocks a client once it exceeds `max_requests` within one window.
///
/// A batch counts as a single request.
pub struct RateLimitHook {
    max_requests: u32,
    window: Duration,
    windows: DashMap<String, Window>,
    last_sweep: Mutex<Instant>,
}

impl RateLimitHook {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: DashMap::new(),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window)
    }

    fn client_key(user_id: &UserId, context: Option<&RequestContext>) -> String {
        match context.and_then(|ctx| ctx.ip.as_deref()) {
            Some(ip) => format!("ip:{ip}"),
            None => format!("user:{user_id}"),
        }
    }

    /// Count one request for `key`; `false` once the window is exhausted.
    fn admit(&self, key: String, now: Instant) -> bool {
        self.maybe_sweep(now);
        let mut entry = self.windows.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }

    /// Drop windows that have already expired.
    pub fn prune(&self) {
        self.prune_at(Instant::now());
    }

    fn prune_at(&self, now: Instant) {
        self.windows
            .retain(|_, window| now.duration_since(window.started) < self.window);
    }

    /// Prune once a full window has passed since the last sweep. Must run
    /// before any map entry is held.
    fn maybe_sweep(&self, now: Instant) {
        // A contended lock means another request is already sweeping.
        let Ok(mut last_sweep) = self.last_sweep.try_lock() else {
            return;
        };
        if now.duration_since(*last_sweep) < self.window {
            return;
        }
        *last_sweep = now;
        drop(last_sweep);
        self.prune_at(now);
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

#[async_trait]
impl LifecycleHook for RateLimitHook {
    fn name(&self) -> &str {
        "rate_limit"
    }

    fn priority(&self) -> i32 {
        RATE_LIMIT_PRIORITY
    }

    async fn on_before_request(
        &self,
        _item_id: &ItemId,
        user_id: &UserId,
        context: Option<&RequestContext>,
    ) -> anyhow::Result<HookResult> {
        let key = Self::client_key(user_id, context);
        if self.admit(key.clone(), Instant::now()) {
            return Ok(HookResult::proceed());
        }
        tracing::info!(client = %key, "Rate limit exceeded");
        Ok(HookResult::block(RATE_LIMIT_REASON))
    }

    async fn on_before_batch_request(
        &self,
        _item_ids: &[ItemId],
        user_id: &UserId,
        context: Option<&RequestContext>,
    ) -> anyhow::Result<BatchHookResult> {
        let key = Self::client_key(user_id, context);
        if self.admit(key.clone(), Instant::now()) {
            return Ok(BatchHookResult::proceed());
        }
        tracing::info!(client = %key, "Rate limit exceeded");
        Ok(BatchHookResult::block(RATE_LIMIT_REASON))
    }
}
