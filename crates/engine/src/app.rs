//! Application state and composition.

use std::sync::Arc;

use crate::entities::DismissibleItems;
use crate::infrastructure::{
    clock::SystemClock,
    config::EngineConfig,
    event_bus::BroadcastEventBus,
    hooks::{AuditLogHook, BearerAuthHook, RateLimitHook},
    persistence::InMemoryItemRepo,
    ports::{ClockPort, DismissibleItemRepo, ItemValidator},
    validation::ValidatorItemValidator,
};
use crate::use_cases::lifecycle::{HookRunner, LifecycleHook, LifecycleUseCases};

/// Main application state.
///
/// Holds the use cases and the event bus.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
    pub events: BroadcastEventBus,
}

/// Container for all use cases.
pub struct UseCases {
    pub lifecycle: LifecycleUseCases,
}

impl App {
    /// Wire the engine from explicit parts.
    pub fn new(
        repo: Arc<dyn DismissibleItemRepo>,
        clock: Arc<dyn ClockPort>,
        validator: Arc<dyn ItemValidator>,
        hooks: Vec<Arc<dyn LifecycleHook>>,
        events: BroadcastEventBus,
    ) -> Self {
        let items = Arc::new(DismissibleItems::new(repo, clock, validator));
        let runner = Arc::new(HookRunner::new(hooks));
        tracing::info!(hooks = ?runner.hook_names(), "Lifecycle hooks registered");

        let lifecycle = LifecycleUseCases::new(items, runner, Arc::new(events.clone()));

        Self {
            use_cases: UseCases { lifecycle },
            events,
        }
    }

    /// Wire the engine for the binary: in-memory store, system clock and the
    /// hooks enabled by `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            Arc::new(InMemoryItemRepo::new()),
            Arc::new(SystemClock::new()),
            Arc::new(ValidatorItemValidator::new()),
            hooks_from_config(config),
            BroadcastEventBus::new(config.event_bus_capacity),
        )
    }
}

/// Build the hook list enabled by configuration.
pub fn hooks_from_config(config: &EngineConfig) -> Vec<Arc<dyn LifecycleHook>> {
    let mut hooks: Vec<Arc<dyn LifecycleHook>> = Vec::new();

    match &config.auth_token {
        Some(token) => hooks.push(Arc::new(BearerAuthHook::new(token.clone()))),
        None => tracing::warn!("AUTH_TOKEN not set, requests are not authenticated"),
    }
    if config.rate_limit.enabled {
        hooks.push(Arc::new(RateLimitHook::from_config(&config.rate_limit)));
    }
    if config.audit_log_enabled {
        hooks.push(Arc::new(AuditLogHook::new()));
    }

    hooks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::RateLimitConfig;

    #[test]
    fn hooks_follow_configuration() {
        let all = EngineConfig {
            auth_token: Some("secret".into()),
            ..EngineConfig::default()
        };
        let names: Vec<String> = hooks_from_config(&all)
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(names, vec!["bearer_auth", "rate_limit", "audit_log"]);

        let none = EngineConfig {
            rate_limit: RateLimitConfig {
                enabled: false,
                ..RateLimitConfig::default()
            },
            audit_log_enabled: false,
            ..EngineConfig::default()
        };
        assert!(hooks_from_config(&none).is_empty());
    }

    #[tokio::test]
    async fn from_config_publishes_to_the_bus() {
        let app = App::from_config(&EngineConfig::default());
        let mut receiver = app.events.subscribe();

        app.use_cases
            .lifecycle
            .get_or_create
            .execute(
                dismissible_domain::ItemId::new("welcome").unwrap(),
                dismissible_domain::UserId::new("u1").unwrap(),
                None,
            )
            .await
            .unwrap();

        assert_eq!(receiver.recv().await.unwrap().name(), "ITEM_CREATED");
    }
}
