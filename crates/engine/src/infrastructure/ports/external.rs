//! Ports for collaborators outside the storage boundary.

use async_trait::async_trait;
use dismissible_domain::{DismissibleItem, DomainEvent};
use serde::Serialize;

use super::error::EventBusError;

// =============================================================================
// Validation
// =============================================================================

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Shape validation run on every item before it is persisted.
#[cfg_attr(test, mockall::automock)]
pub trait ItemValidator: Send + Sync {
    fn validate(&self, item: &DismissibleItem) -> Result<(), Vec<FieldError>>;
}

// =============================================================================
// Domain Events
// =============================================================================

/// Port for publishing domain events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event.
    ///
    /// This is a best-effort operation; failures are logged by the caller and
    /// never break the operation that produced the event.
    async fn publish(&self, event: DomainEvent) -> Result<(), EventBusError>;
}
