//! Lifecycle pipeline errors.

use crate::entities::ItemError;

/// Reason reported when a blocking hook gives none.
pub const DEFAULT_BLOCK_REASON: &str = "Operation blocked by lifecycle hook";

/// Errors surfaced to callers of the lifecycle use cases.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// A pre-hook declined to proceed.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// The item operation failed (not found, bad transition, validation, storage).
    #[error(transparent)]
    Item(#[from] ItemError),

    /// A pre-hook failed; the hook's own error is kept as-is.
    #[error(transparent)]
    Hook(#[from] anyhow::Error),
}

impl LifecycleError {
    pub fn forbidden(reason: Option<&str>) -> Self {
        Self::Forbidden {
            reason: reason.unwrap_or(DEFAULT_BLOCK_REASON).to_string(),
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }
}
