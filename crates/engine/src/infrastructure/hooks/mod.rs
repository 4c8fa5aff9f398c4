//! Concrete lifecycle hooks wired by the binary.
//!
//! Each implements [`LifecycleHook`](crate::use_cases::lifecycle::LifecycleHook)
//! for the phases it needs and nothing else.

mod audit;
mod auth;
mod rate_limit;

pub use audit::{AuditLogHook, AUDIT_PRIORITY};
pub use auth::{BearerAuthHook, AUTH_PRIORITY, UNAUTHORIZED_REASON};
pub use rate_limit::{RateLimitHook, RATE_LIMIT_PRIORITY, RATE_LIMIT_REASON};
