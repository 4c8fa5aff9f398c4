//! Dismissible Domain
//!
//! Core types for tracking, per `(user, item)` pair, whether a named UI element
//! has been dismissed. No I/O lives here; storage, hooks and transport are
//! engine concerns.

pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod value_objects;

pub use entities::DismissibleItem;
pub use error::DomainError;
pub use events::DomainEvent;
pub use ids::{ItemId, UserId, MAX_ID_LENGTH};
pub use value_objects::{ContextPatch, RequestContext};
