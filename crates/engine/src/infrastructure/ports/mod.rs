//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Item storage (could swap in-memory -> Postgres/DynamoDB)
//! - Item shape validation
//! - Domain event delivery
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

pub use error::{EventBusError, RepoError};
pub use external::{EventPublisher, FieldError, ItemValidator};
pub use repos::DismissibleItemRepo;
pub use testing::ClockPort;

#[cfg(test)]
pub use external::{MockEventPublisher, MockItemValidator};
#[cfg(test)]
pub use repos::MockDismissibleItemRepo;
#[cfg(test)]
pub use testing::MockClockPort;
