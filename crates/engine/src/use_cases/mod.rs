//! Use cases - User story orchestration.
//!
//! Use cases sequence lifecycle hooks around the entity modules to fulfill
//! the externally callable operations.

pub mod lifecycle;

pub use lifecycle::LifecycleUseCases;
