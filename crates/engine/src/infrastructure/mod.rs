//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies, the
//! concrete lifecycle hooks and environment configuration.

pub mod clock;
pub mod config;
pub mod event_bus;
pub mod hooks;
pub mod persistence;
pub mod ports;
pub mod validation;
