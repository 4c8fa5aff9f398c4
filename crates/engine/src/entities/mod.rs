//! Entity modules - Domain capability encapsulation.
//!
//! Each module wraps operations for a domain entity type.
//! They depend on repository ports and provide the building blocks for use cases.

pub mod dismissible_item;

pub use dismissible_item::{DismissibleItems, GetOrCreateOutcome, ItemError, ItemTransition};
