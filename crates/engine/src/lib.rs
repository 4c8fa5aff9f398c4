//! Dismissible engine library.
//!
//! Lifecycle orchestration for per-user dismissible items (banners, tips,
//! onboarding steps) with pluggable policy hooks.
//!
//! ## Structure
//!
//! - `entities/` - Core item operations over the storage port
//! - `use_cases/` - Hook-sequenced lifecycle operations
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod entities;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
