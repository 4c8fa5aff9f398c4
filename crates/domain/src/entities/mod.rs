//! Domain entities.

mod dismissible_item;

pub use dismissible_item::DismissibleItem;
