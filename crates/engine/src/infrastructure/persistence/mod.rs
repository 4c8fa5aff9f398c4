//! Item store adapters implementing [`DismissibleItemRepo`](crate::infrastructure::ports::DismissibleItemRepo).

mod memory_item_repo;

pub use memory_item_repo::InMemoryItemRepo;
