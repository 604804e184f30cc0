//! Database module for the inventory service
//!
//! This module provides document store connectivity, models, and repositories.

pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used items
pub use models::*;
pub use pool::{DbConfig, DbError, connect};
pub use repositories::{
    InMemoryStore, ProductRepository, ProductStore, StoreError, UserRepository, UserStore,
    with_deadline,
};
