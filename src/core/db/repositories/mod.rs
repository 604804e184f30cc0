//! Database repositories for the inventory service
//!
//! Services talk to the document store only through [`UserStore`] and
//! [`ProductStore`]. Two implementations exist: MongoDB for deployments and
//! an in-process store for tests and local runs.

use async_trait::async_trait;
use mongodb::bson::{DateTime, oid::ObjectId};
use std::future::Future;
use std::time::Duration;

use crate::core::db::models::{Product, User};

pub mod memory;
pub mod product;
pub mod user;

pub use memory::InMemoryStore;
pub use product::ProductRepository;
pub use user::UserRepository;

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Store operation exceeded its {0:?} deadline")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    DatabaseError(#[from] mongodb::error::Error),
}

/// Access to user documents
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Count users with exactly this username
    async fn count_by_username(&self, username: &str) -> Result<u64, StoreError>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user. Fails with [`StoreError::Duplicate`] when the
    /// username is already taken.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    /// Upsert the token pair and update time on the user keyed by `userId`
    async fn update_all_tokens(
        &self,
        user_id: &str,
        access_token: &str,
        refresh_token: &str,
        updated_time: DateTime,
    ) -> Result<(), StoreError>;
}

/// Access to product documents
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Every product, fully materialized
    async fn list_all(&self) -> Result<Vec<Product>, StoreError>;

    /// Insert a new product
    async fn insert(&self, product: &Product) -> Result<(), StoreError>;

    /// Set the quantity and return the document after the update, or `None`
    /// when no product has this id
    async fn set_quantity(
        &self,
        id: ObjectId,
        quantity: i64,
    ) -> Result<Option<Product>, StoreError>;
}

/// Run a store operation under a deadline
pub async fn with_deadline<T, F>(limit: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}
