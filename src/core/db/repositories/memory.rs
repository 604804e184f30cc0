//! In-process document store
//!
//! Implements both store traits on top of `DashMap`. Used by the test suite
//! and by `STORE_BACKEND=memory` for running without MongoDB.

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use mongodb::bson::{DateTime, oid::ObjectId};
use std::sync::Arc;

use crate::core::db::models::{Product, User};
use crate::core::db::repositories::{ProductStore, StoreError, UserStore};

/// In-memory store holding users (keyed by username) and products
#[derive(Clone, Default)]
pub struct InMemoryStore {
    users: Arc<DashMap<String, User>>,
    products: Arc<DashMap<ObjectId, Product>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored user
    pub fn user(&self, username: &str) -> Option<User> {
        self.users.get(username).map(|entry| entry.value().clone())
    }

    /// Snapshot of a stored product
    pub fn product(&self, id: &ObjectId) -> Option<Product> {
        self.products.get(id).map(|entry| entry.value().clone())
    }

    /// Number of stored users
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn count_by_username(&self, username: &str) -> Result<u64, StoreError> {
        Ok(u64::from(self.users.contains_key(username)))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.user(username))
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        // The entry lock makes the uniqueness check and the insert one step
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(user.username.clone())),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn update_all_tokens(
        &self,
        user_id: &str,
        access_token: &str,
        refresh_token: &str,
        updated_time: DateTime,
    ) -> Result<(), StoreError> {
        let Some(mut user) = self.users.iter_mut().find(|u| u.user_id == user_id) else {
            // A MongoDB upsert would create a bare token document here; this
            // store only holds complete users.
            tracing::warn!(user_id, "Token update for unknown user ignored");
            return Ok(());
        };

        user.token = Some(access_token.to_string());
        user.refresh_token = Some(refresh_token.to_string());
        user.updated_time = updated_time;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        // ObjectIds start with a timestamp, so this approximates insertion order
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        match self.products.entry(product.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(product.id.to_hex())),
            Entry::Vacant(slot) => {
                slot.insert(product.clone());
                Ok(())
            }
        }
    }

    async fn set_quantity(
        &self,
        id: ObjectId,
        quantity: i64,
    ) -> Result<Option<Product>, StoreError> {
        Ok(self.products.get_mut(&id).map(|mut product| {
            product.quantity = quantity;
            product.value().clone()
        }))
    }
}
