//! User repository for MongoDB
//!
//! Stores user documents in the `Users` collection. Username uniqueness is
//! backed by a unique index so that concurrent registrations cannot both land.

use async_trait::async_trait;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{DateTime, Document, doc},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};

use crate::core::db::models::User;
use crate::core::db::repositories::{StoreError, UserStore};

/// Collection holding user documents
pub const USERS_COLLECTION: &str = "Users";

/// MongoDB server code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(USERS_COLLECTION),
        }
    }

    /// Create the unique index on `username`. Safe to call on every start.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(index).await?;

        tracing::debug!("Ensured unique index on {}.username", USERS_COLLECTION);
        Ok(())
    }
}

/// Whether a driver error is a unique index violation
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

/// Filter and update documents for a token write keyed by `userId`
pub(crate) fn token_update(
    user_id: &str,
    access_token: &str,
    refresh_token: &str,
    updated_time: DateTime,
) -> (Document, Document) {
    let filter = doc! { "userId": user_id };
    let update = doc! {
        "$set": {
            "access_token": access_token,
            "refreshToken": refresh_token,
            "updatedTime": updated_time,
        }
    };
    (filter, update)
}

#[async_trait]
impl UserStore for UserRepository {
    async fn count_by_username(&self, username: &str) -> Result<u64, StoreError> {
        let count = self
            .collection
            .count_documents(doc! { "username": username })
            .await?;

        Ok(count)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await?;

        Ok(user)
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        match self.collection.insert_one(user).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => Err(StoreError::Duplicate(user.username.clone())),
            Err(err) => Err(err.into()),
        }
    }

    async fn update_all_tokens(
        &self,
        user_id: &str,
        access_token: &str,
        refresh_token: &str,
        updated_time: DateTime,
    ) -> Result<(), StoreError> {
        let (filter, update) = token_update(user_id, access_token, refresh_token, updated_time);

        self.collection
            .update_one(filter, update)
            .upsert(true)
            .await?;

        Ok(())
    }
}
