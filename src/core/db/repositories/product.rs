//! Product repository for MongoDB

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{doc, oid::ObjectId},
    options::ReturnDocument,
};

use crate::core::db::models::Product;
use crate::core::db::repositories::{ProductStore, StoreError};

/// Collection holding product documents
pub const PRODUCTS_COLLECTION: &str = "Products";

/// Product repository for database operations
#[derive(Clone)]
pub struct ProductRepository {
    collection: Collection<Product>,
}

impl ProductRepository {
    /// Create a new product repository
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(PRODUCTS_COLLECTION),
        }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }

    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        self.collection.insert_one(product).await?;
        Ok(())
    }

    async fn set_quantity(
        &self,
        id: ObjectId,
        quantity: i64,
    ) -> Result<Option<Product>, StoreError> {
        let product = self
            .collection
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": { "quantity": quantity } },
            )
            .return_document(ReturnDocument::After)
            .await?;

        Ok(product)
    }
}
