//! Database models for the inventory service
//!
//! These structs map one-to-one onto documents in the `Users` and `Products`
//! collections. Field names are part of the storage contract and are kept
//! verbatim through `serde(rename)`.

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

// ============================================================================
// User Model
// ============================================================================

/// User document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    /// Bcrypt hash of the password
    #[serde(rename = "password")]
    pub password_hash: String,
    /// Last issued access token
    #[serde(rename = "access_token")]
    pub token: Option<String>,
    /// Last issued refresh token
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
    #[serde(rename = "createdTime")]
    pub created_time: DateTime,
    #[serde(rename = "updatedTime")]
    pub updated_time: DateTime,
    /// Hex form of `id`, used as the key for token updates
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "usercart", default)]
    pub user_cart: Vec<Product>,
}

impl User {
    /// Build a fresh user document with a new identifier and an empty cart
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let id = ObjectId::new();
        let now = DateTime::now();

        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            token: None,
            refresh_token: None,
            created_time: now,
            updated_time: now,
            user_id: id.to_hex(),
            user_cart: Vec::new(),
        }
    }
}

// ============================================================================
// Product Model
// ============================================================================

/// Product document. Also used for the snapshots held in a user's cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sku: String,
    pub image_url: String,
    pub description: String,
    pub quantity: i64,
    pub price: f64,
}

/// Product data for creation (without id)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub price: f64,
}

impl NewProduct {
    /// Attach a fresh identifier
    pub fn into_product(self) -> Product {
        Product {
            id: ObjectId::new(),
            name: self.name,
            kind: self.kind,
            sku: self.sku,
            image_url: self.image_url,
            description: self.description,
            quantity: self.quantity,
            price: self.price,
        }
    }
}

/// Product as rendered over HTTP, with the identifier as a hex string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sku: String,
    pub image_url: String,
    pub description: String,
    pub quantity: i64,
    pub price: f64,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_hex(),
            name: product.name,
            kind: product.kind,
            sku: product.sku,
            image_url: product.image_url,
            description: product.description,
            quantity: product.quantity,
            price: product.price,
        }
    }
}
