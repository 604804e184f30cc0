//! Database client management
//!
//! This module provides client setup for MongoDB. A client is created once
//! at startup and handed to the repositories; it is never a global.

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use std::time::Duration;

use crate::core::config::Config;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Connection URL (e.g., mongodb://localhost:27017)
    pub uri: String,
    /// Database name
    pub database: String,
    /// Connection and server selection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Maximum number of pooled connections
    pub max_pool_size: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            uri: crate::core::config::DEFAULT_MONGODB_URI.to_string(),
            database: crate::core::config::DEFAULT_DATABASE_NAME.to_string(),
            connect_timeout_secs: 10,
            max_pool_size: 10,
        }
    }
}

impl DbConfig {
    /// Create config from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            uri: config.mongodb_uri.clone(),
            database: config.database_name.clone(),
            ..Default::default()
        }
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Set max pool size
    pub fn max_pool_size(mut self, max: u32) -> Self {
        self.max_pool_size = max;
        self
    }
}

/// Database errors
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Invalid database URI: {0}")]
    InvalidUri(#[source] mongodb::error::Error),

    #[error("Failed to connect to database: {0}")]
    ConnectionError(#[from] mongodb::error::Error),
}

/// Connect to MongoDB and verify the server answers a ping
pub async fn connect(config: &DbConfig) -> Result<Database, DbError> {
    let mut options = ClientOptions::parse(&config.uri)
        .await
        .map_err(DbError::InvalidUri)?;

    let timeout = Duration::from_secs(config.connect_timeout_secs);
    options.connect_timeout = Some(timeout);
    options.server_selection_timeout = Some(timeout);
    options.max_pool_size = Some(config.max_pool_size);
    options.app_name = Some("inventory".to_string());

    let client = Client::with_options(options)?;
    let database = client.database(&config.database);

    health_check(&database).await?;

    tracing::info!(database = %config.database, "Connected to MongoDB");
    Ok(database)
}

/// Check database health
pub async fn health_check(database: &Database) -> Result<(), DbError> {
    database.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}
