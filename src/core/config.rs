//! Application configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling `dotenvy::dotenv()`.

use std::time::Duration;

/// Port used when `PORT` is not set
pub const DEFAULT_PORT: u16 = 8080;

/// MongoDB URI used when `MONGODB_URI` is not set
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";

/// Database name used when `DATABASE_NAME` is not set
pub const DEFAULT_DATABASE_NAME: &str = "Inventory";

/// Budget for ordinary store operations (seconds)
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 100;

/// Budget for single-document store operations (seconds)
pub const DEFAULT_STORE_QUICK_TIMEOUT_SECS: u64 = 10;

/// Longest accepted token lifetime (ten years, in hours)
pub const MAX_TOKEN_LIFETIME_HOURS: i64 = 24 * 365 * 10;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Which document store implementation to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDb),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

/// Per-operation store deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    /// Scans, inserts and multi-step account operations
    pub standard: Duration,
    /// Single-document find-and-update
    pub quick: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            standard: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
            quick: Duration::from_secs(DEFAULT_STORE_QUICK_TIMEOUT_SECS),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server listens on
    pub port: u16,

    /// Secret key for signing tokens.
    /// Missing is tolerated but every token is then signed with an empty key
    pub secret_key: Option<String>,

    /// MongoDB connection URL
    /// Example: mongodb://localhost:27017
    pub mongodb_uri: String,

    /// Database holding the `Users` and `Products` collections
    pub database_name: String,

    /// Document store implementation
    pub store_backend: StoreBackend,

    /// Store operation deadlines
    pub deadlines: Deadlines,

    /// Access token lifetime in hours
    pub access_token_hours: Option<i64>,

    /// Refresh token lifetime in hours
    pub refresh_token_hours: Option<i64>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse::<StoreBackend>().map_err(|_| ConfigError::InvalidValue {
                name: "STORE_BACKEND",
                value,
            })?,
            None => StoreBackend::MongoDb,
        };

        let deadlines = Deadlines {
            standard: Duration::from_secs(parse_or(
                &lookup,
                "STORE_TIMEOUT_SECS",
                DEFAULT_STORE_TIMEOUT_SECS,
            )?),
            quick: Duration::from_secs(parse_or(
                &lookup,
                "STORE_QUICK_TIMEOUT_SECS",
                DEFAULT_STORE_QUICK_TIMEOUT_SECS,
            )?),
        };

        Ok(Self {
            port,
            secret_key: lookup("SECRET_KEY").filter(|s| !s.is_empty()),
            mongodb_uri: lookup("MONGODB_URI").unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string()),
            database_name: lookup("DATABASE_NAME")
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
            store_backend,
            deadlines,
            access_token_hours: parse_token_hours(&lookup, "JWT_ACCESS_EXPIRATION_HOURS")?,
            refresh_token_hours: parse_token_hours(&lookup, "JWT_REFRESH_EXPIRATION_HOURS")?,
        })
    }

    /// Check if secret key is configured
    pub fn has_secret_key(&self) -> bool {
        self.secret_key.is_some()
    }

    /// Address the server binds to
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_optional<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(None),
    }
}

/// Token lifetimes must be positive and at most `MAX_TOKEN_LIFETIME_HOURS`
fn parse_token_hours<F>(lookup: &F, name: &'static str) -> Result<Option<i64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_optional::<F, i64>(lookup, name)? {
        Some(hours) if !(1..=MAX_TOKEN_LIFETIME_HOURS).contains(&hours) => {
            Err(ConfigError::InvalidValue {
                name,
                value: hours.to_string(),
            })
        }
        hours => Ok(hours),
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    Ok(parse_optional(lookup, name)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    // ========================================================================
    // Defaults
    // ========================================================================

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.secret_key.is_none());
        assert!(!config.has_secret_key());
        assert_eq!(config.mongodb_uri, DEFAULT_MONGODB_URI);
        assert_eq!(config.database_name, DEFAULT_DATABASE_NAME);
        assert_eq!(config.store_backend, StoreBackend::MongoDb);
        assert_eq!(config.deadlines, Deadlines::default());
        assert!(config.access_token_hours.is_none());
        assert!(config.refresh_token_hours.is_none());
    }

    #[test]
    fn test_listen_addr_uses_port() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "9000")])).unwrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:9000");
    }

    // ========================================================================
    // Overrides
    // ========================================================================

    #[test]
    fn test_config_with_all_fields() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "3000"),
            ("SECRET_KEY", "super-secret-key-123"),
            ("MONGODB_URI", "mongodb://db:27017"),
            ("DATABASE_NAME", "Stock"),
            ("STORE_BACKEND", "memory"),
            ("STORE_TIMEOUT_SECS", "30"),
            ("STORE_QUICK_TIMEOUT_SECS", "3"),
            ("JWT_ACCESS_EXPIRATION_HOURS", "1"),
            ("JWT_REFRESH_EXPIRATION_HOURS", "48"),
        ]))
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.secret_key.as_deref(), Some("super-secret-key-123"));
        assert_eq!(config.mongodb_uri, "mongodb://db:27017");
        assert_eq!(config.database_name, "Stock");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.deadlines.standard, Duration::from_secs(30));
        assert_eq!(config.deadlines.quick, Duration::from_secs(3));
        assert_eq!(config.access_token_hours, Some(1));
        assert_eq!(config.refresh_token_hours, Some(48));
    }

    #[test]
    fn test_empty_secret_is_treated_as_missing() {
        let config = Config::from_lookup(lookup_from(&[("SECRET_KEY", "")])).unwrap();
        assert!(!config.has_secret_key());
    }

    // ========================================================================
    // Invalid values
    // ========================================================================

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "eighty")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
    }

    #[test]
    fn test_invalid_backend_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("STORE_BACKEND", "redis")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "STORE_BACKEND",
                ..
            })
        ));
    }

    #[test]
    fn test_non_positive_token_hours_are_rejected() {
        for value in ["0", "-5"] {
            let result =
                Config::from_lookup(lookup_from(&[("JWT_ACCESS_EXPIRATION_HOURS", value)]));
            assert!(matches!(
                result,
                Err(ConfigError::InvalidValue {
                    name: "JWT_ACCESS_EXPIRATION_HOURS",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_oversized_token_hours_are_rejected() {
        let result = Config::from_lookup(lookup_from(&[(
            "JWT_REFRESH_EXPIRATION_HOURS",
            "9223372036854775807",
        )]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "JWT_REFRESH_EXPIRATION_HOURS",
                ..
            })
        ));

        let over = (MAX_TOKEN_LIFETIME_HOURS + 1).to_string();
        assert!(
            Config::from_lookup(lookup_from(&[("JWT_ACCESS_EXPIRATION_HOURS", over.as_str())]))
                .is_err()
        );
    }

    #[test]
    fn test_token_hours_at_upper_bound_are_accepted() {
        let max = MAX_TOKEN_LIFETIME_HOURS.to_string();
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_ACCESS_EXPIRATION_HOURS", "1"),
            ("JWT_REFRESH_EXPIRATION_HOURS", max.as_str()),
        ]))
        .unwrap();

        assert_eq!(config.access_token_hours, Some(1));
        assert_eq!(config.refresh_token_hours, Some(MAX_TOKEN_LIFETIME_HOURS));
    }

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!("MongoDB".parse::<StoreBackend>(), Ok(StoreBackend::MongoDb));
        assert_eq!("mongo".parse::<StoreBackend>(), Ok(StoreBackend::MongoDb));
        assert_eq!("in-memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }
}
