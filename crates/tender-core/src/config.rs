//! Configuration module
//!
//! Settings are read from the process environment (optionally seeded from a `.env`
//! file). Parsing goes through [`Config::from_lookup`] so any key/value source can
//! stand in for the environment.

use std::env;

use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Postgres connection settings
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub environment: String,
    pub default_page_limit: i64,
    pub max_page_limit: i64,
    pub strict_status_transitions: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("POSTGRES_CONN")
            .or_else(|| lookup("DATABASE_URL"))
            .ok_or_else(|| anyhow::anyhow!("POSTGRES_CONN or DATABASE_URL must be set"))?;

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let database = DatabaseConfig {
            url,
            max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
        };

        let default_page_limit = match lookup("DEFAULT_PAGE_LIMIT") {
            Some(v) => v
                .parse()
                .map_err(|_| anyhow::anyhow!("DEFAULT_PAGE_LIMIT must be a valid number"))?,
            None => DEFAULT_PAGE_LIMIT,
        };
        let max_page_limit = match lookup("MAX_PAGE_LIMIT") {
            Some(v) => v
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_PAGE_LIMIT must be a valid number"))?,
            None => MAX_PAGE_LIMIT,
        };

        let strict_status_transitions = lookup("STRICT_STATUS_TRANSITIONS")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        Ok(Config {
            database,
            environment,
            default_page_limit,
            max_page_limit,
            strict_status_transitions,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database.url.starts_with("postgres://")
            && !self.database.url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "POSTGRES_CONN must be a valid PostgreSQL connection string"
            ));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }

        if self.max_page_limit < 1 {
            return Err(anyhow::anyhow!("MAX_PAGE_LIMIT must be at least 1"));
        }

        if self.default_page_limit < 1 || self.default_page_limit > self.max_page_limit {
            return Err(anyhow::anyhow!(
                "DEFAULT_PAGE_LIMIT must be between 1 and MAX_PAGE_LIMIT ({})",
                self.max_page_limit
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.database.max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.database.timeout_seconds
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn default_page_limit(&self) -> i64 {
        self.default_page_limit
    }

    pub fn max_page_limit(&self) -> i64 {
        self.max_page_limit
    }

    pub fn strict_status_transitions(&self) -> bool {
        self.strict_status_transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("POSTGRES_CONN", "postgres://localhost/tender")]))
                .unwrap();
        assert_eq!(config.database_url(), "postgres://localhost/tender");
        assert_eq!(config.db_max_connections(), 20);
        assert_eq!(config.db_timeout_seconds(), 30);
        assert_eq!(config.default_page_limit(), 5);
        assert_eq!(config.max_page_limit(), 100);
        assert!(!config.strict_status_transitions());
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_url_fallback_and_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://db/tender"),
            ("APP_ENV", "prod"),
            ("DEFAULT_PAGE_LIMIT", "10"),
            ("STRICT_STATUS_TRANSITIONS", "true"),
        ]))
        .unwrap();
        assert_eq!(config.database_url(), "postgresql://db/tender");
        assert!(config.is_production());
        assert_eq!(config.default_page_limit(), 10);
        assert!(config.strict_status_transitions());
    }

    #[test]
    fn test_missing_database_url() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let config = Config::from_lookup(lookup_from(&[
            ("POSTGRES_CONN", "postgres://localhost/tender"),
            ("DEFAULT_PAGE_LIMIT", "500"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_lookup(lookup_from(&[("POSTGRES_CONN", "mysql://localhost/x")]))
            .unwrap();
        assert!(config.validate().is_err());
    }
}
