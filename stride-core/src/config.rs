use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// Connection settings for the local store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub foreign_keys: bool,
    pub wal: bool,
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            foreign_keys: true,
            wal: true,
            busy_timeout: Duration::from_millis(5000),
        }
    }

    /// Private in-memory database. Pinned to one connection since every
    /// sqlite memory connection is its own database.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            foreign_keys: true,
            wal: false,
            busy_timeout: Duration::from_millis(5000),
        }
    }

    /// Reads `DATABASE_URL` and the optional `STRIDE_MAX_CONNECTIONS`.
    pub fn from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL")
            .context("DATABASE_URL must be specified or present in the environment")?;
        let mut config = Self::new(url);

        if let Ok(raw) = env::var("STRIDE_MAX_CONNECTIONS") {
            config.max_connections = raw
                .parse()
                .with_context(|| format!("invalid STRIDE_MAX_CONNECTIONS: {raw}"))?;
        }

        Ok(config)
    }

    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_is_single_connection() {
        let config = StoreConfig::in_memory();
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 1);
        assert!(!config.wal);
    }

    #[test]
    fn file_config_defaults() {
        let config = StoreConfig::new("sqlite://stride.db").with_foreign_keys(false);
        assert!(!config.is_in_memory());
        assert!(!config.foreign_keys);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }
}
