//! Configuration loading and repository wiring.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `USE_PERSISTENT_STORES` | `false` | Use Postgres instead of the in-memory repository |
//! | `DATABASE_URL` | none | Postgres connection string, required when persistent |

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use boxoffice_ticketing::EventRepository;

use crate::repository::{InMemoryEventRepository, PostgresEventRepository};

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Infrastructure configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InfraConfig {
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
}

impl InfraConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup` (environment-like key access).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_persistent_stores = match lookup("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => raw.trim().parse::<bool>().map_err(|_| ConfigError::Invalid {
                name: "USE_PERSISTENT_STORES",
                value: raw,
            })?,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            use_persistent_stores,
            database_url,
        })
    }
}

/// Build the repository selected by `config`.
///
/// The persistent variant connects to Postgres and runs the schema migration.
pub async fn connect_repository(config: &InfraConfig) -> anyhow::Result<Arc<dyn EventRepository>> {
    if !config.use_persistent_stores {
        tracing::info!("using in-memory event repository");
        return Ok(InMemoryEventRepository::arc());
    }

    let database_url = config
        .database_url
        .as_deref()
        .ok_or(ConfigError::Missing("DATABASE_URL"))?;

    let pool = PgPool::connect(database_url)
        .await
        .context("failed to connect to Postgres")?;

    let repository = PostgresEventRepository::new(pool);
    repository
        .migrate()
        .await
        .context("failed to migrate event repository schema")?;

    tracing::info!("using Postgres event repository");
    Ok(Arc::new(repository))
}
