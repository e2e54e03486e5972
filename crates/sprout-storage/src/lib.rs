//! Sprout Storage: relational persistence.
//!
//! # Modules
//!
//! - [`schema`]: Idempotent table and index provisioning
//! - [`traits`]: One store trait per entity
//! - [`pg`]: Postgres implementations over `sqlx`
//! - [`memory`]: In-memory doubles for tests

#![doc = include_str!("../README.md")]

pub mod memory;
pub mod pg;
pub mod schema;
pub mod traits;

use sprout_core::{Error, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

// Re-export key types at crate root for convenience
pub use memory::{
    MemoryBackend, MemoryChildStore, MemoryNotificationStore, MemoryProfileStore,
    MemorySubscriptionStore, MemoryTelemetryStore,
};
pub use pg::{
    PgChildStore, PgNotificationStore, PgProfileStore, PgSubscriptionStore, PgTelemetryStore,
};
pub use traits::{
    ChildStore, NotificationStore, ProfileStore, SubscriptionStore, TelemetryStore,
};

/// Shared Postgres handle.
///
/// Wraps the connection pool; per-entity stores clone the pool out of it.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to Postgres.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| Error::storage(format!("failed to connect to postgres: {e}")))?;

        Ok(Self { pool })
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create all tables and indexes if they do not exist.
    pub async fn provision(&self) -> Result<()> {
        schema::provision(&self.pool).await
    }
}
