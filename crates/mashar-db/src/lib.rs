//! # Mashar DB
//!
//! PostgreSQL pool initialisation, embedded migrations and the shared
//! [`ConnectionState`] handed to request handlers.
//!
//! ```ignore
//! use mashar_db::{ConnectionState, init_db_pool};
//!
//! let pool = init_db_pool(&database_url).await?;
//! let connection = ConnectionState::connected();
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

pub use sqlx::PgPool;

/// Whether the database was reachable at startup (and is still believed to be).
///
/// Cloned into the application state; all clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct ConnectionState {
    connected: Arc<AtomicBool>,
}

impl ConnectionState {
    #[must_use]
    pub fn connected() -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(true)),
        }
    }

    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }
}

/// Creates the connection pool.
///
/// # Errors
///
/// Fails when the database cannot be reached within the acquire timeout.
pub async fn init_db_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    info!(max_connections, "Database pool initialised");
    Ok(pool)
}

/// Applies the migrations in `./migrations`.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations applied");
    Ok(())
}

/// Connects and migrates, reporting the outcome through a [`ConnectionState`].
///
/// A failed connection does not abort startup: the pool is created lazily so
/// the server can still answer health checks, and the state reads
/// disconnected until a later check succeeds.
pub async fn connect(database_url: &str) -> anyhow::Result<(PgPool, ConnectionState)> {
    match init_db_pool(database_url).await {
        Ok(pool) => {
            run_migrations(&pool).await?;
            Ok((pool, ConnectionState::connected()))
        }
        Err(e) => {
            warn!(error = %e, "Database unavailable at startup");
            let pool = PgPoolOptions::new()
                .acquire_timeout(Duration::from_secs(5))
                .connect_lazy(database_url)
                .context("Invalid DATABASE_URL")?;
            Ok((pool, ConnectionState::disconnected()))
        }
    }
}

/// Pings the database and updates `state` with the result.
pub async fn check_connection(pool: &PgPool, state: &ConnectionState) -> bool {
    let ok = sqlx::query("SELECT 1").execute(pool).await.is_ok();
    if ok != state.is_connected() {
        info!(connected = ok, "Database connection state changed");
    }
    state.set_connected(ok);
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disconnected() {
        assert!(!ConnectionState::default().is_connected());
    }

    #[test]
    fn test_clones_share_flag() {
        let state = ConnectionState::disconnected();
        let clone = state.clone();
        state.set_connected(true);
        assert!(clone.is_connected());
        clone.set_connected(false);
        assert!(!state.is_connected());
    }
}
