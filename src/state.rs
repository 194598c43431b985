use anyhow::Context;
use mashar_config::{CorsConfig, JwtConfig, ListConfig, RateLimitConfig};
use mashar_core::AppError;
use mashar_db::{ConnectionState, PgPool};

use crate::utils::messages;

#[derive(Clone, Debug)]
pub struct AppState {
    pool: PgPool,
    pub connection: ConnectionState,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub lists: ListConfig,
}

impl AppState {
    pub fn new(pool: PgPool, connection: ConnectionState) -> Self {
        Self {
            pool,
            connection,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            rate_limit_config: RateLimitConfig::from_env(),
            lists: ListConfig::from_env(),
        }
    }

    /// The pool, or 503 while the database is marked unreachable.
    pub fn db(&self) -> Result<&PgPool, AppError> {
        if self.connection.is_connected() {
            Ok(&self.pool)
        } else {
            Err(AppError::service_unavailable(messages::DATABASE_UNAVAILABLE))
        }
    }

    /// The pool regardless of connection state, for health probes.
    pub fn raw_pool(&self) -> &PgPool {
        &self.pool
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let (pool, connection) = mashar_db::connect(&database_url).await?;
    Ok(AppState::new(pool, connection))
}
