//! Persistence seam of the vector check.
//!
//! Gameplay needs three operations: look up an active game, read a run's
//! status and append one attempt to a team's log.

use async_trait::async_trait;
use mashar_db::PgPool;
use mashar_models::games::{Attempt, Game, GameStatusRecord};
use mashar_models::Team;
use sqlx::types::Json;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
#[error("game store: {0}")]
pub struct StoreError(pub String);

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError(e.to_string())
    }
}

pub(crate) const GAME_COLUMNS: &str =
    "id, uid, game_name, readable_name, branch, version, active, date, red, blue, green";
pub(crate) const STATUS_COLUMNS: &str =
    "game_code, branch_code, active, start_time, red, blue, green, version";

#[async_trait]
pub trait GameStore: Send + Sync {
    async fn find_active_game(&self, uid: &str) -> Result<Option<Game>, StoreError>;

    async fn find_status(&self, game_code: &str) -> Result<Option<GameStatusRecord>, StoreError>;

    /// Appends `attempt` to the team's log. `Ok(false)` when the game has no
    /// status record yet.
    async fn append_attempt(
        &self,
        game_code: &str,
        team: Team,
        attempt: &Attempt,
    ) -> Result<bool, StoreError>;
}

#[derive(Clone, Debug)]
pub struct PgGameStore {
    pool: PgPool,
}

impl PgGameStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameStore for PgGameStore {
    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "games"))]
    async fn find_active_game(&self, uid: &str) -> Result<Option<Game>, StoreError> {
        let game = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE uid = $1 AND active"
        ))
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(game)
    }

    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "game_statuses"))]
    async fn find_status(&self, game_code: &str) -> Result<Option<GameStatusRecord>, StoreError> {
        let status = sqlx::query_as::<_, GameStatusRecord>(&format!(
            "SELECT {STATUS_COLUMNS} FROM game_statuses WHERE game_code = $1"
        ))
        .bind(game_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(status)
    }

    /// A single UPDATE: the row lock orders concurrent submissions, so the
    /// array order is commit order.
    #[instrument(skip(self, attempt), fields(db.operation = "UPDATE", db.table = "game_statuses", team = %team))]
    async fn append_attempt(
        &self,
        game_code: &str,
        team: Team,
        attempt: &Attempt,
    ) -> Result<bool, StoreError> {
        let column = team.column();
        let result = sqlx::query(&format!(
            "UPDATE game_statuses
             SET {column} = {column} || jsonb_build_array($2::jsonb), version = version + 1
             WHERE game_code = $1"
        ))
        .bind(game_code)
        .bind(Json(attempt))
        .execute(&self.pool)
        .await?;

        debug!(rows = result.rows_affected(), "Attempt appended");
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    //! In-memory store for tests, with switchable failures.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Copy, Debug, Default)]
    pub struct FailureFlags {
        pub find_game: bool,
        pub find_status: bool,
        pub append: bool,
    }

    #[derive(Clone, Default)]
    pub struct MemoryGameStore {
        games: Arc<Mutex<HashMap<String, Game>>>,
        statuses: Arc<Mutex<HashMap<String, GameStatusRecord>>>,
        failures: FailureFlags,
    }

    impl MemoryGameStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_failures(mut self, failures: FailureFlags) -> Self {
            self.failures = failures;
            self
        }

        pub fn insert_game(&self, game: Game) {
            let mut guard = self.games.lock().expect("games mutex poisoned");
            guard.insert(game.uid.clone(), game);
        }

        pub fn insert_status(&self, status: GameStatusRecord) {
            let mut guard = self.statuses.lock().expect("statuses mutex poisoned");
            guard.insert(status.game_code.clone(), status);
        }

        pub fn attempts(&self, game_code: &str, team: Team) -> Vec<Attempt> {
            let guard = self.statuses.lock().expect("statuses mutex poisoned");
            guard
                .get(game_code)
                .map(|s| s.attempts(team).to_vec())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl GameStore for MemoryGameStore {
        async fn find_active_game(&self, uid: &str) -> Result<Option<Game>, StoreError> {
            if self.failures.find_game {
                return Err(StoreError("find game failed".to_string()));
            }
            let guard = self.games.lock().expect("games mutex poisoned");
            Ok(guard.get(uid).filter(|g| g.active).cloned())
        }

        async fn find_status(
            &self,
            game_code: &str,
        ) -> Result<Option<GameStatusRecord>, StoreError> {
            if self.failures.find_status {
                return Err(StoreError("find status failed".to_string()));
            }
            let guard = self.statuses.lock().expect("statuses mutex poisoned");
            Ok(guard.get(game_code).cloned())
        }

        async fn append_attempt(
            &self,
            game_code: &str,
            team: Team,
            attempt: &Attempt,
        ) -> Result<bool, StoreError> {
            if self.failures.append {
                return Err(StoreError("append failed".to_string()));
            }
            let mut guard = self.statuses.lock().expect("statuses mutex poisoned");
            let Some(status) = guard.get_mut(game_code) else {
                return Ok(false);
            };
            let log = match team {
                Team::Red => &mut status.red,
                Team::Blue => &mut status.blue,
                Team::Green => &mut status.green,
            };
            log.push(attempt.clone());
            status.version += 1;
            Ok(true)
        }
    }
}
