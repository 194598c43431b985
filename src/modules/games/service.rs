use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use mashar_core::{AppError, PageRequest, generate_uid};
use mashar_db::PgPool;
use mashar_models::branches::Branch;
use mashar_models::games::{
    Attempt, CloneGameDto, CreateGameDto, Game, GameCreatedResponse, GameForm, GameStatusRecord,
    GameStatusView, GameWithStatus, PaginatedGamesResponse, SaveGameDto,
};
use mashar_models::{MessageResponse, Team};
use sqlx::types::Json;
use tracing::{debug, error, info, instrument, warn};

use super::builder::{
    INITIAL_VERSION, bump_version, default_team, game_form, game_list, team_from_form,
    without_images,
};
use super::status::{game_status, not_started};
use super::store::{GAME_COLUMNS, GameStore, PgGameStore, STATUS_COLUMNS};
use super::vector::{Submission, VectorError, check_vector, parse_stage, parse_team};
use crate::middleware::scope::{BranchScope, ScopeContext};
use crate::modules::branches::service::BranchService;
use crate::utils::messages;

pub struct GameService;

impl GameService {
    async fn branch_names(db: &PgPool) -> Result<HashMap<String, String>, AppError> {
        let branches = sqlx::query_as::<_, Branch>("SELECT code, name FROM branches")
            .fetch_all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error fetching branches");
                AppError::from(e)
            })?;
        Ok(branches.into_iter().map(|b| (b.code, b.name)).collect())
    }

    /// Game by uid, restricted to `scope`; 404 outside it.
    async fn find_game(db: &PgPool, uid: &str, scope: &BranchScope) -> Result<Game, AppError> {
        let mut where_clause = String::from(" WHERE uid = $1");
        let mut params = vec![uid.to_string()];
        scope.push_filter("branch", &mut where_clause, &mut params);

        let sql = format!("SELECT {GAME_COLUMNS} FROM games{where_clause}");
        let mut query = sqlx::query_as::<_, Game>(&sql);
        for param in params {
            query = query.bind(param);
        }

        query
            .fetch_optional(db)
            .await
            .map_err(|e| {
                error!(game.uid = %uid, error = %e, "Database error fetching game");
                AppError::from(e)
            })?
            .ok_or_else(|| AppError::not_found(anyhow!(messages::GAME_NOT_FOUND)))
    }

    fn owner_scope(ctx: &ScopeContext) -> BranchScope {
        if ctx.is_superadmin() {
            BranchScope::All
        } else {
            BranchScope::Branch(ctx.branch.clone())
        }
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "games"))]
    pub async fn list_games(
        db: &PgPool,
        scope: BranchScope,
        page: PageRequest,
    ) -> Result<PaginatedGamesResponse, AppError> {
        let mut where_clause = String::from(" WHERE 1=1");
        let mut params = Vec::new();
        scope.push_filter("branch", &mut where_clause, &mut params);

        let count_query = format!("SELECT COUNT(*) FROM games{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await.map_err(|e| {
            error!(error = %e, "Database error counting games");
            AppError::from(e)
        })?;

        let data_query = format!(
            "SELECT {GAME_COLUMNS} FROM games{where_clause}
             ORDER BY branch DESC, readable_name ASC, active DESC{}",
            page.sql_suffix()
        );
        let mut data_sql = sqlx::query_as::<_, Game>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let games = data_sql.fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error fetching games");
            AppError::from(e)
        })?;

        let uids: Vec<String> = games.iter().map(|g| g.uid.clone()).collect();
        let running: HashSet<String> = sqlx::query_scalar::<_, String>(
            "SELECT game_code FROM game_statuses WHERE active AND game_code = ANY($1)",
        )
        .bind(&uids)
        .fetch_all(db)
        .await
        .map_err(AppError::from)?
        .into_iter()
        .collect();

        let branch_names = Self::branch_names(db).await?;

        debug!(total, returned = games.len(), "Games fetched");

        Ok(PaginatedGamesResponse {
            data: game_list(&games, &branch_names, &running),
            meta: page.meta(total),
        })
    }

    /// Edit-form view; open to students, who load riddles from it.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "games"))]
    pub async fn get_game_form(db: &PgPool, uid: &str) -> Result<GameForm, AppError> {
        let game = Self::find_game(db, uid, &BranchScope::All).await?;
        let branch_name = BranchService::display_name(db, &game.branch).await?;
        Ok(game_form(&game, &branch_name))
    }

    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "game_statuses"))]
    pub async fn get_game_status(
        db: &PgPool,
        ctx: &ScopeContext,
        uid: &str,
    ) -> Result<GameWithStatus, AppError> {
        let game = Self::find_game(db, uid, &Self::owner_scope(ctx)).await?;
        let branch_name = BranchService::display_name(db, &game.branch).await?;

        let status = Self::run_status(&PgGameStore::new(db.clone()), uid).await?;

        Ok(GameWithStatus {
            game: game_form(&game, &branch_name),
            status,
        })
    }

    /// Live status of a run; a game never started reports `{started:false}`.
    pub async fn run_status(store: &dyn GameStore, uid: &str) -> Result<GameStatusView, AppError> {
        let record = store.find_status(uid).await.map_err(|e| {
            error!(game.uid = %uid, error = %e, "Failed to load game status");
            AppError::internal(e)
        })?;
        Ok(game_status(record.as_ref()))
    }

    /// Starts (or restarts) a run: attempt logs are cleared and the start
    /// time reset.
    #[instrument(skip(db, ctx), fields(db.operation = "UPSERT", db.table = "game_statuses"))]
    pub async fn start_game(
        db: &PgPool,
        ctx: &ScopeContext,
        game_code: &str,
        branch: &str,
    ) -> Result<GameStatusView, AppError> {
        ctx.authorize_branch(branch)?;
        Self::find_game(db, game_code, &BranchScope::Branch(branch.to_string())).await?;

        let record = sqlx::query_as::<_, GameStatusRecord>(&format!(
            "INSERT INTO game_statuses (game_code, branch_code, active, start_time)
             VALUES ($1, $2, TRUE, NOW())
             ON CONFLICT (game_code) DO UPDATE
             SET branch_code = EXCLUDED.branch_code, active = TRUE, start_time = NOW(),
                 red = '[]'::jsonb, blue = '[]'::jsonb, green = '[]'::jsonb,
                 version = game_statuses.version + 1
             RETURNING {STATUS_COLUMNS}"
        ))
        .bind(game_code)
        .bind(branch)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(game.uid = %game_code, error = %e, "Database error starting game");
            AppError::from(e)
        })?;

        mashar_observability::track_game_started(branch);
        info!(game.uid = %game_code, branch = %branch, "Game started");

        Ok(game_status(Some(&record)))
    }

    #[instrument(skip(db, ctx), fields(db.operation = "UPSERT", db.table = "game_statuses"))]
    pub async fn stop_game(
        db: &PgPool,
        ctx: &ScopeContext,
        game_code: &str,
        branch: &str,
    ) -> Result<GameStatusView, AppError> {
        ctx.authorize_branch(branch)?;
        Self::find_game(db, game_code, &BranchScope::Branch(branch.to_string())).await?;

        sqlx::query(
            "INSERT INTO game_statuses (game_code, branch_code, active)
             VALUES ($1, $2, FALSE)
             ON CONFLICT (game_code) DO UPDATE
             SET active = FALSE, version = game_statuses.version + 1",
        )
        .bind(game_code)
        .bind(branch)
        .execute(db)
        .await
        .map_err(|e| {
            error!(game.uid = %game_code, error = %e, "Database error stopping game");
            AppError::from(e)
        })?;

        mashar_observability::track_game_stopped(branch);
        info!(game.uid = %game_code, branch = %branch, "Game stopped");

        Ok(not_started())
    }

    async fn insert_game(
        db: &PgPool,
        name: &str,
        branch: &str,
        teams: [mashar_models::TeamData; 3],
    ) -> Result<String, AppError> {
        let uid = generate_uid();
        let [red, blue, green] = teams;

        sqlx::query(
            "INSERT INTO games (uid, game_name, readable_name, branch, version, active, date, red, blue, green)
             VALUES ($1, $1, $2, $3, $4, FALSE, NOW(), $5, $6, $7)",
        )
        .bind(&uid)
        .bind(name)
        .bind(branch)
        .bind(INITIAL_VERSION)
        .bind(Json(red))
        .bind(Json(blue))
        .bind(Json(green))
        .execute(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(game.uid = %uid, "Generated game uid already exists");
                return AppError::bad_request(anyhow!(messages::GAME_EXISTS));
            }
            error!(error = %e, "Database error creating game");
            AppError::from(e)
        })?;

        Ok(uid)
    }

    #[instrument(skip(db, ctx, dto), fields(game.name = %dto.name, db.operation = "INSERT", db.table = "games"))]
    pub async fn create_game(
        db: &PgPool,
        ctx: &ScopeContext,
        dto: CreateGameDto,
    ) -> Result<GameCreatedResponse, AppError> {
        let branch = ctx.effective_branch(dto.branch.as_deref());
        let teams = Team::ALL.map(default_team);
        let uid = Self::insert_game(db, dto.name.trim(), &branch, teams).await?;

        info!(game.uid = %uid, branch = %branch, "Game created");
        Ok(GameCreatedResponse {
            uid,
            msg: messages::GAME_CREATED.to_string(),
        })
    }

    #[instrument(skip(db, ctx, dto), fields(game.uid = %uid, db.operation = "UPDATE", db.table = "games"))]
    pub async fn save_game(
        db: &PgPool,
        ctx: &ScopeContext,
        uid: &str,
        dto: SaveGameDto,
    ) -> Result<GameForm, AppError> {
        let existing = Self::find_game(db, uid, &Self::owner_scope(ctx)).await?;

        let red = team_from_form(Team::Red, &dto.red)?;
        let blue = team_from_form(Team::Blue, &dto.blue)?;
        let green = team_from_form(Team::Green, &dto.green)?;
        let version = bump_version(&dto.version);

        let game = sqlx::query_as::<_, Game>(&format!(
            "UPDATE games
             SET readable_name = $2, active = $3, version = $4, date = NOW(),
                 red = $5, blue = $6, green = $7
             WHERE uid = $1
             RETURNING {GAME_COLUMNS}"
        ))
        .bind(uid)
        .bind(dto.readable_name.trim())
        .bind(dto.active)
        .bind(&version)
        .bind(Json(red))
        .bind(Json(blue))
        .bind(Json(green))
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(game.uid = %uid, error = %e, "Database error saving game");
            AppError::from(e)
        })?;

        info!(game.uid = %uid, version = %version, "Game saved");
        let branch_name = BranchService::display_name(db, &existing.branch).await?;
        Ok(game_form(&game, &branch_name))
    }

    /// Copies a game under a new uid. Cloning into another branch drops the
    /// riddle images, which belong to the source branch.
    #[instrument(skip(db, ctx, dto), fields(game.uid = %dto.orig_game, db.operation = "INSERT", db.table = "games"))]
    pub async fn clone_game(
        db: &PgPool,
        ctx: &ScopeContext,
        dto: CloneGameDto,
    ) -> Result<GameCreatedResponse, AppError> {
        let source = Self::find_game(db, &dto.orig_game, &Self::owner_scope(ctx)).await?;
        let branch = ctx.effective_branch(dto.new_branch.as_deref());

        let teams = if branch == source.branch {
            [source.red.0, source.blue.0, source.green.0]
        } else {
            [
                without_images(&source.red),
                without_images(&source.blue),
                without_images(&source.green),
            ]
        };
        let uid = Self::insert_game(db, dto.new_game.trim(), &branch, teams).await?;

        info!(game.uid = %uid, source = %dto.orig_game, branch = %branch, "Game cloned");
        Ok(GameCreatedResponse {
            uid,
            msg: messages::GAME_CLONED.to_string(),
        })
    }

    #[instrument(skip(db, ctx), fields(game.uid = %uid, db.operation = "DELETE", db.table = "games"))]
    pub async fn delete_game(
        db: &PgPool,
        ctx: &ScopeContext,
        uid: &str,
    ) -> Result<MessageResponse, AppError> {
        Self::find_game(db, uid, &Self::owner_scope(ctx)).await?;

        let mut tx = db.begin().await?;
        sqlx::query("DELETE FROM game_statuses WHERE game_code = $1")
            .bind(uid)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM games WHERE uid = $1")
            .bind(uid)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(game.uid = %uid, "Game deleted");
        Ok(MessageResponse::new(messages::DELETED))
    }
}

/// A checked vector: the feedback message and whether it was correct.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorOutcome {
    pub success: bool,
    pub message: &'static str,
}

pub struct VectorService;

impl VectorService {
    /// Checks a submission against the stage and records the attempt.
    ///
    /// Invalid input fails before the store is touched. A game without a
    /// status record still gets its answer; the attempt is only logged.
    #[instrument(skip(store), fields(game.uid = %uid))]
    pub async fn validate(
        store: &dyn GameStore,
        uid: &str,
        team: &str,
        index: &str,
        size: Option<&str>,
        angle: Option<&str>,
    ) -> Result<VectorOutcome, VectorError> {
        let submission = Submission::parse(size, angle)?;
        let team = parse_team(team)?;
        let stage = parse_stage(index)?;

        let game = store
            .find_active_game(uid)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load game");
                VectorError::Store(e.to_string())
            })?
            .ok_or_else(|| VectorError::NoSuchGame(uid.to_string()))?;

        let riddle = game
            .team(team)
            .riddle(stage)
            .ok_or(VectorError::UnknownStage(stage))?;

        let success = check_vector(riddle, submission);
        let attempt = if success {
            Attempt::new(stage, true, messages::ATTEMPT_CORRECT)
        } else {
            Attempt::new(stage, false, messages::ATTEMPT_BAD)
        };

        let recorded = store
            .append_attempt(&game.uid, team, &attempt)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to record attempt");
                VectorError::Store(e.to_string())
            })?;
        if !recorded {
            warn!(team = %team, stage, "Game has no status record; attempt not logged");
        }

        mashar_observability::track_vector_attempt(team.column(), success);
        debug!(team = %team, stage, success, "Vector checked");

        Ok(VectorOutcome {
            success,
            message: if success {
                messages::VECTOR_CORRECT
            } else {
                messages::VECTOR_WRONG
            },
        })
    }
}
