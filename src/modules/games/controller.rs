use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mashar_core::{AppError, PageRequest};
use mashar_models::BranchQuery;
use mashar_models::MessageResponse;
use mashar_models::games::{
    CloneGameDto, CreateGameDto, GameCreatedResponse, GameForm, GameStatusView, GameWithStatus,
    PaginatedGamesResponse, SaveGameDto, VectorQuery, VectorResult,
};
use tracing::instrument;

use super::service::{GameService, VectorService};
use super::store::PgGameStore;
use super::vector::VectorError;
use crate::middleware::auth::{RequireAdmin, RequireTeacher};
use crate::state::AppState;
use crate::utils::messages;
use crate::validator::ValidatedJson;

impl IntoResponse for VectorError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            VectorError::EmptyForm | VectorError::UnknownTeam(_) | VectorError::UnknownStage(_) => {
                (StatusCode::OK, VectorResult::error(messages::VECTOR_EMPTY_FORM))
            }
            VectorError::NoSuchGame(_) => {
                (StatusCode::NOT_FOUND, VectorResult::error(messages::NO_SUCH_GAME))
            }
            VectorError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                VectorResult::error(messages::ACTION_FAILED),
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[utoipa::path(
    get,
    path = "/api/game/list/{page}",
    params(
        ("page" = i64, Path, description = "1-based page number"),
        BranchQuery
    ),
    responses(
        (status = 200, description = "Games of the branch", body = PaginatedGamesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Games",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn list_games(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Path(page): Path<i64>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<PaginatedGamesResponse>, AppError> {
    let scope = user.scope().list_scope(query.branch.as_deref());
    let page = PageRequest::new(page, state.lists.games_per_page);
    let games = GameService::list_games(state.db()?, scope, page).await?;
    Ok(Json(games))
}

#[utoipa::path(
    get,
    path = "/api/game/form/{uid}",
    params(("uid" = String, Path, description = "Game uid")),
    responses(
        (status = 200, description = "Edit-form view of the game", body = GameForm),
        (status = 404, description = "Game not found")
    ),
    tag = "Games"
)]
#[instrument(skip(state))]
pub async fn get_game_form(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<GameForm>, AppError> {
    let form = GameService::get_game_form(state.db()?, &uid).await?;
    Ok(Json(form))
}

#[utoipa::path(
    get,
    path = "/api/game/status/{uid}",
    params(("uid" = String, Path, description = "Game uid")),
    responses(
        (status = 200, description = "Game and its live status", body = GameWithStatus),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Game not found")
    ),
    tag = "Games",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn get_game_status(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Path(uid): Path<String>,
) -> Result<Json<GameWithStatus>, AppError> {
    let status = GameService::get_game_status(state.db()?, &user.scope(), &uid).await?;
    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/game/start/{game_code}/{branch}",
    params(
        ("game_code" = String, Path, description = "Game uid"),
        ("branch" = String, Path, description = "Branch code")
    ),
    responses(
        (status = 200, description = "Game started", body = GameStatusView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Branch not accessible"),
        (status = 404, description = "Game not found")
    ),
    tag = "Games",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn start_game(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Path((game_code, branch)): Path<(String, String)>,
) -> Result<Json<GameStatusView>, AppError> {
    let status = GameService::start_game(state.db()?, &user.scope(), &game_code, &branch).await?;
    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/game/stop/{game_code}/{branch}",
    params(
        ("game_code" = String, Path, description = "Game uid"),
        ("branch" = String, Path, description = "Branch code")
    ),
    responses(
        (status = 200, description = "Game stopped", body = GameStatusView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Branch not accessible"),
        (status = 404, description = "Game not found")
    ),
    tag = "Games",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn stop_game(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Path((game_code, branch)): Path<(String, String)>,
) -> Result<Json<GameStatusView>, AppError> {
    let status = GameService::stop_game(state.db()?, &user.scope(), &game_code, &branch).await?;
    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/game",
    request_body = CreateGameDto,
    responses(
        (status = 201, description = "Game created", body = GameCreatedResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation error")
    ),
    tag = "Games",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn create_game(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateGameDto>,
) -> Result<(StatusCode, Json<GameCreatedResponse>), AppError> {
    let created = GameService::create_game(state.db()?, &user.scope(), dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/game/{uid}",
    params(("uid" = String, Path, description = "Game uid")),
    request_body = SaveGameDto,
    responses(
        (status = 200, description = "Game saved", body = GameForm),
        (status = 400, description = "Malformed riddle data"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Game not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Games",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn save_game(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(uid): Path<String>,
    ValidatedJson(dto): ValidatedJson<SaveGameDto>,
) -> Result<Json<GameForm>, AppError> {
    let form = GameService::save_game(state.db()?, &user.scope(), &uid, dto).await?;
    Ok(Json(form))
}

#[utoipa::path(
    post,
    path = "/api/game/clone",
    request_body = CloneGameDto,
    responses(
        (status = 201, description = "Game cloned", body = GameCreatedResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Source game not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Games",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn clone_game(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CloneGameDto>,
) -> Result<(StatusCode, Json<GameCreatedResponse>), AppError> {
    let created = GameService::clone_game(state.db()?, &user.scope(), dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    delete,
    path = "/api/game/{uid}",
    params(("uid" = String, Path, description = "Game uid")),
    responses(
        (status = 200, description = "Game deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Game not found")
    ),
    tag = "Games",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn delete_game(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(uid): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = GameService::delete_game(state.db()?, &user.scope(), &uid).await?;
    Ok(Json(msg))
}

async fn check_vector(
    state: &AppState,
    uid: &str,
    team: &str,
    index: &str,
    size: Option<&str>,
    angle: Option<&str>,
) -> Result<Json<VectorResult>, VectorError> {
    let pool = state
        .db()
        .map_err(|e| VectorError::Store(e.error.to_string()))?;
    let store = PgGameStore::new(pool.clone());

    let outcome = VectorService::validate(&store, uid, team, index, size, angle).await?;
    let result = if outcome.success {
        VectorResult::info(outcome.message)
    } else {
        VectorResult::error(outcome.message)
    };
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/vector/{uid}/{team}/{index}/{size}/{angle}",
    params(
        ("uid" = String, Path, description = "Game uid"),
        ("team" = String, Path, description = "red, blue or green"),
        ("index" = String, Path, description = "Stage number, 1 to 5"),
        ("size" = String, Path, description = "Vector size"),
        ("angle" = String, Path, description = "Vector angle in degrees")
    ),
    responses(
        (status = 200, description = "Check result; errMsg set for a wrong or incomplete vector", body = VectorResult),
        (status = 404, description = "No such active game", body = VectorResult),
        (status = 500, description = "Attempt could not be stored", body = VectorResult)
    ),
    tag = "Vector"
)]
#[instrument(skip(state))]
pub async fn validate_vector_path(
    State(state): State<AppState>,
    Path((uid, team, index, size, angle)): Path<(String, String, String, String, String)>,
) -> Result<Json<VectorResult>, VectorError> {
    check_vector(&state, &uid, &team, &index, Some(&size), Some(&angle)).await
}

#[utoipa::path(
    get,
    path = "/api/vector/{uid}/{team}/{index}",
    params(
        ("uid" = String, Path, description = "Game uid"),
        ("team" = String, Path, description = "red, blue or green"),
        ("index" = String, Path, description = "Stage number, 1 to 5"),
        VectorQuery
    ),
    responses(
        (status = 200, description = "Check result; errMsg set for a wrong or incomplete vector", body = VectorResult),
        (status = 404, description = "No such active game", body = VectorResult),
        (status = 500, description = "Attempt could not be stored", body = VectorResult)
    ),
    tag = "Vector"
)]
#[instrument(skip(state))]
pub async fn validate_vector_query(
    State(state): State<AppState>,
    Path((uid, team, index)): Path<(String, String, String)>,
    Query(query): Query<VectorQuery>,
) -> Result<Json<VectorResult>, VectorError> {
    check_vector(
        &state,
        &uid,
        &team,
        &index,
        query.vector_size.as_deref(),
        query.vector_angle.as_deref(),
    )
    .await
}
