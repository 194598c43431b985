use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mashar_core::AppError;
use mashar_models::MessageResponse;
use mashar_models::ids::SchoolId;
use mashar_models::schools::{School, SchoolDto};
use tracing::instrument;

use super::service::SchoolService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/school/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    responses(
        (status = 200, description = "Schools of the branch", body = Vec<School>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn list_schools(
    State(state): State<AppState>,
    user: AuthUser,
    Path(branch): Path<String>,
) -> Result<Json<Vec<School>>, AppError> {
    let schools = SchoolService::list_schools(state.db()?, &user.scope(), &branch).await?;
    Ok(Json(schools))
}

#[utoipa::path(
    get,
    path = "/api/school/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "School ID")
    ),
    responses(
        (status = 200, description = "School", body = School),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "School not found")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn get_school(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, SchoolId)>,
) -> Result<Json<School>, AppError> {
    let school = SchoolService::get_school(state.db()?, &user.scope(), &branch, id).await?;
    Ok(Json(school))
}

#[utoipa::path(
    post,
    path = "/api/school/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = SchoolDto,
    responses(
        (status = 201, description = "School created", body = School),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation error")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn add_school(
    State(state): State<AppState>,
    user: AuthUser,
    Path(branch): Path<String>,
    ValidatedJson(dto): ValidatedJson<SchoolDto>,
) -> Result<(StatusCode, Json<School>), AppError> {
    let school = SchoolService::add_school(state.db()?, &user.scope(), &branch, dto).await?;
    Ok((StatusCode::CREATED, Json(school)))
}

#[utoipa::path(
    put,
    path = "/api/school/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "School ID")
    ),
    request_body = SchoolDto,
    responses(
        (status = 200, description = "School updated", body = School),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "School not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn update_school(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, SchoolId)>,
    ValidatedJson(dto): ValidatedJson<SchoolDto>,
) -> Result<Json<School>, AppError> {
    let school =
        SchoolService::update_school(state.db()?, &user.scope(), &branch, id, dto).await?;
    Ok(Json(school))
}

#[utoipa::path(
    delete,
    path = "/api/school/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "School ID")
    ),
    responses(
        (status = 200, description = "School deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "School not found")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn delete_school(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, SchoolId)>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = SchoolService::delete_school(state.db()?, &user.scope(), &branch, id).await?;
    Ok(Json(msg))
}
