use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mashar_core::AppError;
use mashar_models::MessageResponse;
use mashar_models::classes::{Class, ClassDto, ClassQuery, ClassSummary};
use mashar_models::ids::ClassId;
use tracing::instrument;

use super::service::ClassService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/class/{branch}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ClassQuery
    ),
    responses(
        (status = 200, description = "Classes", body = Vec<ClassSummary>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn list_classes(
    State(state): State<AppState>,
    user: AuthUser,
    Path(branch): Path<String>,
    Query(query): Query<ClassQuery>,
) -> Result<Json<Vec<ClassSummary>>, AppError> {
    let classes =
        ClassService::list_classes(state.db()?, &user.scope(), &branch, query.teacher.as_deref())
            .await?;
    Ok(Json(classes))
}

#[utoipa::path(
    get,
    path = "/api/class/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Class", body = Class),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn get_class(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, ClassId)>,
) -> Result<Json<Class>, AppError> {
    let class = ClassService::get_class(state.db()?, &user.scope(), &branch, id).await?;
    Ok(Json(class))
}

#[utoipa::path(
    post,
    path = "/api/class/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = ClassDto,
    responses(
        (status = 201, description = "Class created", body = Class),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation error")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn add_class(
    State(state): State<AppState>,
    user: AuthUser,
    Path(branch): Path<String>,
    ValidatedJson(dto): ValidatedJson<ClassDto>,
) -> Result<(StatusCode, Json<Class>), AppError> {
    let class = ClassService::add_class(state.db()?, &user.scope(), &branch, dto).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    put,
    path = "/api/class/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "Class ID")
    ),
    request_body = ClassDto,
    responses(
        (status = 200, description = "Class updated", body = Class),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn update_class(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, ClassId)>,
    ValidatedJson(dto): ValidatedJson<ClassDto>,
) -> Result<Json<Class>, AppError> {
    let class = ClassService::update_class(state.db()?, &user.scope(), &branch, id, dto).await?;
    Ok(Json(class))
}

#[utoipa::path(
    delete,
    path = "/api/class/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Class deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn delete_class(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, ClassId)>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = ClassService::delete_class(state.db()?, &user.scope(), &branch, id).await?;
    Ok(Json(msg))
}
