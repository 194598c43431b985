use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mashar_core::AppError;
use mashar_models::MessageResponse;
use mashar_models::exams::{CloneExamDto, Exam, ExamDto, ExamFilter};
use mashar_models::ids::ExamId;
use tracing::instrument;

use super::service::ExamService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/exam/{branch}/year/{year}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("year" = String, Path, description = "School year")
    ),
    responses(
        (status = 200, description = "Exams of the year", body = Vec<Exam>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn list_exams(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, year)): Path<(String, String)>,
) -> Result<Json<Vec<Exam>>, AppError> {
    let exams = ExamService::list_exams(state.db()?, &user.scope(), &branch, &year).await?;
    Ok(Json(exams))
}

#[utoipa::path(
    post,
    path = "/api/exam/{branch}/filter",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = ExamFilter,
    responses(
        (status = 200, description = "Matching exams", body = Vec<Exam>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn filter_exams(
    State(state): State<AppState>,
    user: AuthUser,
    Path(branch): Path<String>,
    Json(filter): Json<ExamFilter>,
) -> Result<Json<Vec<Exam>>, AppError> {
    let exams = ExamService::filter_exams(state.db()?, &user.scope(), &branch, &filter).await?;
    Ok(Json(exams))
}

#[utoipa::path(
    get,
    path = "/api/exam/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "Exam ID")
    ),
    responses(
        (status = 200, description = "Exam", body = Exam),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Exam not found")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn get_exam(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, ExamId)>,
) -> Result<Json<Exam>, AppError> {
    let exam = ExamService::get_exam(state.db()?, &user.scope(), &branch, id).await?;
    Ok(Json(exam))
}

#[utoipa::path(
    post,
    path = "/api/exam/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = ExamDto,
    responses(
        (status = 201, description = "Exam created", body = Exam),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn add_exam(
    State(state): State<AppState>,
    user: AuthUser,
    Path(branch): Path<String>,
    ValidatedJson(dto): ValidatedJson<ExamDto>,
) -> Result<(StatusCode, Json<Exam>), AppError> {
    let exam = ExamService::add_exam(state.db()?, &user.scope(), &branch, dto).await?;
    Ok((StatusCode::CREATED, Json(exam)))
}

#[utoipa::path(
    post,
    path = "/api/exam/{branch}/clone",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = CloneExamDto,
    responses(
        (status = 201, description = "Exam copied", body = Exam),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Exam not found")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn clone_exam(
    State(state): State<AppState>,
    user: AuthUser,
    Path(branch): Path<String>,
    Json(dto): Json<CloneExamDto>,
) -> Result<(StatusCode, Json<Exam>), AppError> {
    let exam = ExamService::clone_exam(state.db()?, &user.scope(), &branch, dto.id).await?;
    Ok((StatusCode::CREATED, Json(exam)))
}

#[utoipa::path(
    put,
    path = "/api/exam/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "Exam ID")
    ),
    request_body = ExamDto,
    responses(
        (status = 200, description = "Exam updated", body = Exam),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Exam not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn update_exam(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, ExamId)>,
    ValidatedJson(dto): ValidatedJson<ExamDto>,
) -> Result<Json<Exam>, AppError> {
    let exam = ExamService::update_exam(state.db()?, &user.scope(), &branch, id, dto).await?;
    Ok(Json(exam))
}

#[utoipa::path(
    delete,
    path = "/api/exam/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "Exam ID")
    ),
    responses(
        (status = 200, description = "Exam deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Exam not found")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn delete_exam(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, ExamId)>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = ExamService::delete_exam(state.db()?, &user.scope(), &branch, id).await?;
    Ok(Json(msg))
}
