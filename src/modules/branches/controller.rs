use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mashar_core::AppError;
use mashar_models::MessageResponse;
use mashar_models::branches::{Branch, BranchWithUsage, CreateBranchDto};
use tracing::instrument;

use super::service::BranchService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/mng/branch",
    responses(
        (status = 200, description = "All branches with usage flag", body = Vec<BranchWithUsage>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Branches",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_branches(
    State(state): State<AppState>,
) -> Result<Json<Vec<BranchWithUsage>>, AppError> {
    let branches = BranchService::list_branches(state.db()?).await?;
    Ok(Json(branches))
}

#[utoipa::path(
    post,
    path = "/api/mng/branch",
    request_body = CreateBranchDto,
    responses(
        (status = 201, description = "Branch created", body = Branch),
        (status = 400, description = "Branch code already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation error")
    ),
    tag = "Branches",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn add_branch(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateBranchDto>,
) -> Result<(StatusCode, Json<Branch>), AppError> {
    let branch = BranchService::add_branch(state.db()?, dto).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

#[utoipa::path(
    delete,
    path = "/api/mng/branch/{code}",
    params(("code" = String, Path, description = "Branch code")),
    responses(
        (status = 200, description = "Branch deleted", body = MessageResponse),
        (status = 400, description = "Branch is in use"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Branch not found")
    ),
    tag = "Branches",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_branch(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = BranchService::delete_branch(state.db()?, &code).await?;
    Ok(Json(msg))
}
