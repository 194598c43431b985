use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mashar_core::AppError;
use mashar_models::MessageResponse;
use mashar_models::ids::TemplateId;
use mashar_models::templates::{CreateTemplateDto, PlanTemplate, UpdateTemplateDto};
use tracing::instrument;

use super::service::TemplateService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/template/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    responses(
        (status = 200, description = "Plan templates", body = Vec<PlanTemplate>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Plan templates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn list_templates(
    State(state): State<AppState>,
    user: AuthUser,
    Path(branch): Path<String>,
) -> Result<Json<Vec<PlanTemplate>>, AppError> {
    let templates = TemplateService::list_templates(state.db()?, &user.scope(), &branch).await?;
    Ok(Json(templates))
}

#[utoipa::path(
    get,
    path = "/api/template/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Plan template", body = PlanTemplate),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Template not found")
    ),
    tag = "Plan templates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn get_template(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, TemplateId)>,
) -> Result<Json<PlanTemplate>, AppError> {
    let template = TemplateService::get_template(state.db()?, &user.scope(), &branch, id).await?;
    Ok(Json(template))
}

#[utoipa::path(
    post,
    path = "/api/template/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = CreateTemplateDto,
    responses(
        (status = 201, description = "Template created", body = PlanTemplate),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    ),
    tag = "Plan templates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn add_template(
    State(state): State<AppState>,
    user: AuthUser,
    Path(branch): Path<String>,
    ValidatedJson(dto): ValidatedJson<CreateTemplateDto>,
) -> Result<(StatusCode, Json<PlanTemplate>), AppError> {
    let template = TemplateService::add_template(state.db()?, &user.scope(), &branch, dto).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

#[utoipa::path(
    put,
    path = "/api/template/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "Template ID")
    ),
    request_body = UpdateTemplateDto,
    responses(
        (status = 200, description = "Template updated", body = PlanTemplate),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Template not found"),
        (status = 409, description = "Template changed since it was loaded")
    ),
    tag = "Plan templates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn update_template(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, TemplateId)>,
    ValidatedJson(dto): ValidatedJson<UpdateTemplateDto>,
) -> Result<Json<PlanTemplate>, AppError> {
    let template =
        TemplateService::update_template(state.db()?, &user.scope(), &branch, id, dto).await?;
    Ok(Json(template))
}

#[utoipa::path(
    delete,
    path = "/api/template/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Template deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Template not found")
    ),
    tag = "Plan templates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn delete_template(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, TemplateId)>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = TemplateService::delete_template(state.db()?, &user.scope(), &branch, id).await?;
    Ok(Json(msg))
}
