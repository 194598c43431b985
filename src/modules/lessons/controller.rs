use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use mashar_core::{AppError, PageRequest};
use mashar_models::MessageResponse;
use mashar_models::ids::RegistrationId;
use mashar_models::lessons::{
    AvailabilityResponse, FormDetailsDto, LessonFormView, LessonGroup, LessonGroupDto,
    LessonRegistration, PaginatedLessonGroupsResponse, RegisterLessonDto, RegistrationRangeDto,
    SaveFormDto, SaveLessonGroupsDto,
};
use tracing::instrument;

use super::service::{LessonFormService, LessonGroupService, RegistrationService};
use crate::middleware::auth::{AuthUser, RequireAdmin, RequireSuperAdmin, RequireTeacher};
use crate::state::AppState;
use crate::validator::ValidatedJson;

// Groups

#[utoipa::path(
    get,
    path = "/api/lsn/groups/{branch}/page/{page}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("page" = i64, Path, description = "1-based page number, 0 for all")
    ),
    responses(
        (status = 200, description = "Lesson groups", body = PaginatedLessonGroupsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn list_groups(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path((branch, page)): Path<(String, i64)>,
) -> Result<Json<PaginatedLessonGroupsResponse>, AppError> {
    let page = PageRequest::from_page_or_all(page, state.lists.lessons_per_page);
    let groups = LessonGroupService::list_groups(state.db()?, &user.scope(), &branch, page).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    post,
    path = "/api/lsn/groups/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = SaveLessonGroupsDto,
    responses(
        (status = 200, description = "Stored group list", body = Vec<LessonGroup>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn save_groups(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(branch): Path<String>,
    ValidatedJson(dto): ValidatedJson<SaveLessonGroupsDto>,
) -> Result<Json<Vec<LessonGroup>>, AppError> {
    let groups = LessonGroupService::save_all(state.db()?, &user.scope(), &branch, dto).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    put,
    path = "/api/lsn/groups/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = LessonGroupDto,
    responses(
        (status = 200, description = "Group updated", body = LessonGroup),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Group not found")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn save_group(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(branch): Path<String>,
    ValidatedJson(dto): ValidatedJson<LessonGroupDto>,
) -> Result<Json<LessonGroup>, AppError> {
    let group = LessonGroupService::save_one(state.db()?, &user.scope(), &branch, dto).await?;
    Ok(Json(group))
}

#[utoipa::path(
    post,
    path = "/api/lsn/groups/{branch}/add",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = LessonGroupDto,
    responses(
        (status = 201, description = "Group added", body = LessonGroup),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn add_group(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(branch): Path<String>,
    ValidatedJson(dto): ValidatedJson<LessonGroupDto>,
) -> Result<(StatusCode, Json<LessonGroup>), AppError> {
    let group = LessonGroupService::add_group(state.db()?, &user.scope(), &branch, dto).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    delete,
    path = "/api/lsn/groups/{branch}/{gid}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("gid" = String, Path, description = "Group id")
    ),
    responses(
        (status = 200, description = "Group deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Group not found")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn delete_group(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path((branch, gid)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = LessonGroupService::delete_group(state.db()?, &user.scope(), &branch, &gid).await?;
    Ok(Json(msg))
}

#[utoipa::path(
    get,
    path = "/api/lsn/avail/{branch}/{teacher}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("teacher" = String, Path, description = "Teacher username")
    ),
    responses(
        (status = 200, description = "Groups and the teacher's slots", body = AvailabilityResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn get_availability(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Path((branch, teacher)): Path<(String, String)>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let availability =
        LessonGroupService::availability(state.db()?, &user.scope(), &branch, &teacher).await?;
    Ok(Json(availability))
}

// Forms

#[utoipa::path(
    get,
    path = "/api/lsn/form/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    responses(
        (status = 200, description = "Forms of the branch", body = Vec<LessonFormView>),
        (status = 401, description = "Invalid token")
    ),
    tag = "Lessons"
)]
#[instrument(skip(state, user))]
pub async fn list_forms(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(branch): Path<String>,
) -> Result<Json<Vec<LessonFormView>>, AppError> {
    let viewer = user.map(|u| u.scope());
    let forms = LessonFormService::list_forms(state.db()?, viewer.as_ref(), &branch).await?;
    Ok(Json(forms))
}

#[utoipa::path(
    get,
    path = "/api/lsn/form/{branch}/{uid}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("uid" = String, Path, description = "Form uid, -1 for a blank form")
    ),
    responses(
        (status = 200, description = "Form", body = LessonFormView),
        (status = 404, description = "Form not found")
    ),
    tag = "Lessons"
)]
#[instrument(skip(state))]
pub async fn get_form(
    State(state): State<AppState>,
    Path((branch, uid)): Path<(String, String)>,
) -> Result<Json<LessonFormView>, AppError> {
    let form = LessonFormService::get_form(state.db()?, &branch, &uid).await?;
    Ok(Json(form))
}

#[utoipa::path(
    post,
    path = "/api/lsn/form/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = FormDetailsDto,
    responses(
        (status = 201, description = "Form created", body = LessonFormView),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn add_form(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(branch): Path<String>,
    ValidatedJson(dto): ValidatedJson<FormDetailsDto>,
) -> Result<(StatusCode, Json<LessonFormView>), AppError> {
    let form = LessonFormService::add_form(state.db()?, &user.scope(), &branch, dto).await?;
    Ok((StatusCode::CREATED, Json(form)))
}

#[utoipa::path(
    put,
    path = "/api/lsn/form/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = SaveFormDto,
    responses(
        (status = 200, description = "Form saved", body = LessonFormView),
        (status = 400, description = "Empty or invalid form"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Form not found")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn save_form(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(branch): Path<String>,
    ValidatedJson(dto): ValidatedJson<SaveFormDto>,
) -> Result<Json<LessonFormView>, AppError> {
    let form = LessonFormService::save_form(state.db()?, &user.scope(), &branch, dto).await?;
    Ok(Json(form))
}

#[utoipa::path(
    put,
    path = "/api/lsn/form/{branch}/{uid}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("uid" = String, Path, description = "Form uid")
    ),
    request_body = FormDetailsDto,
    responses(
        (status = 200, description = "Details updated", body = LessonFormView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Form not found")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn update_form_details(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path((branch, uid)): Path<(String, String)>,
    ValidatedJson(dto): ValidatedJson<FormDetailsDto>,
) -> Result<Json<LessonFormView>, AppError> {
    let form =
        LessonFormService::update_details(state.db()?, &user.scope(), &branch, &uid, dto).await?;
    Ok(Json(form))
}

#[utoipa::path(
    post,
    path = "/api/lsn/form/{branch}/{uid}/clone",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("uid" = String, Path, description = "Form uid")
    ),
    responses(
        (status = 201, description = "Copy created", body = LessonFormView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Form not found")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn clone_form(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path((branch, uid)): Path<(String, String)>,
) -> Result<(StatusCode, Json<LessonFormView>), AppError> {
    let form = LessonFormService::clone_form(state.db()?, &user.scope(), &branch, &uid).await?;
    Ok((StatusCode::CREATED, Json(form)))
}

#[utoipa::path(
    delete,
    path = "/api/lsn/form/{branch}/{uid}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("uid" = String, Path, description = "Form uid")
    ),
    responses(
        (status = 200, description = "Form deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Form not found")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn delete_form(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path((branch, uid)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = LessonFormService::delete_form(state.db()?, &user.scope(), &branch, &uid).await?;
    Ok(Json(msg))
}

// Registrations

#[utoipa::path(
    put,
    path = "/api/lsn/reg/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = RegisterLessonDto,
    responses(
        (status = 200, description = "Registration received", body = MessageResponse),
        (status = 400, description = "Form closed or answers invalid"),
        (status = 404, description = "Form not found"),
        (status = 429, description = "Too many requests")
    ),
    tag = "Lessons"
)]
#[instrument(skip(state, dto))]
pub async fn register(
    State(state): State<AppState>,
    Path(branch): Path<String>,
    ValidatedJson(dto): ValidatedJson<RegisterLessonDto>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = RegistrationService::register(state.db()?, &branch, dto).await?;
    Ok(Json(msg))
}

#[utoipa::path(
    post,
    path = "/api/lsn/reglist/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = RegistrationRangeDto,
    responses(
        (status = 200, description = "Registrations in range", body = Vec<LessonRegistration>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, range))]
pub async fn list_registrations(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Path(branch): Path<String>,
    Json(range): Json<RegistrationRangeDto>,
) -> Result<Json<Vec<LessonRegistration>>, AppError> {
    let ctx = user.scope();
    let teacher_email = (!ctx.is_admin()).then_some(user.0.email.as_str());
    let registrations =
        RegistrationService::list_registrations(state.db()?, &ctx, &branch, range, teacher_email)
            .await?;
    Ok(Json(registrations))
}

#[utoipa::path(
    delete,
    path = "/api/lsn/reg/single/{id}",
    params(("id" = String, Path, description = "Registration ID")),
    responses(
        (status = 200, description = "Registration deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Registration not found")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn delete_registration(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<RegistrationId>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = RegistrationService::delete_one(state.db()?, &user.scope(), id).await?;
    Ok(Json(msg))
}

#[utoipa::path(
    delete,
    path = "/api/lsn/reg/all/{branch}/{group}/{datetime}/{email}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("group" = String, Path, description = "Group id"),
        ("datetime" = String, Path, description = "Lesson date and time, RFC 3339"),
        ("email" = String, Path, description = "Teacher email")
    ),
    responses(
        (status = 200, description = "Slot cleared", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn delete_slot(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path((branch, group, datetime, email)): Path<(String, String, DateTime<Utc>, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = RegistrationService::delete_slot(
        state.db()?,
        &user.scope(),
        &branch,
        &group,
        datetime,
        &email,
    )
    .await?;
    Ok(Json(msg))
}

#[utoipa::path(
    delete,
    path = "/api/lsn/reg/superold/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    responses(
        (status = 200, description = "Past registrations deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _user))]
pub async fn purge_old_registrations(
    State(state): State<AppState>,
    RequireSuperAdmin(_user): RequireSuperAdmin,
    Path(branch): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = RegistrationService::purge(state.db()?, &branch, true).await?;
    Ok(Json(msg))
}

#[utoipa::path(
    delete,
    path = "/api/lsn/reg/superall/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    responses(
        (status = 200, description = "All registrations deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _user))]
pub async fn purge_all_registrations(
    State(state): State<AppState>,
    RequireSuperAdmin(_user): RequireSuperAdmin,
    Path(branch): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = RegistrationService::purge(state.db()?, &branch, false).await?;
    Ok(Json(msg))
}
