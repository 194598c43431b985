use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mashar_core::{AppError, PageRequest};
use mashar_models::users::{
    ChangePasswordDto, ChangeRoleDto, PaginatedUsersResponse, RegisterUserDto, SaveLessonListDto,
    SaveUserDto, SetLessonsDto, TeacherSummary, User, UserCountResponse,
};
use mashar_models::{BranchQuery, MessageResponse};
use tracing::instrument;

use super::service::UserService;
use crate::middleware::auth::{RequireAdmin, RequireSuperAdmin, RequireTeacher};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/user",
    request_body = RegisterUserDto,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Username already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation error")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<RegisterUserDto>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let created = UserService::register_user(state.db()?, &user.scope(), dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/user/list/{page}",
    params(
        ("page" = i64, Path, description = "1-based page number"),
        BranchQuery
    ),
    responses(
        (status = 200, description = "Users", body = PaginatedUsersResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(page): Path<i64>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let scope = user.scope().list_scope(query.branch.as_deref());
    let page = PageRequest::new(page, state.lists.users_per_page);
    let users = UserService::list_users(state.db()?, scope, page).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/user/{branch}/{username}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn get_user(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Path((branch, username)): Path<(String, String)>,
) -> Result<Json<User>, AppError> {
    let found = UserService::get_user(state.db()?, &user.scope(), &branch, &username).await?;
    Ok(Json(found))
}

#[utoipa::path(
    delete,
    path = "/api/user/{branch}/{username}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireSuperAdmin(user): RequireSuperAdmin,
    Path((branch, username)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = UserService::delete_user(state.db()?, &user.scope(), &branch, &username).await?;
    Ok(Json(msg))
}

/// Teachers available for a lesson group, for the public registration form
#[utoipa::path(
    get,
    path = "/api/user/group/{branch}/{group}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("group" = String, Path, description = "Lesson group id")
    ),
    responses((status = 200, description = "Teachers", body = Vec<TeacherSummary>)),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn list_by_group(
    State(state): State<AppState>,
    Path((branch, group)): Path<(String, String)>,
) -> Result<Json<Vec<TeacherSummary>>, AppError> {
    let teachers = UserService::list_by_group(state.db()?, &branch, &group).await?;
    Ok(Json(teachers))
}

#[utoipa::path(
    get,
    path = "/api/user/teachers/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    responses(
        (status = 200, description = "Teachers of the branch", body = Vec<User>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn list_teachers(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(branch): Path<String>,
) -> Result<Json<Vec<User>>, AppError> {
    let teachers = UserService::list_teachers(state.db()?, &user.scope(), &branch).await?;
    Ok(Json(teachers))
}

#[utoipa::path(
    get,
    path = "/api/user/count/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    responses(
        (status = 200, description = "Number of users", body = UserCountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn count_by_branch(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(branch): Path<String>,
) -> Result<Json<UserCountResponse>, AppError> {
    let count = UserService::count_by_branch(state.db()?, &user.scope(), &branch).await?;
    Ok(Json(count))
}

#[utoipa::path(
    put,
    path = "/api/user/password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = UserService::change_password(state.db()?, &user.scope(), dto).await?;
    Ok(Json(msg))
}

#[utoipa::path(
    put,
    path = "/api/user/role",
    request_body = ChangeRoleDto,
    responses(
        (status = 200, description = "Role changed", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only a superadmin may grant superadmin"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn change_role(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<ChangeRoleDto>,
) -> Result<Json<User>, AppError> {
    let updated = UserService::change_role(state.db()?, &user.scope(), dto).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    put,
    path = "/api/user",
    request_body = SaveUserDto,
    responses(
        (status = 200, description = "User saved", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn save_user(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<SaveUserDto>,
) -> Result<Json<User>, AppError> {
    let updated = UserService::save_user(state.db()?, &user.scope(), dto).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    put,
    path = "/api/user/lessons",
    request_body = SetLessonsDto,
    responses(
        (status = 200, description = "Lessons saved", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Teachers may only edit themselves"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn set_lessons(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    ValidatedJson(dto): ValidatedJson<SetLessonsDto>,
) -> Result<Json<User>, AppError> {
    let updated = UserService::set_lessons(state.db()?, &user.scope(), dto).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    put,
    path = "/api/user/lessons/list",
    request_body = SaveLessonListDto,
    responses(
        (status = 200, description = "Lesson lists saved", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "A user was not found; nothing saved")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn save_lesson_list(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<SaveLessonListDto>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = UserService::save_lesson_list(state.db()?, &user.scope(), dto).await?;
    Ok(Json(msg))
}
