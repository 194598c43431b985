use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mashar_core::AppError;
use mashar_models::MessageResponse;
use mashar_models::holidays::{CloneCalendarDto, HolidayCalendar, HolidayCalendarDto};
use mashar_models::ids::CalendarId;
use tracing::instrument;

use super::service::HolidayService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/holiday/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    responses(
        (status = 200, description = "Holiday calendars", body = Vec<HolidayCalendar>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Holidays",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn list_calendars(
    State(state): State<AppState>,
    user: AuthUser,
    Path(branch): Path<String>,
) -> Result<Json<Vec<HolidayCalendar>>, AppError> {
    let calendars = HolidayService::list_calendars(state.db()?, &user.scope(), &branch).await?;
    Ok(Json(calendars))
}

#[utoipa::path(
    get,
    path = "/api/holiday/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "Calendar ID")
    ),
    responses(
        (status = 200, description = "Holiday calendar", body = HolidayCalendar),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Calendar not found")
    ),
    tag = "Holidays",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn get_calendar(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, CalendarId)>,
) -> Result<Json<HolidayCalendar>, AppError> {
    let calendar = HolidayService::get_calendar(state.db()?, &user.scope(), &branch, id).await?;
    Ok(Json(calendar))
}

#[utoipa::path(
    post,
    path = "/api/holiday/{branch}",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = HolidayCalendarDto,
    responses(
        (status = 201, description = "Calendar created", body = HolidayCalendar),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    ),
    tag = "Holidays",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn add_calendar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(branch): Path<String>,
    ValidatedJson(dto): ValidatedJson<HolidayCalendarDto>,
) -> Result<(StatusCode, Json<HolidayCalendar>), AppError> {
    let calendar = HolidayService::add_calendar(state.db()?, &user.scope(), &branch, dto).await?;
    Ok((StatusCode::CREATED, Json(calendar)))
}

#[utoipa::path(
    post,
    path = "/api/holiday/{branch}/clone",
    params(("branch" = String, Path, description = "Branch code")),
    request_body = CloneCalendarDto,
    responses(
        (status = 201, description = "Calendar copied", body = HolidayCalendar),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Calendar not found")
    ),
    tag = "Holidays",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn clone_calendar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(branch): Path<String>,
    Json(dto): Json<CloneCalendarDto>,
) -> Result<(StatusCode, Json<HolidayCalendar>), AppError> {
    let calendar =
        HolidayService::clone_calendar(state.db()?, &user.scope(), &branch, dto.id).await?;
    Ok((StatusCode::CREATED, Json(calendar)))
}

#[utoipa::path(
    put,
    path = "/api/holiday/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "Calendar ID")
    ),
    request_body = HolidayCalendarDto,
    responses(
        (status = 200, description = "Calendar updated", body = HolidayCalendar),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Calendar not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Holidays",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto))]
pub async fn update_calendar(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, CalendarId)>,
    ValidatedJson(dto): ValidatedJson<HolidayCalendarDto>,
) -> Result<Json<HolidayCalendar>, AppError> {
    let calendar =
        HolidayService::update_calendar(state.db()?, &user.scope(), &branch, id, dto).await?;
    Ok(Json(calendar))
}

#[utoipa::path(
    delete,
    path = "/api/holiday/{branch}/{id}",
    params(
        ("branch" = String, Path, description = "Branch code"),
        ("id" = String, Path, description = "Calendar ID")
    ),
    responses(
        (status = 200, description = "Calendar deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Calendar not found")
    ),
    tag = "Holidays",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user))]
pub async fn delete_calendar(
    State(state): State<AppState>,
    user: AuthUser,
    Path((branch, id)): Path<(String, CalendarId)>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = HolidayService::delete_calendar(state.db()?, &user.scope(), &branch, id).await?;
    Ok(Json(msg))
}
