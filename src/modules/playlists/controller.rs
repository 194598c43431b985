use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mashar_core::{AppError, PageRequest};
use mashar_models::MessageResponse;
use mashar_models::playlists::{
    PaginatedPlaylistsResponse, Playlist, PlaylistDto, ReorderPlaylistsDto,
};
use tracing::instrument;

use super::service::PlaylistService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/playlist/list/{page}",
    params(("page" = i64, Path, description = "1-based page number, 0 for all")),
    responses(
        (status = 200, description = "Playlists in display order", body = PaginatedPlaylistsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Playlists",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_playlists(
    State(state): State<AppState>,
    Path(page): Path<i64>,
) -> Result<Json<PaginatedPlaylistsResponse>, AppError> {
    let page = PageRequest::from_page_or_all(page, state.lists.playlists_per_page);
    let playlists = PlaylistService::list_playlists(state.db()?, page).await?;
    Ok(Json(playlists))
}

#[utoipa::path(
    post,
    path = "/api/playlist",
    request_body = PlaylistDto,
    responses(
        (status = 201, description = "Playlist added", body = Playlist),
        (status = 400, description = "Playlist already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Playlists",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn add_playlist(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<PlaylistDto>,
) -> Result<(StatusCode, Json<Playlist>), AppError> {
    let playlist = PlaylistService::add_playlist(state.db()?, dto).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

#[utoipa::path(
    put,
    path = "/api/playlist/{code}",
    params(("code" = String, Path, description = "Current playlist code")),
    request_body = PlaylistDto,
    responses(
        (status = 200, description = "Playlist updated", body = Playlist),
        (status = 400, description = "Code taken by another playlist"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Playlist not found")
    ),
    tag = "Playlists",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn edit_playlist(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ValidatedJson(dto): ValidatedJson<PlaylistDto>,
) -> Result<Json<Playlist>, AppError> {
    let playlist = PlaylistService::edit_playlist(state.db()?, &code, dto).await?;
    Ok(Json(playlist))
}

#[utoipa::path(
    put,
    path = "/api/playlist/order",
    request_body = ReorderPlaylistsDto,
    responses(
        (status = 200, description = "Playlists in their new order", body = Vec<Playlist>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown playlist in the list")
    ),
    tag = "Playlists",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn reorder_playlists(
    State(state): State<AppState>,
    Json(dto): Json<ReorderPlaylistsDto>,
) -> Result<Json<Vec<Playlist>>, AppError> {
    let playlists = PlaylistService::reorder_playlists(state.db()?, dto).await?;
    Ok(Json(playlists))
}

#[utoipa::path(
    delete,
    path = "/api/playlist/{code}",
    params(("code" = String, Path, description = "Playlist code")),
    responses(
        (status = 200, description = "Playlist deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Playlist not found")
    ),
    tag = "Playlists",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_playlist(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let msg = PlaylistService::delete_playlist(state.db()?, &code).await?;
    Ok(Json(msg))
}
