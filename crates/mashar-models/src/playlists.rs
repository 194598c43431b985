use mashar_core::PaginationMeta;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A YouTube playlist shown to students, ordered by `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Playlist {
    /// YouTube playlist id
    pub code: String,
    pub topic: String,
    pub name: String,
    pub grade: String,
    #[sqlx(rename = "ord")]
    pub order: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PlaylistDto {
    #[validate(length(min = 1, max = 100, message = "Playlist code is required"))]
    pub code: String,
    #[serde(default)]
    pub topic: String,
    #[validate(length(min = 1, max = 200, message = "Playlist name is required"))]
    pub name: String,
    #[serde(default)]
    pub grade: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PlaylistOrder {
    pub code: String,
    pub order: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReorderPlaylistsDto {
    pub playlists: Vec<PlaylistOrder>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedPlaylistsResponse {
    pub data: Vec<Playlist>,
    pub meta: PaginationMeta,
}
