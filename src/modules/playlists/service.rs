use anyhow::anyhow;
use mashar_core::{AppError, PageRequest};
use mashar_db::PgPool;
use mashar_models::MessageResponse;
use mashar_models::playlists::{
    PaginatedPlaylistsResponse, Playlist, PlaylistDto, ReorderPlaylistsDto,
};
use tracing::{error, info, instrument, warn};

use crate::utils::messages;

const PLAYLIST_COLUMNS: &str = "code, topic, name, grade, ord";

fn map_duplicate(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        warn!("Duplicate playlist code");
        return AppError::bad_request(anyhow!(messages::PLAYLIST_EXISTS));
    }
    error!(error = %e, "Database error saving playlist");
    AppError::from(e)
}

pub struct PlaylistService;

impl PlaylistService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "playlists"))]
    pub async fn list_playlists(
        db: &PgPool,
        page: PageRequest,
    ) -> Result<PaginatedPlaylistsResponse, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM playlists")
            .fetch_one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error counting playlists");
                AppError::from(e)
            })?;

        let playlists = sqlx::query_as::<_, Playlist>(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists ORDER BY ord ASC, name ASC{}",
            page.sql_suffix()
        ))
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching playlists");
            AppError::from(e)
        })?;

        Ok(PaginatedPlaylistsResponse {
            data: playlists,
            meta: page.meta(total),
        })
    }

    /// Appends a playlist after the current last one.
    #[instrument(skip(db, dto), fields(playlist.code = %dto.code, db.operation = "INSERT", db.table = "playlists"))]
    pub async fn add_playlist(db: &PgPool, dto: PlaylistDto) -> Result<Playlist, AppError> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            "INSERT INTO playlists (code, topic, name, grade, ord)
             VALUES ($1, $2, $3, $4, COALESCE((SELECT MAX(ord) FROM playlists), 0) + 1)
             RETURNING {PLAYLIST_COLUMNS}"
        ))
        .bind(dto.code.trim())
        .bind(&dto.topic)
        .bind(dto.name.trim())
        .bind(&dto.grade)
        .fetch_one(db)
        .await
        .map_err(map_duplicate)?;

        info!(playlist.code = %playlist.code, order = playlist.order, "Playlist added");
        Ok(playlist)
    }

    /// Updates a playlist in place; the code itself may change.
    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "playlists"))]
    pub async fn edit_playlist(
        db: &PgPool,
        code: &str,
        dto: PlaylistDto,
    ) -> Result<Playlist, AppError> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            "UPDATE playlists SET code = $2, topic = $3, name = $4, grade = $5
             WHERE code = $1
             RETURNING {PLAYLIST_COLUMNS}"
        ))
        .bind(code)
        .bind(dto.code.trim())
        .bind(&dto.topic)
        .bind(dto.name.trim())
        .bind(&dto.grade)
        .fetch_optional(db)
        .await
        .map_err(map_duplicate)?
        .ok_or_else(|| AppError::not_found(anyhow!(messages::PLAYLIST_NOT_FOUND)))?;

        info!(playlist.code = %playlist.code, "Playlist updated");
        Ok(playlist)
    }

    /// Applies all new positions or none of them.
    #[instrument(skip(db, dto), fields(count = dto.playlists.len(), db.operation = "UPDATE", db.table = "playlists"))]
    pub async fn reorder_playlists(
        db: &PgPool,
        dto: ReorderPlaylistsDto,
    ) -> Result<Vec<Playlist>, AppError> {
        let mut tx = db.begin().await?;

        for entry in &dto.playlists {
            let result = sqlx::query("UPDATE playlists SET ord = $2 WHERE code = $1")
                .bind(&entry.code)
                .bind(entry.order)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                warn!(playlist.code = %entry.code, "Reorder names an unknown playlist");
                return Err(AppError::not_found(anyhow!(messages::PLAYLIST_NOT_FOUND)));
            }
        }

        let playlists = sqlx::query_as::<_, Playlist>(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists ORDER BY ord ASC, name ASC"
        ))
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("Playlists reordered");
        Ok(playlists)
    }

    /// Deletes a playlist and closes the gap so positions run 1..n again.
    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "playlists"))]
    pub async fn delete_playlist(db: &PgPool, code: &str) -> Result<MessageResponse, AppError> {
        let mut tx = db.begin().await?;

        let result = sqlx::query("DELETE FROM playlists WHERE code = $1")
            .bind(code)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!(messages::PLAYLIST_NOT_FOUND)));
        }

        sqlx::query(
            "UPDATE playlists p SET ord = r.position
             FROM (SELECT code, (ROW_NUMBER() OVER (ORDER BY ord ASC, name ASC))::int AS position
                   FROM playlists) r
             WHERE p.code = r.code",
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error renumbering playlists");
            AppError::from(e)
        })?;

        tx.commit().await?;

        info!(playlist.code = %code, "Playlist deleted");
        Ok(MessageResponse::new(messages::DELETED))
    }
}
