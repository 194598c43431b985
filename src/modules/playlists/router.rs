use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    add_playlist, delete_playlist, edit_playlist, list_playlists, reorder_playlists,
};

/// Playlist management; the admin gate is applied where the router is nested.
pub fn init_playlists_router() -> Router<AppState> {
    Router::new()
        .route("/", post(add_playlist))
        .route("/list/{page}", get(list_playlists))
        .route("/order", put(reorder_playlists))
        .route("/{code}", put(edit_playlist).delete(delete_playlist))
}
