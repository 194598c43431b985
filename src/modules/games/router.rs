use axum::{
    Router,
    routing::{get, post, put},
};
use mashar_config::RateLimitConfig;
use tower_governor::GovernorLayer;

use crate::state::AppState;

use super::controller::{
    clone_game, create_game, delete_game, get_game_form, get_game_status, list_games, save_game,
    start_game, stop_game, validate_vector_path, validate_vector_query,
};

pub fn init_games_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_game))
        .route("/clone", post(clone_game))
        .route("/list/{page}", get(list_games))
        .route("/form/{uid}", get(get_game_form))
        .route("/status/{uid}", get(get_game_status))
        .route("/start/{game_code}/{branch}", post(start_game))
        .route("/stop/{game_code}/{branch}", post(stop_game))
        .route("/{uid}", put(save_game).delete(delete_game))
}

/// Student-facing vector checks, behind the public limiter when enabled.
pub fn init_vector_router(rate_limit: &RateLimitConfig) -> Router<AppState> {
    let router = Router::new()
        .route("/{uid}/{team}/{index}", get(validate_vector_query))
        .route(
            "/{uid}/{team}/{index}/{size}/{angle}",
            get(validate_vector_path),
        );

    match rate_limit.public_governor_config() {
        Some(config) => router.layer(GovernorLayer::new(config)),
        None => router,
    }
}
