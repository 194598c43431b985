use axum::{
    Router,
    routing::{get, post},
};
use mashar_config::RateLimitConfig;
use tower_governor::GovernorLayer;

use crate::state::AppState;

use super::controller::{login_user, me};

pub fn init_auth_router(rate_limit: &RateLimitConfig) -> Router<AppState> {
    let login = Router::new().route("/login", post(login_user));
    let login = match rate_limit.auth_governor_config() {
        Some(config) => login.layer(GovernorLayer::new(config)),
        None => login,
    };

    Router::new().route("/me", get(me)).merge(login)
}
