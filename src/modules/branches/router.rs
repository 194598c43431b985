use axum::{
    Router,
    routing::{delete, get},
};

use crate::state::AppState;

use super::controller::{add_branch, delete_branch, list_branches};

/// Branch management; the superadmin gate is applied where the router is nested.
pub fn init_branches_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_branches).post(add_branch))
        .route("/{code}", delete(delete_branch))
}
