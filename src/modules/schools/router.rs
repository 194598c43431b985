use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{add_school, delete_school, get_school, list_schools, update_school};

pub fn init_schools_router() -> Router<AppState> {
    Router::new()
        .route("/{branch}", get(list_schools).post(add_school))
        .route(
            "/{branch}/{id}",
            get(get_school).put(update_school).delete(delete_school),
        )
}
