use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{add_class, delete_class, get_class, list_classes, update_class};

pub fn init_classes_router() -> Router<AppState> {
    Router::new()
        .route("/{branch}", get(list_classes).post(add_class))
        .route(
            "/{branch}/{id}",
            get(get_class).put(update_class).delete(delete_class),
        )
}
