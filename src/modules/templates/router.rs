use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    add_template, delete_template, get_template, list_templates, update_template,
};

pub fn init_templates_router() -> Router<AppState> {
    Router::new()
        .route("/{branch}", get(list_templates).post(add_template))
        .route(
            "/{branch}/{id}",
            get(get_template).put(update_template).delete(delete_template),
        )
}
