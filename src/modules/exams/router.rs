use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    add_exam, clone_exam, delete_exam, filter_exams, get_exam, list_exams, update_exam,
};

pub fn init_exams_router() -> Router<AppState> {
    Router::new()
        .route("/{branch}", post(add_exam))
        .route("/{branch}/filter", post(filter_exams))
        .route("/{branch}/clone", post(clone_exam))
        .route("/{branch}/year/{year}", get(list_exams))
        .route(
            "/{branch}/{id}",
            get(get_exam).put(update_exam).delete(delete_exam),
        )
}
