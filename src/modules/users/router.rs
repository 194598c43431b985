use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    change_password, change_role, count_by_branch, delete_user, get_user, list_by_group,
    list_teachers, list_users, register_user, save_lesson_list, save_user, set_lessons,
};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_user).put(save_user))
        .route("/password", put(change_password))
        .route("/role", put(change_role))
        .route("/lessons", put(set_lessons))
        .route("/lessons/list", put(save_lesson_list))
        .route("/list/{page}", get(list_users))
        .route("/teachers/{branch}", get(list_teachers))
        .route("/count/{branch}", get(count_by_branch))
        .route("/group/{branch}/{group}", get(list_by_group))
        .route("/{branch}/{username}", get(get_user).delete(delete_user))
}
