use axum::{
    Router,
    routing::{delete, get, post, put},
};
use mashar_config::RateLimitConfig;
use tower_governor::GovernorLayer;

use crate::state::AppState;

use super::controller::{
    add_form, add_group, clone_form, delete_form, delete_group, delete_registration, delete_slot,
    get_availability, get_form, list_forms, list_groups, list_registrations,
    purge_all_registrations, purge_old_registrations, register, save_form, save_group,
    save_groups, update_form_details,
};

pub fn init_lessons_router(rate_limit: &RateLimitConfig) -> Router<AppState> {
    let registration = Router::new().route("/reg/{branch}", put(register));
    let registration = match rate_limit.public_governor_config() {
        Some(config) => registration.layer(GovernorLayer::new(config)),
        None => registration,
    };

    Router::new()
        .route("/groups/{branch}", post(save_groups).put(save_group))
        .route("/groups/{branch}/add", post(add_group))
        .route("/groups/{branch}/page/{page}", get(list_groups))
        .route("/groups/{branch}/{gid}", delete(delete_group))
        .route("/avail/{branch}/{teacher}", get(get_availability))
        .route("/form/{branch}", get(list_forms).post(add_form).put(save_form))
        .route(
            "/form/{branch}/{uid}",
            get(get_form).put(update_form_details).delete(delete_form),
        )
        .route("/form/{branch}/{uid}/clone", post(clone_form))
        .route("/reglist/{branch}", post(list_registrations))
        .route("/reg/single/{id}", delete(delete_registration))
        .route(
            "/reg/all/{branch}/{group}/{datetime}/{email}",
            delete(delete_slot),
        )
        .route("/reg/superold/{branch}", delete(purge_old_registrations))
        .route("/reg/superall/{branch}", delete(purge_all_registrations))
        .merge(registration)
}
