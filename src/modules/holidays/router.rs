use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    add_calendar, clone_calendar, delete_calendar, get_calendar, list_calendars, update_calendar,
};

pub fn init_holidays_router() -> Router<AppState> {
    Router::new()
        .route("/{branch}", get(list_calendars).post(add_calendar))
        .route("/{branch}/clone", post(clone_calendar))
        .route(
            "/{branch}/{id}",
            get(get_calendar).put(update_calendar).delete(delete_calendar),
        )
}
