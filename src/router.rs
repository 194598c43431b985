use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use mashar_observability::{logging_middleware, metrics_middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::middleware::role::{require_admin, require_superadmin, require_teacher};
use crate::modules::auth::init_auth_router;
use crate::modules::branches::init_branches_router;
use crate::modules::classes::init_classes_router;
use crate::modules::exams::init_exams_router;
use crate::modules::games::{init_games_router, init_vector_router};
use crate::modules::health::init_health_router;
use crate::modules::holidays::init_holidays_router;
use crate::modules::lessons::init_lessons_router;
use crate::modules::playlists::init_playlists_router;
use crate::modules::schools::init_schools_router;
use crate::modules::templates::init_templates_router;
use crate::modules::users::init_users_router;
use crate::state::AppState;

/// Staff-only planning resources share the teacher gate.
fn planning_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/school", init_schools_router())
        .nest("/class", init_classes_router())
        .nest("/template", init_templates_router())
        .nest("/exam", init_exams_router())
        .nest("/holiday", init_holidays_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_teacher))
}

pub fn init_router(state: AppState) -> Router {
    let rate_limit = &state.rate_limit_config;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router(rate_limit))
                .nest("/user", init_users_router())
                .nest(
                    "/mng/branch",
                    init_branches_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_superadmin,
                    )),
                )
                .nest("/game", init_games_router())
                .nest("/vector", init_vector_router(rate_limit))
                .nest("/lsn", init_lessons_router(rate_limit))
                .nest(
                    "/playlist",
                    init_playlists_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest("/health", init_health_router())
                .merge(planning_router(&state)),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
