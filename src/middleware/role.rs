//! Role gates applied to whole routers with `middleware::from_fn_with_state`.
//!
//! ```rust,ignore
//! Router::new()
//!     .nest("/mng", management_router())
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_superadmin));
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mashar_auth::Role;
use mashar_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Lets the request through when the bearer token carries one of `allowed`.
pub async fn require_roles(
    state: &AppState,
    req: Request,
    next: Next,
    allowed: &[Role],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let user = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, state).await?;

    if !user.has_any_role(allowed) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {}",
            allowed
                .iter()
                .map(Role::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

pub async fn require_superadmin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    require_roles(&state, req, next, &[Role::SuperAdmin])
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(&state, req, next, &[Role::Admin])
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

pub async fn require_teacher(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(&state, req, next, &[Role::Admin, Role::Teacher])
        .await
        .unwrap_or_else(IntoResponse::into_response)
}
