use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use mashar_auth::{Claims, Role, verify_token};
use mashar_core::AppError;

use crate::middleware::scope::ScopeContext;
use crate::state::AppState;

/// Claims of a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn username(&self) -> &str {
        self.0.username()
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn branch(&self) -> &str {
        &self.0.branch
    }

    pub fn is_superadmin(&self) -> bool {
        self.0.is_superadmin()
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.0.role.satisfies_any(roles)
    }

    pub fn scope(&self) -> ScopeContext {
        ScopeContext::from(&self.0)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            <TypedHeader<Authorization<Bearer>> as FromRequestParts<AppState>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::unauthorized("Missing or invalid authorization header"))?;

        let claims = verify_token(bearer.token(), &state.jwt_config)?;
        Ok(AuthUser(claims))
    }
}

/// Public endpoints that show more to signed-in users: no header yields
/// `None`, a bad token is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(axum::http::header::AUTHORIZATION) {
            return Ok(None);
        }
        <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}

/// Declares an extractor that authenticates and then requires one of `roles`.
macro_rules! require_role {
    ($name:ident, [$($role:expr),+], $message:literal) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user =
                    <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
                        .await?;
                if !user.has_any_role(&[$($role),+]) {
                    return Err(AppError::forbidden($message));
                }
                Ok($name(user))
            }
        }
    };
}

require_role!(
    RequireSuperAdmin,
    [Role::SuperAdmin],
    "Access denied. Superadmin privileges required."
);
require_role!(
    RequireAdmin,
    [Role::Admin],
    "Access denied. Administrator privileges required."
);
require_role!(
    RequireTeacher,
    [Role::Admin, Role::Teacher],
    "Access denied. Teacher privileges required."
);
