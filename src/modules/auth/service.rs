use mashar_auth::{TokenSubject, create_access_token};
use mashar_config::JwtConfig;
use mashar_core::{AppError, verify_password};
use mashar_db::PgPool;
use mashar_models::users::{LoginRequest, LoginResponse, User, UserCredentials};
use tracing::{error, info, instrument, warn};

use crate::modules::users::service::USER_COLUMNS;
use crate::utils::messages;

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config), fields(user.username = %dto.username, db.operation = "SELECT", db.table = "users"))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let username = dto.username.trim().to_lowercase();

        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT username, password, name, email, branch, role FROM users WHERE username = $1",
        )
        .bind(&username)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching credentials");
            AppError::from(e)
        })?;

        let Some(credentials) = credentials else {
            warn!("Login attempt for unknown user");
            mashar_observability::track_user_login_failure("unknown_user");
            return Err(AppError::unauthorized(messages::INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &credentials.password)? {
            warn!("Login attempt with wrong password");
            mashar_observability::track_user_login_failure("wrong_password");
            return Err(AppError::unauthorized(messages::INVALID_CREDENTIALS));
        }

        let token = create_access_token(
            &TokenSubject {
                username: &credentials.username,
                name: &credentials.name,
                email: &credentials.email,
                role: credentials.role,
                branch: &credentials.branch,
            },
            jwt_config,
        )?;
        mashar_observability::track_jwt_issued();

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(&username)
        .fetch_one(db)
        .await?;

        mashar_observability::track_user_login_success(credentials.role.as_str());
        info!(role = %credentials.role, branch = %credentials.branch, "User logged in");

        Ok(LoginResponse { token, user })
    }

    /// Fails with 401 when the user behind a still-valid token has been deleted.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn ensure_exists(db: &PgPool, username: &str) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(db)
        .await?;

        if exists {
            Ok(())
        } else {
            Err(AppError::unauthorized(messages::USER_NOT_FOUND))
        }
    }
}
