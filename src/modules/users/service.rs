use anyhow::anyhow;
use mashar_auth::Role;
use mashar_core::{AppError, PageRequest, hash_password};
use mashar_db::PgPool;
use mashar_models::MessageResponse;
use mashar_models::users::{
    ChangePasswordDto, ChangeRoleDto, PaginatedUsersResponse, RegisterUserDto, SaveLessonListDto,
    SaveUserDto, SetLessonsDto, TeacherSummary, User, UserCountResponse,
};
use sqlx::types::Json;
use tracing::{debug, error, info, instrument, warn};

use crate::middleware::scope::{BranchScope, ScopeContext};
use crate::utils::messages;

pub(crate) const USER_COLUMNS: &str = "id, username, name, email, branch, role, lessons, created_at";

pub struct UserService;

impl UserService {
    fn normalize_username(username: &str) -> String {
        username.trim().to_lowercase()
    }

    /// Only a superadmin may hand out (or take away) the superadmin role.
    fn check_role_grant(ctx: &ScopeContext, target: &User, role: Role) -> Result<(), AppError> {
        let touches_superadmin = role == Role::SuperAdmin || target.role == Role::SuperAdmin;
        if touches_superadmin && !ctx.is_superadmin() {
            return Err(AppError::forbidden(messages::ONLY_SUPERADMIN_GRANTS_SUPERADMIN));
        }
        Ok(())
    }

    /// User by username, 404 when absent or outside the caller's branch.
    async fn find_user(db: &PgPool, ctx: &ScopeContext, username: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(Self::normalize_username(username))
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching user");
            AppError::from(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow!(messages::USER_NOT_FOUND)))?;

        if !ctx.is_superadmin() && user.branch != ctx.branch {
            return Err(AppError::not_found(anyhow!(messages::USER_NOT_FOUND)));
        }
        Ok(user)
    }

    #[instrument(skip(db, ctx, dto), fields(user.username = %dto.username, db.operation = "INSERT", db.table = "users"))]
    pub async fn register_user(
        db: &PgPool,
        ctx: &ScopeContext,
        dto: RegisterUserDto,
    ) -> Result<User, AppError> {
        if dto.role == Role::SuperAdmin && !ctx.is_superadmin() {
            return Err(AppError::forbidden(messages::ONLY_SUPERADMIN_GRANTS_SUPERADMIN));
        }

        let branch = ctx.effective_branch(Some(&dto.branch));
        let username = Self::normalize_username(&dto.username);
        let hashed = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password, name, email, branch, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&username)
        .bind(&hashed)
        .bind(dto.name.trim())
        .bind(dto.email.trim())
        .bind(&branch)
        .bind(dto.role.as_str())
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!("Duplicate username");
                return AppError::bad_request(anyhow!(messages::USER_EXISTS));
            }
            error!(error = %e, "Database error creating user");
            AppError::from(e)
        })?;

        mashar_observability::track_user_created(user.role.as_str());
        info!(user.id = %user.id, branch = %branch, role = %user.role, "User created");

        Ok(user)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn list_users(
        db: &PgPool,
        scope: BranchScope,
        page: PageRequest,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let mut where_clause = String::from(" WHERE 1=1");
        let mut params = Vec::new();
        scope.push_filter("branch", &mut where_clause, &mut params);

        let count_query = format!("SELECT COUNT(*) FROM users{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {USER_COLUMNS} FROM users{where_clause} ORDER BY branch DESC, name ASC{}",
            page.sql_suffix()
        );
        let mut data_sql = sqlx::query_as::<_, User>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let users = data_sql.fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error fetching users");
            AppError::from(e)
        })?;

        debug!(total, returned = users.len(), "Users fetched");

        Ok(PaginatedUsersResponse {
            data: users,
            meta: page.meta(total),
        })
    }

    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn get_user(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        username: &str,
    ) -> Result<User, AppError> {
        ctx.authorize_branch(branch)?;
        let user = Self::find_user(db, ctx, username).await?;
        if user.branch != branch {
            return Err(AppError::not_found(anyhow!(messages::USER_NOT_FOUND)));
        }
        Ok(user)
    }

    /// Teachers of `branch` available for lesson group `group`.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn list_by_group(
        db: &PgPool,
        branch: &str,
        group: &str,
    ) -> Result<Vec<TeacherSummary>, AppError> {
        let teachers = sqlx::query_as::<_, TeacherSummary>(
            "SELECT username, name, email, lessons FROM users
             WHERE branch = $1 AND lessons @> jsonb_build_array(jsonb_build_object('group', $2::text))
             ORDER BY name ASC",
        )
        .bind(branch)
        .bind(group)
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching teachers by group");
            AppError::from(e)
        })?;

        Ok(teachers)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn list_teachers(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
    ) -> Result<Vec<User>, AppError> {
        ctx.authorize_branch(branch)?;
        let teachers = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE branch = $1 AND role = $2 ORDER BY name ASC"
        ))
        .bind(branch)
        .bind(Role::Teacher.as_str())
        .fetch_all(db)
        .await?;

        Ok(teachers)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn count_by_branch(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
    ) -> Result<UserCountResponse, AppError> {
        ctx.authorize_branch(branch)?;
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE branch = $1")
            .bind(branch)
            .fetch_one(db)
            .await?;

        Ok(UserCountResponse {
            branch: branch.to_string(),
            count,
        })
    }

    #[instrument(skip(db, ctx), fields(db.operation = "DELETE", db.table = "users"))]
    pub async fn delete_user(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        username: &str,
    ) -> Result<MessageResponse, AppError> {
        let user = Self::get_user(db, ctx, branch, username).await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error deleting user");
                AppError::from(e)
            })?;

        info!(user.id = %user.id, "User deleted");
        Ok(MessageResponse::new(messages::DELETED))
    }

    #[instrument(skip(db, ctx, dto), fields(user.username = %dto.username, db.operation = "UPDATE", db.table = "users"))]
    pub async fn change_password(
        db: &PgPool,
        ctx: &ScopeContext,
        dto: ChangePasswordDto,
    ) -> Result<MessageResponse, AppError> {
        let user = Self::find_user(db, ctx, &dto.username).await?;
        if user.role == Role::SuperAdmin && !ctx.is_superadmin() {
            return Err(AppError::forbidden(messages::ONLY_SUPERADMIN_GRANTS_SUPERADMIN));
        }

        let hashed = hash_password(&dto.password)?;
        sqlx::query("UPDATE users SET password = $2 WHERE id = $1")
            .bind(user.id)
            .bind(&hashed)
            .execute(db)
            .await?;

        info!(user.id = %user.id, "Password changed");
        Ok(MessageResponse::new(messages::SAVED))
    }

    #[instrument(skip(db, ctx, dto), fields(user.username = %dto.username, db.operation = "UPDATE", db.table = "users"))]
    pub async fn change_role(
        db: &PgPool,
        ctx: &ScopeContext,
        dto: ChangeRoleDto,
    ) -> Result<User, AppError> {
        let user = Self::find_user(db, ctx, &dto.username).await?;
        Self::check_role_grant(ctx, &user, dto.role)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(dto.role.as_str())
        .fetch_one(db)
        .await?;

        info!(user.id = %user.id, role = %user.role, "Role changed");
        Ok(user)
    }

    /// Partial update; absent fields keep their stored value.
    #[instrument(skip(db, ctx, dto), fields(user.username = %dto.username, db.operation = "UPDATE", db.table = "users"))]
    pub async fn save_user(
        db: &PgPool,
        ctx: &ScopeContext,
        dto: SaveUserDto,
    ) -> Result<User, AppError> {
        let user = Self::find_user(db, ctx, &dto.username).await?;
        if let Some(role) = dto.role {
            Self::check_role_grant(ctx, &user, role)?;
        } else if user.role == Role::SuperAdmin && !ctx.is_superadmin() {
            return Err(AppError::forbidden(messages::ONLY_SUPERADMIN_GRANTS_SUPERADMIN));
        }

        let hashed = dto.password.as_deref().map(hash_password).transpose()?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET role = COALESCE($2, role),
                 email = COALESCE($3, email),
                 name = COALESCE($4, name),
                 password = COALESCE($5, password)
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(dto.role.map(|r| r.as_str()))
        .bind(dto.email.as_deref().map(str::trim))
        .bind(dto.name.as_deref().map(str::trim))
        .bind(hashed)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error saving user");
            AppError::from(e)
        })?;

        info!(user.id = %user.id, "User saved");
        Ok(user)
    }

    #[instrument(skip(db, ctx, dto), fields(user.username = %dto.username, db.operation = "UPDATE", db.table = "users"))]
    pub async fn set_lessons(
        db: &PgPool,
        ctx: &ScopeContext,
        dto: SetLessonsDto,
    ) -> Result<User, AppError> {
        let username = Self::normalize_username(&dto.username);
        if !ctx.is_admin() && username != ctx.username {
            return Err(AppError::forbidden(messages::TEACHER_EDITS_SELF_ONLY));
        }
        let user = Self::find_user(db, ctx, &username).await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET lessons = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(Json(&dto.lessons))
        .fetch_one(db)
        .await?;

        debug!(user.id = %user.id, lessons = dto.lessons.len(), "Lessons updated");
        Ok(user)
    }

    /// Saves the lesson lists of several users; all or nothing.
    #[instrument(skip(db, ctx, dto), fields(count = dto.users.len(), db.operation = "UPDATE", db.table = "users"))]
    pub async fn save_lesson_list(
        db: &PgPool,
        ctx: &ScopeContext,
        dto: SaveLessonListDto,
    ) -> Result<MessageResponse, AppError> {
        let sql = if ctx.is_superadmin() {
            "UPDATE users SET lessons = $1 WHERE username = $2"
        } else {
            "UPDATE users SET lessons = $1 WHERE username = $2 AND branch = $3"
        };

        let mut tx = db.begin().await?;
        for entry in &dto.users {
            let mut query = sqlx::query(sql)
                .bind(Json(&entry.lessons))
                .bind(Self::normalize_username(&entry.username));
            if !ctx.is_superadmin() {
                query = query.bind(&ctx.branch);
            }

            let result = query.execute(&mut *tx).await.map_err(|e| {
                error!(error = %e, "Database error saving lesson list");
                AppError::from(e)
            })?;
            if result.rows_affected() == 0 {
                return Err(AppError::not_found(anyhow!(
                    "{}: {}",
                    messages::USER_NOT_FOUND,
                    entry.username
                )));
            }
        }
        tx.commit().await?;

        info!(count = dto.users.len(), "Lesson list saved");
        Ok(MessageResponse::new(messages::SAVED))
    }
}
