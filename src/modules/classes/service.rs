use anyhow::anyhow;
use mashar_core::AppError;
use mashar_db::PgPool;
use mashar_models::MessageResponse;
use mashar_models::classes::{Class, ClassDto, ClassSummary};
use mashar_models::ids::ClassId;
use sqlx::types::Json;
use tracing::{debug, error, info, instrument};

use crate::middleware::scope::ScopeContext;
use crate::utils::messages;

const CLASS_COLUMNS: &str =
    "id, branch, teacher, year, name, grade, comments, schools, lessons, plan, students, updated_at";

pub struct ClassService;

impl ClassService {
    /// Teachers only ever see and own their own classes.
    fn owner(ctx: &ScopeContext, requested: Option<&str>) -> Option<String> {
        if ctx.is_admin() {
            requested
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase)
        } else {
            Some(ctx.username.clone())
        }
    }

    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "classes"))]
    pub async fn list_classes(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        teacher: Option<&str>,
    ) -> Result<Vec<ClassSummary>, AppError> {
        ctx.authorize_branch(branch)?;

        let mut where_clause = String::from(" WHERE branch = $1");
        let teacher = Self::owner(ctx, teacher);
        if teacher.is_some() {
            where_clause.push_str(" AND teacher = $2");
        }

        let sql = format!(
            "SELECT id, teacher, year, name, grade, schools, lessons FROM classes{where_clause}
             ORDER BY year DESC, name ASC"
        );
        let mut query = sqlx::query_as::<_, ClassSummary>(&sql).bind(branch);
        if let Some(teacher) = &teacher {
            query = query.bind(teacher);
        }

        let classes = query.fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error fetching classes");
            AppError::from(e)
        })?;

        debug!(count = classes.len(), "Classes fetched");
        Ok(classes)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "classes"))]
    pub async fn get_class(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: ClassId,
    ) -> Result<Class, AppError> {
        ctx.authorize_branch(branch)?;

        let class = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1 AND branch = $2"
        ))
        .bind(id)
        .bind(branch)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!(messages::CLASS_NOT_FOUND)))?;

        if !ctx.is_admin() && class.teacher != ctx.username {
            return Err(AppError::not_found(anyhow!(messages::CLASS_NOT_FOUND)));
        }
        Ok(class)
    }

    #[instrument(skip(db, ctx, dto), fields(db.operation = "INSERT", db.table = "classes"))]
    pub async fn add_class(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        dto: ClassDto,
    ) -> Result<Class, AppError> {
        ctx.authorize_branch(branch)?;
        let teacher = Self::owner(ctx, dto.teacher.as_deref()).unwrap_or_else(|| ctx.username.clone());

        let class = sqlx::query_as::<_, Class>(&format!(
            "INSERT INTO classes (branch, teacher, year, name, grade, comments, schools, lessons, plan, students)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {CLASS_COLUMNS}"
        ))
        .bind(branch)
        .bind(&teacher)
        .bind(&dto.year)
        .bind(dto.name.trim())
        .bind(&dto.grade)
        .bind(&dto.comments)
        .bind(Json(&dto.schools))
        .bind(Json(&dto.lessons))
        .bind(Json(&dto.plan))
        .bind(Json(&dto.students))
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating class");
            AppError::from(e)
        })?;

        info!(class.id = %class.id, teacher = %teacher, "Class created");
        Ok(class)
    }

    #[instrument(skip(db, ctx, dto), fields(db.operation = "UPDATE", db.table = "classes"))]
    pub async fn update_class(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: ClassId,
        dto: ClassDto,
    ) -> Result<Class, AppError> {
        let existing = Self::get_class(db, ctx, branch, id).await?;
        let teacher = Self::owner(ctx, dto.teacher.as_deref()).unwrap_or(existing.teacher);

        let class = sqlx::query_as::<_, Class>(&format!(
            "UPDATE classes
             SET teacher = $3, year = $4, name = $5, grade = $6, comments = $7,
                 schools = $8, lessons = $9, plan = $10, students = $11, updated_at = NOW()
             WHERE id = $1 AND branch = $2
             RETURNING {CLASS_COLUMNS}"
        ))
        .bind(id)
        .bind(branch)
        .bind(&teacher)
        .bind(&dto.year)
        .bind(dto.name.trim())
        .bind(&dto.grade)
        .bind(&dto.comments)
        .bind(Json(&dto.schools))
        .bind(Json(&dto.lessons))
        .bind(Json(&dto.plan))
        .bind(Json(&dto.students))
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error updating class");
            AppError::from(e)
        })?;

        info!(class.id = %id, "Class updated");
        Ok(class)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "DELETE", db.table = "classes"))]
    pub async fn delete_class(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: ClassId,
    ) -> Result<MessageResponse, AppError> {
        Self::get_class(db, ctx, branch, id).await?;

        sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        info!(class.id = %id, "Class deleted");
        Ok(MessageResponse::new(messages::DELETED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mashar_auth::Role;

    fn ctx(role: Role) -> ScopeContext {
        ScopeContext {
            username: "dana@mashar.org".to_string(),
            role,
            branch: "ksv".to_string(),
        }
    }

    #[test]
    fn test_teacher_is_pinned_to_self() {
        assert_eq!(
            ClassService::owner(&ctx(Role::Teacher), Some("other@mashar.org")),
            Some("dana@mashar.org".to_string())
        );
    }

    #[test]
    fn test_admin_may_filter_or_list_all() {
        assert_eq!(ClassService::owner(&ctx(Role::Admin), None), None);
        assert_eq!(
            ClassService::owner(&ctx(Role::Admin), Some(" Other@Mashar.org ")),
            Some("other@mashar.org".to_string())
        );
    }
}
