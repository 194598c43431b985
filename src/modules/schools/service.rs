use anyhow::anyhow;
use mashar_core::AppError;
use mashar_db::PgPool;
use mashar_models::MessageResponse;
use mashar_models::ids::SchoolId;
use mashar_models::schools::{School, SchoolDto};
use sqlx::types::Json;
use tracing::{error, info, instrument};

use crate::middleware::scope::ScopeContext;
use crate::utils::messages;

const SCHOOL_COLUMNS: &str = "id, branch, name, start_year, end_year, end_semester, sector, address, city, holiday_id, people";

pub struct SchoolService;

impl SchoolService {
    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "schools"))]
    pub async fn list_schools(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
    ) -> Result<Vec<School>, AppError> {
        ctx.authorize_branch(branch)?;

        let schools = sqlx::query_as::<_, School>(&format!(
            "SELECT {SCHOOL_COLUMNS} FROM schools WHERE branch = $1 ORDER BY name ASC"
        ))
        .bind(branch)
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching schools");
            AppError::from(e)
        })?;

        Ok(schools)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "schools"))]
    pub async fn get_school(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: SchoolId,
    ) -> Result<School, AppError> {
        ctx.authorize_branch(branch)?;

        sqlx::query_as::<_, School>(&format!(
            "SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = $1 AND branch = $2"
        ))
        .bind(id)
        .bind(branch)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!(messages::SCHOOL_NOT_FOUND)))
    }

    #[instrument(skip(db, ctx, dto), fields(db.operation = "INSERT", db.table = "schools"))]
    pub async fn add_school(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        dto: SchoolDto,
    ) -> Result<School, AppError> {
        ctx.authorize_branch(branch)?;

        let school = sqlx::query_as::<_, School>(&format!(
            "INSERT INTO schools (branch, name, start_year, end_year, end_semester, sector, address, city, holiday_id, people)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {SCHOOL_COLUMNS}"
        ))
        .bind(branch)
        .bind(dto.name.trim())
        .bind(dto.start_year)
        .bind(dto.end_year)
        .bind(dto.end_semester)
        .bind(&dto.sector)
        .bind(&dto.address)
        .bind(&dto.city)
        .bind(&dto.holiday_id)
        .bind(Json(&dto.people))
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating school");
            AppError::from(e)
        })?;

        info!(school.id = %school.id, branch = %branch, "School created");
        Ok(school)
    }

    #[instrument(skip(db, ctx, dto), fields(db.operation = "UPDATE", db.table = "schools"))]
    pub async fn update_school(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: SchoolId,
        dto: SchoolDto,
    ) -> Result<School, AppError> {
        ctx.authorize_branch(branch)?;

        let school = sqlx::query_as::<_, School>(&format!(
            "UPDATE schools
             SET name = $3, start_year = $4, end_year = $5, end_semester = $6, sector = $7,
                 address = $8, city = $9, holiday_id = $10, people = $11
             WHERE id = $1 AND branch = $2
             RETURNING {SCHOOL_COLUMNS}"
        ))
        .bind(id)
        .bind(branch)
        .bind(dto.name.trim())
        .bind(dto.start_year)
        .bind(dto.end_year)
        .bind(dto.end_semester)
        .bind(&dto.sector)
        .bind(&dto.address)
        .bind(&dto.city)
        .bind(&dto.holiday_id)
        .bind(Json(&dto.people))
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!(messages::SCHOOL_NOT_FOUND)))?;

        info!(school.id = %id, "School updated");
        Ok(school)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "DELETE", db.table = "schools"))]
    pub async fn delete_school(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: SchoolId,
    ) -> Result<MessageResponse, AppError> {
        ctx.authorize_branch(branch)?;

        let result = sqlx::query("DELETE FROM schools WHERE id = $1 AND branch = $2")
            .bind(id)
            .bind(branch)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!(messages::SCHOOL_NOT_FOUND)));
        }

        info!(school.id = %id, "School deleted");
        Ok(MessageResponse::new(messages::DELETED))
    }
}
