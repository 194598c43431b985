use anyhow::anyhow;
use mashar_core::AppError;
use mashar_db::PgPool;
use mashar_models::MessageResponse;
use mashar_models::holidays::{HolidayCalendar, HolidayCalendarDto};
use mashar_models::ids::CalendarId;
use sqlx::types::Json;
use tracing::{error, info, instrument};

use crate::middleware::scope::ScopeContext;
use crate::utils::messages;

const CALENDAR_COLUMNS: &str = "id, branch, name, year, sector, holidays";

pub struct HolidayService;

impl HolidayService {
    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "holiday_calendars"))]
    pub async fn list_calendars(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
    ) -> Result<Vec<HolidayCalendar>, AppError> {
        ctx.authorize_branch(branch)?;

        let calendars = sqlx::query_as::<_, HolidayCalendar>(&format!(
            "SELECT {CALENDAR_COLUMNS} FROM holiday_calendars WHERE branch = $1
             ORDER BY year DESC, name ASC"
        ))
        .bind(branch)
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching holiday calendars");
            AppError::from(e)
        })?;

        Ok(calendars)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "holiday_calendars"))]
    pub async fn get_calendar(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: CalendarId,
    ) -> Result<HolidayCalendar, AppError> {
        ctx.authorize_branch(branch)?;

        sqlx::query_as::<_, HolidayCalendar>(&format!(
            "SELECT {CALENDAR_COLUMNS} FROM holiday_calendars WHERE id = $1 AND branch = $2"
        ))
        .bind(id)
        .bind(branch)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!(messages::CALENDAR_NOT_FOUND)))
    }

    async fn insert(
        db: &PgPool,
        branch: &str,
        name: &str,
        dto: &HolidayCalendarDto,
    ) -> Result<HolidayCalendar, AppError> {
        sqlx::query_as::<_, HolidayCalendar>(&format!(
            "INSERT INTO holiday_calendars (branch, name, year, sector, holidays)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {CALENDAR_COLUMNS}"
        ))
        .bind(branch)
        .bind(name)
        .bind(&dto.year)
        .bind(&dto.sector)
        .bind(Json(&dto.holidays))
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating holiday calendar");
            AppError::from(e)
        })
    }

    #[instrument(skip(db, ctx, dto), fields(db.operation = "INSERT", db.table = "holiday_calendars"))]
    pub async fn add_calendar(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        dto: HolidayCalendarDto,
    ) -> Result<HolidayCalendar, AppError> {
        ctx.authorize_branch(branch)?;
        let calendar = Self::insert(db, branch, dto.name.trim(), &dto).await?;
        info!(calendar.id = %calendar.id, branch = %branch, "Holiday calendar created");
        Ok(calendar)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "INSERT", db.table = "holiday_calendars"))]
    pub async fn clone_calendar(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: CalendarId,
    ) -> Result<HolidayCalendar, AppError> {
        let source = Self::get_calendar(db, ctx, branch, id).await?;
        let name = format!("{}{}", source.name, messages::COPY_SUFFIX);
        let dto = HolidayCalendarDto {
            name: source.name,
            year: source.year,
            sector: source.sector,
            holidays: source.holidays.0,
        };

        let calendar = Self::insert(db, branch, &name, &dto).await?;
        info!(calendar.id = %calendar.id, source = %id, "Holiday calendar cloned");
        Ok(calendar)
    }

    #[instrument(skip(db, ctx, dto), fields(db.operation = "UPDATE", db.table = "holiday_calendars"))]
    pub async fn update_calendar(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: CalendarId,
        dto: HolidayCalendarDto,
    ) -> Result<HolidayCalendar, AppError> {
        ctx.authorize_branch(branch)?;

        let calendar = sqlx::query_as::<_, HolidayCalendar>(&format!(
            "UPDATE holiday_calendars
             SET name = $3, year = $4, sector = $5, holidays = $6
             WHERE id = $1 AND branch = $2
             RETURNING {CALENDAR_COLUMNS}"
        ))
        .bind(id)
        .bind(branch)
        .bind(dto.name.trim())
        .bind(&dto.year)
        .bind(&dto.sector)
        .bind(Json(&dto.holidays))
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!(messages::CALENDAR_NOT_FOUND)))?;

        info!(calendar.id = %id, "Holiday calendar updated");
        Ok(calendar)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "DELETE", db.table = "holiday_calendars"))]
    pub async fn delete_calendar(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: CalendarId,
    ) -> Result<MessageResponse, AppError> {
        ctx.authorize_branch(branch)?;

        let result = sqlx::query("DELETE FROM holiday_calendars WHERE id = $1 AND branch = $2")
            .bind(id)
            .bind(branch)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!(messages::CALENDAR_NOT_FOUND)));
        }

        info!(calendar.id = %id, "Holiday calendar deleted");
        Ok(MessageResponse::new(messages::DELETED))
    }
}
