use anyhow::anyhow;
use mashar_core::AppError;
use mashar_db::PgPool;
use mashar_models::MessageResponse;
use mashar_models::ids::TemplateId;
use mashar_models::templates::{CreateTemplateDto, PlanTemplate, UpdateTemplateDto};
use sqlx::types::Json;
use tracing::{error, info, instrument, warn};

use crate::middleware::scope::ScopeContext;
use crate::utils::messages;

const TEMPLATE_COLUMNS: &str = "id, branch, name, grade, version, template, updated_at";

pub struct TemplateService;

impl TemplateService {
    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "plan_templates"))]
    pub async fn list_templates(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
    ) -> Result<Vec<PlanTemplate>, AppError> {
        ctx.authorize_branch(branch)?;

        let templates = sqlx::query_as::<_, PlanTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM plan_templates WHERE branch = $1 ORDER BY grade ASC, name ASC"
        ))
        .bind(branch)
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching templates");
            AppError::from(e)
        })?;

        Ok(templates)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "plan_templates"))]
    pub async fn get_template(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: TemplateId,
    ) -> Result<PlanTemplate, AppError> {
        ctx.authorize_branch(branch)?;

        sqlx::query_as::<_, PlanTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM plan_templates WHERE id = $1 AND branch = $2"
        ))
        .bind(id)
        .bind(branch)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!(messages::TEMPLATE_NOT_FOUND)))
    }

    #[instrument(skip(db, ctx, dto), fields(db.operation = "INSERT", db.table = "plan_templates"))]
    pub async fn add_template(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        dto: CreateTemplateDto,
    ) -> Result<PlanTemplate, AppError> {
        ctx.authorize_branch(branch)?;

        let template = sqlx::query_as::<_, PlanTemplate>(&format!(
            "INSERT INTO plan_templates (branch, name, grade, template)
             VALUES ($1, $2, $3, $4)
             RETURNING {TEMPLATE_COLUMNS}"
        ))
        .bind(branch)
        .bind(dto.name.trim())
        .bind(&dto.grade)
        .bind(Json(&dto.template))
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating template");
            AppError::from(e)
        })?;

        info!(template.id = %template.id, branch = %branch, "Template created");
        Ok(template)
    }

    /// Compare-and-swap on `version`: applies only when the stored version
    /// equals `dto.version`, and bumps it. A stale version yields 409.
    #[instrument(skip(db, ctx, dto), fields(expected_version = dto.version, db.operation = "UPDATE", db.table = "plan_templates"))]
    pub async fn update_template(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: TemplateId,
        dto: UpdateTemplateDto,
    ) -> Result<PlanTemplate, AppError> {
        ctx.authorize_branch(branch)?;

        let updated = sqlx::query_as::<_, PlanTemplate>(&format!(
            "UPDATE plan_templates
             SET name = $4, grade = $5, template = $6, version = version + 1, updated_at = NOW()
             WHERE id = $1 AND branch = $2 AND version = $3
             RETURNING {TEMPLATE_COLUMNS}"
        ))
        .bind(id)
        .bind(branch)
        .bind(dto.version)
        .bind(dto.name.trim())
        .bind(&dto.grade)
        .bind(Json(&dto.template))
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error updating template");
            AppError::from(e)
        })?;

        match updated {
            Some(template) => {
                info!(template.id = %id, version = template.version, "Template updated");
                Ok(template)
            }
            None => {
                // Distinguish a missing row from a lost race.
                let current = Self::get_template(db, ctx, branch, id).await?;
                warn!(
                    template.id = %id,
                    stored_version = current.version,
                    "Template version conflict"
                );
                Err(AppError::conflict(anyhow!(messages::TEMPLATE_VERSION_CONFLICT)))
            }
        }
    }

    #[instrument(skip(db, ctx), fields(db.operation = "DELETE", db.table = "plan_templates"))]
    pub async fn delete_template(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: TemplateId,
    ) -> Result<MessageResponse, AppError> {
        ctx.authorize_branch(branch)?;

        let result = sqlx::query("DELETE FROM plan_templates WHERE id = $1 AND branch = $2")
            .bind(id)
            .bind(branch)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!(messages::TEMPLATE_NOT_FOUND)));
        }

        info!(template.id = %id, "Template deleted");
        Ok(MessageResponse::new(messages::DELETED))
    }
}
