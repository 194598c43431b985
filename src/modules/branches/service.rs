use anyhow::anyhow;
use mashar_core::AppError;
use mashar_db::PgPool;
use mashar_models::MessageResponse;
use mashar_models::branches::{Branch, BranchWithUsage, CreateBranchDto};
use tracing::{error, info, instrument, warn};

use crate::utils::messages;

pub struct BranchService;

impl BranchService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "branches"))]
    pub async fn list_branches(db: &PgPool) -> Result<Vec<BranchWithUsage>, AppError> {
        let branches = sqlx::query_as::<_, BranchWithUsage>(
            "SELECT b.code, b.name,
                    (EXISTS(SELECT 1 FROM games g WHERE g.branch = b.code)
                     OR EXISTS(SELECT 1 FROM users u WHERE u.branch = b.code)) AS used
             FROM branches b
             ORDER BY b.name ASC",
        )
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching branches");
            AppError::from(e)
        })?;

        Ok(branches)
    }

    /// Display name of a branch, falling back to its code.
    pub async fn display_name(db: &PgPool, code: &str) -> Result<String, AppError> {
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM branches WHERE code = $1")
            .bind(code)
            .fetch_optional(db)
            .await
            .map_err(AppError::from)?;
        Ok(name.unwrap_or_else(|| code.to_string()))
    }

    #[instrument(skip(db, dto), fields(branch.code = %dto.code, db.operation = "INSERT", db.table = "branches"))]
    pub async fn add_branch(db: &PgPool, dto: CreateBranchDto) -> Result<Branch, AppError> {
        let branch = sqlx::query_as::<_, Branch>(
            "INSERT INTO branches (code, name) VALUES ($1, $2) RETURNING code, name",
        )
        .bind(dto.code.trim())
        .bind(dto.name.trim())
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!("Duplicate branch code");
                return AppError::bad_request(anyhow!(messages::BRANCH_EXISTS));
            }
            error!(error = %e, "Database error creating branch");
            AppError::from(e)
        })?;

        info!(branch.code = %branch.code, "Branch created");
        Ok(branch)
    }

    /// Refuses to delete a branch that a game or user still references.
    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "branches"))]
    pub async fn delete_branch(db: &PgPool, code: &str) -> Result<MessageResponse, AppError> {
        let branch = sqlx::query_as::<_, BranchWithUsage>(
            "SELECT b.code, b.name,
                    (EXISTS(SELECT 1 FROM games g WHERE g.branch = b.code)
                     OR EXISTS(SELECT 1 FROM users u WHERE u.branch = b.code)) AS used
             FROM branches b
             WHERE b.code = $1",
        )
        .bind(code)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!(messages::BRANCH_NOT_FOUND)))?;

        if branch.used {
            return Err(AppError::bad_request(anyhow!(messages::BRANCH_IN_USE)));
        }

        sqlx::query("DELETE FROM branches WHERE code = $1")
            .bind(code)
            .execute(db)
            .await?;

        info!(branch.code = %code, "Branch deleted");
        Ok(MessageResponse::new(messages::DELETED))
    }
}
