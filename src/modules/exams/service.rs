use anyhow::anyhow;
use mashar_core::AppError;
use mashar_db::PgPool;
use mashar_models::MessageResponse;
use mashar_models::exams::{Exam, ExamDto, ExamFilter};
use mashar_models::ids::ExamId;
use sqlx::types::Json;
use tracing::{debug, error, info, instrument};

use super::filter::ExamQuery;
use crate::middleware::scope::ScopeContext;
use crate::utils::messages;

const EXAM_COLUMNS: &str = "id, branch, name, subject, year, link, class_grade, period, questions, comments, date, chance, is_private, eval_type, reference, created_by";

pub struct ExamService;

impl ExamService {
    async fn fetch(db: &PgPool, query: &ExamQuery) -> Result<Vec<Exam>, AppError> {
        let sql = format!(
            "SELECT {EXAM_COLUMNS} FROM exams{} ORDER BY year DESC, name ASC",
            query.where_clause
        );
        let mut exams_sql = sqlx::query_as::<_, Exam>(&sql);
        for param in &query.params {
            exams_sql = exams_sql.bind(param);
        }

        let exams = exams_sql.fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error fetching exams");
            AppError::from(e)
        })?;

        debug!(count = exams.len(), "Exams fetched");
        Ok(exams)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "exams"))]
    pub async fn list_exams(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        year: &str,
    ) -> Result<Vec<Exam>, AppError> {
        ctx.authorize_branch(branch)?;
        let mut query = ExamQuery::new(branch, ctx);
        query.year(Some(year));
        Self::fetch(db, &query).await
    }

    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "exams"))]
    pub async fn filter_exams(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        filter: &ExamFilter,
    ) -> Result<Vec<Exam>, AppError> {
        ctx.authorize_branch(branch)?;
        let mut query = ExamQuery::new(branch, ctx);
        query.filter(filter);
        Self::fetch(db, &query).await
    }

    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "exams"))]
    pub async fn get_exam(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: ExamId,
    ) -> Result<Exam, AppError> {
        ctx.authorize_branch(branch)?;

        let exam = sqlx::query_as::<_, Exam>(&format!(
            "SELECT {EXAM_COLUMNS} FROM exams WHERE id = $1 AND branch = $2"
        ))
        .bind(id)
        .bind(branch)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!(messages::EXAM_NOT_FOUND)))?;

        if exam.is_private && !ctx.is_admin() && exam.created_by != ctx.username {
            return Err(AppError::not_found(anyhow!(messages::EXAM_NOT_FOUND)));
        }
        Ok(exam)
    }

    async fn insert(
        db: &PgPool,
        branch: &str,
        created_by: &str,
        dto: &ExamDto,
        name: &str,
    ) -> Result<Exam, AppError> {
        sqlx::query_as::<_, Exam>(&format!(
            "INSERT INTO exams (branch, name, subject, year, link, class_grade, period, questions,
                                comments, date, chance, is_private, eval_type, reference, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {EXAM_COLUMNS}"
        ))
        .bind(branch)
        .bind(name)
        .bind(Json(&dto.subject))
        .bind(&dto.year)
        .bind(&dto.link)
        .bind(&dto.class_grade)
        .bind(&dto.period)
        .bind(Json(&dto.questions))
        .bind(&dto.comments)
        .bind(dto.date)
        .bind(&dto.chance)
        .bind(dto.is_private)
        .bind(&dto.eval_type)
        .bind(&dto.reference)
        .bind(created_by)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating exam");
            AppError::from(e)
        })
    }

    #[instrument(skip(db, ctx, dto), fields(db.operation = "INSERT", db.table = "exams"))]
    pub async fn add_exam(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        dto: ExamDto,
    ) -> Result<Exam, AppError> {
        ctx.authorize_branch(branch)?;
        let exam = Self::insert(db, branch, &ctx.username, &dto, dto.name.trim()).await?;
        info!(exam.id = %exam.id, branch = %branch, "Exam created");
        Ok(exam)
    }

    /// Copies an exam the caller can see; the copy belongs to the caller.
    #[instrument(skip(db, ctx), fields(db.operation = "INSERT", db.table = "exams"))]
    pub async fn clone_exam(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: ExamId,
    ) -> Result<Exam, AppError> {
        let source = Self::get_exam(db, ctx, branch, id).await?;
        let dto = ExamDto {
            name: source.name.clone(),
            subject: source.subject.0,
            year: source.year,
            link: source.link,
            class_grade: source.class_grade,
            period: source.period,
            questions: source.questions.0,
            comments: source.comments,
            date: source.date,
            chance: source.chance,
            is_private: source.is_private,
            eval_type: source.eval_type,
            reference: source.reference,
        };
        let name = format!("{}{}", source.name, messages::COPY_SUFFIX);

        let exam = Self::insert(db, branch, &ctx.username, &dto, &name).await?;
        info!(exam.id = %exam.id, source = %id, "Exam cloned");
        Ok(exam)
    }

    #[instrument(skip(db, ctx, dto), fields(db.operation = "UPDATE", db.table = "exams"))]
    pub async fn update_exam(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: ExamId,
        dto: ExamDto,
    ) -> Result<Exam, AppError> {
        Self::get_exam(db, ctx, branch, id).await?;

        let exam = sqlx::query_as::<_, Exam>(&format!(
            "UPDATE exams
             SET name = $2, subject = $3, year = $4, link = $5, class_grade = $6, period = $7,
                 questions = $8, comments = $9, date = $10, chance = $11, is_private = $12,
                 eval_type = $13, reference = $14
             WHERE id = $1
             RETURNING {EXAM_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.name.trim())
        .bind(Json(&dto.subject))
        .bind(&dto.year)
        .bind(&dto.link)
        .bind(&dto.class_grade)
        .bind(&dto.period)
        .bind(Json(&dto.questions))
        .bind(&dto.comments)
        .bind(dto.date)
        .bind(&dto.chance)
        .bind(dto.is_private)
        .bind(&dto.eval_type)
        .bind(&dto.reference)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error updating exam");
            AppError::from(e)
        })?;

        info!(exam.id = %id, "Exam updated");
        Ok(exam)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "DELETE", db.table = "exams"))]
    pub async fn delete_exam(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        id: ExamId,
    ) -> Result<MessageResponse, AppError> {
        Self::get_exam(db, ctx, branch, id).await?;

        sqlx::query("DELETE FROM exams WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        info!(exam.id = %id, "Exam deleted");
        Ok(MessageResponse::new(messages::DELETED))
    }
}
