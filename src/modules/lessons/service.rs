use anyhow::anyhow;
use chrono::{DateTime, Utc};
use mashar_core::{AppError, PageRequest, generate_uid};
use mashar_db::PgPool;
use mashar_models::MessageResponse;
use mashar_models::ids::RegistrationId;
use mashar_models::lessons::{
    AvailabilityResponse, FormDetailsDto, LessonForm, LessonFormView, LessonGroup, LessonGroupDto,
    LessonRegistration, NEW_ENTITY_UID, PaginatedLessonGroupsResponse, RegisterLessonDto,
    RegistrationRangeDto, SaveFormDto, SaveLessonGroupsDto,
};
use mashar_models::users::TeacherSummary;
use sqlx::PgExecutor;
use sqlx::types::Json;
use tracing::{debug, error, info, instrument, warn};

use super::forms::{check_answers, empty_form, form_view};
use super::groups::{group_from_dto, group_name, paginate, remove_group, replace_group};
use crate::middleware::scope::ScopeContext;
use crate::modules::branches::service::BranchService;
use crate::utils::messages;

const FORM_COLUMNS: &str =
    r#"uid, branch, "group", active, date, name, title, subtitle, "desc", qa"#;

const REGISTRATION_COLUMNS: &str = r#"id, branch, lesson_date_time, form_id, "group", group_name,
    grade, teacher, cur_teacher, data, created_at"#;

async fn fetch_groups<'e, E>(executor: E, branch: &str, lock: bool) -> Result<Vec<LessonGroup>, AppError>
where
    E: PgExecutor<'e>,
{
    let sql = if lock {
        "SELECT groups FROM lesson_groups WHERE branch = $1 FOR UPDATE"
    } else {
        "SELECT groups FROM lesson_groups WHERE branch = $1"
    };

    let groups = sqlx::query_scalar::<_, Json<Vec<LessonGroup>>>(sql)
        .bind(branch)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            error!(branch = %branch, error = %e, "Database error fetching lesson groups");
            AppError::from(e)
        })?;

    Ok(groups.map(|g| g.0).unwrap_or_default())
}

async fn store_groups<'e, E>(executor: E, branch: &str, groups: &[LessonGroup]) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO lesson_groups (branch, groups) VALUES ($1, $2)
         ON CONFLICT (branch) DO UPDATE SET groups = EXCLUDED.groups",
    )
    .bind(branch)
    .bind(Json(groups))
    .execute(executor)
    .await
    .map_err(|e| {
        error!(branch = %branch, error = %e, "Database error saving lesson groups");
        AppError::from(e)
    })?;
    Ok(())
}

pub struct LessonGroupService;

impl LessonGroupService {
    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "lesson_groups"))]
    pub async fn list_groups(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        page: PageRequest,
    ) -> Result<PaginatedLessonGroupsResponse, AppError> {
        ctx.authorize_branch(branch)?;
        let groups = fetch_groups(db, branch, false).await?;
        Ok(paginate(groups, page))
    }

    /// Replaces the whole group list of `branch`.
    #[instrument(skip(db, ctx, dto), fields(db.operation = "UPSERT", db.table = "lesson_groups"))]
    pub async fn save_all(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        dto: SaveLessonGroupsDto,
    ) -> Result<Vec<LessonGroup>, AppError> {
        ctx.authorize_branch(branch)?;
        let groups: Vec<LessonGroup> = dto.groups.into_iter().map(group_from_dto).collect();
        store_groups(db, branch, &groups).await?;

        info!(branch = %branch, count = groups.len(), "Lesson groups saved");
        Ok(groups)
    }

    #[instrument(skip(db, ctx, dto), fields(db.operation = "UPDATE", db.table = "lesson_groups"))]
    pub async fn save_one(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        dto: LessonGroupDto,
    ) -> Result<LessonGroup, AppError> {
        ctx.authorize_branch(branch)?;
        let group = group_from_dto(dto.clone());
        if dto.gid.as_deref() != Some(group.gid.as_str()) {
            return Err(AppError::not_found(anyhow!(messages::GROUP_NOT_FOUND)));
        }

        let mut tx = db.begin().await?;
        let mut groups = fetch_groups(&mut *tx, branch, true).await?;
        if !replace_group(&mut groups, group.clone()) {
            return Err(AppError::not_found(anyhow!(messages::GROUP_NOT_FOUND)));
        }
        store_groups(&mut *tx, branch, &groups).await?;
        tx.commit().await?;

        info!(branch = %branch, group.gid = %group.gid, "Lesson group updated");
        Ok(group)
    }

    /// Appends a new group, creating the branch's list when needed.
    #[instrument(skip(db, ctx, dto), fields(db.operation = "UPSERT", db.table = "lesson_groups"))]
    pub async fn add_group(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        dto: LessonGroupDto,
    ) -> Result<LessonGroup, AppError> {
        ctx.authorize_branch(branch)?;
        let group = group_from_dto(LessonGroupDto { gid: None, ..dto });

        sqlx::query(
            "INSERT INTO lesson_groups (branch, groups) VALUES ($1, $2)
             ON CONFLICT (branch) DO UPDATE SET groups = lesson_groups.groups || EXCLUDED.groups",
        )
        .bind(branch)
        .bind(Json(vec![group.clone()]))
        .execute(db)
        .await
        .map_err(|e| {
            error!(branch = %branch, error = %e, "Database error adding lesson group");
            AppError::from(e)
        })?;

        info!(branch = %branch, group.gid = %group.gid, "Lesson group added");
        Ok(group)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "UPDATE", db.table = "lesson_groups"))]
    pub async fn delete_group(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        gid: &str,
    ) -> Result<MessageResponse, AppError> {
        ctx.authorize_branch(branch)?;

        let mut tx = db.begin().await?;
        let mut groups = fetch_groups(&mut *tx, branch, true).await?;
        if !remove_group(&mut groups, gid) {
            return Err(AppError::not_found(anyhow!(messages::GROUP_NOT_FOUND)));
        }
        store_groups(&mut *tx, branch, &groups).await?;
        tx.commit().await?;

        info!(branch = %branch, group.gid = %gid, "Lesson group deleted");
        Ok(MessageResponse::new(messages::DELETED))
    }

    /// Groups of the caller's branch plus one teacher's weekly slots. Only a
    /// superadmin may look at another branch.
    #[instrument(skip(db, ctx), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn availability(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        teacher: &str,
    ) -> Result<AvailabilityResponse, AppError> {
        let branch = ctx.effective_branch(Some(branch));
        let groups = fetch_groups(db, &branch, false).await?;

        let user = sqlx::query_as::<_, TeacherSummary>(
            "SELECT username, name, email, lessons FROM users WHERE username = $1 AND branch = $2",
        )
        .bind(teacher.trim().to_lowercase())
        .bind(&branch)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching teacher availability");
            AppError::from(e)
        })?;

        Ok(AvailabilityResponse { groups, user })
    }
}

pub struct LessonFormService;

impl LessonFormService {
    async fn to_views(
        db: &PgPool,
        branch: &str,
        forms: Vec<LessonForm>,
    ) -> Result<Vec<LessonFormView>, AppError> {
        let branch_name = BranchService::display_name(db, branch).await?;
        let groups = fetch_groups(db, branch, false).await?;
        Ok(forms
            .into_iter()
            .map(|form| form_view(form, &branch_name, &groups))
            .collect())
    }

    async fn to_view(db: &PgPool, form: LessonForm) -> Result<LessonFormView, AppError> {
        let branch = form.branch.clone();
        let mut views = Self::to_views(db, &branch, vec![form]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::not_found(anyhow!(messages::FORM_NOT_FOUND)))
    }

    async fn find_form(db: &PgPool, branch: &str, uid: &str) -> Result<LessonForm, AppError> {
        sqlx::query_as::<_, LessonForm>(&format!(
            "SELECT {FORM_COLUMNS} FROM lesson_forms WHERE uid = $1 AND branch = $2"
        ))
        .bind(uid)
        .bind(branch)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(form.uid = %uid, error = %e, "Database error fetching lesson form");
            AppError::from(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow!(messages::FORM_NOT_FOUND)))
    }

    /// Forms of `branch`. Anonymous callers and staff of other branches only
    /// see active forms.
    #[instrument(skip(db, viewer), fields(db.operation = "SELECT", db.table = "lesson_forms"))]
    pub async fn list_forms(
        db: &PgPool,
        viewer: Option<&ScopeContext>,
        branch: &str,
    ) -> Result<Vec<LessonFormView>, AppError> {
        let sees_inactive = viewer.is_some_and(|ctx| ctx.authorize_branch(branch).is_ok());
        let active_filter = if sees_inactive { "" } else { " AND active" };

        let forms = sqlx::query_as::<_, LessonForm>(&format!(
            "SELECT {FORM_COLUMNS} FROM lesson_forms WHERE branch = $1{active_filter}
             ORDER BY date DESC"
        ))
        .bind(branch)
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching lesson forms");
            AppError::from(e)
        })?;

        debug!(branch = %branch, count = forms.len(), "Fetched lesson forms");
        Self::to_views(db, branch, forms).await
    }

    /// One form; uid `-1` yields a blank template for the editor.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "lesson_forms"))]
    pub async fn get_form(db: &PgPool, branch: &str, uid: &str) -> Result<LessonFormView, AppError> {
        let form = if uid == NEW_ENTITY_UID {
            empty_form(branch)
        } else {
            Self::find_form(db, branch, uid).await?
        };
        Self::to_view(db, form).await
    }

    #[instrument(skip(db, ctx, dto), fields(db.operation = "INSERT", db.table = "lesson_forms"))]
    pub async fn add_form(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        dto: FormDetailsDto,
    ) -> Result<LessonFormView, AppError> {
        ctx.authorize_branch(branch)?;

        let form = sqlx::query_as::<_, LessonForm>(&format!(
            r#"INSERT INTO lesson_forms (uid, branch, "group", active, date, name, title, subtitle, "desc", qa)
               VALUES ($1, $2, $3, $4, NOW(), $5, $6, $7, $8, '[]'::jsonb)
               RETURNING {FORM_COLUMNS}"#
        ))
        .bind(generate_uid())
        .bind(branch)
        .bind(&dto.group)
        .bind(dto.active)
        .bind(dto.name.trim())
        .bind(&dto.title)
        .bind(&dto.subtitle)
        .bind(&dto.desc)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating lesson form");
            AppError::from(e)
        })?;

        info!(form.uid = %form.uid, branch = %branch, "Lesson form created");
        Self::to_view(db, form).await
    }

    /// Creates (uid `-1`) or replaces a form with its questions. A uid that
    /// belongs to another branch is reported as not found.
    #[instrument(skip(db, ctx, dto), fields(db.operation = "UPSERT", db.table = "lesson_forms"))]
    pub async fn save_form(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        dto: SaveFormDto,
    ) -> Result<LessonFormView, AppError> {
        ctx.authorize_branch(branch)?;

        let uid = if dto.uid == NEW_ENTITY_UID {
            generate_uid()
        } else {
            dto.uid
        };

        let form = sqlx::query_as::<_, LessonForm>(&format!(
            r#"INSERT INTO lesson_forms (uid, branch, "group", active, date, name, title, subtitle, "desc", qa)
               VALUES ($1, $2, $3, $4, NOW(), $5, $6, $7, $8, $9)
               ON CONFLICT (uid) DO UPDATE
               SET "group" = EXCLUDED."group", active = EXCLUDED.active, date = NOW(),
                   name = EXCLUDED.name, title = EXCLUDED.title, subtitle = EXCLUDED.subtitle,
                   "desc" = EXCLUDED."desc", qa = EXCLUDED.qa
               WHERE lesson_forms.branch = EXCLUDED.branch
               RETURNING {FORM_COLUMNS}"#
        ))
        .bind(&uid)
        .bind(branch)
        .bind(&dto.group)
        .bind(dto.active)
        .bind(dto.name.trim())
        .bind(&dto.title)
        .bind(&dto.subtitle)
        .bind(&dto.desc)
        .bind(Json(&dto.qa))
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(form.uid = %uid, error = %e, "Database error saving lesson form");
            AppError::from(e)
        })?
        .ok_or_else(|| {
            warn!(form.uid = %uid, branch = %branch, "Form belongs to another branch");
            AppError::not_found(anyhow!(messages::FORM_NOT_FOUND))
        })?;

        info!(form.uid = %form.uid, questions = form.qa.len(), "Lesson form saved");
        Self::to_view(db, form).await
    }

    #[instrument(skip(db, ctx, dto), fields(db.operation = "UPDATE", db.table = "lesson_forms"))]
    pub async fn update_details(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        uid: &str,
        dto: FormDetailsDto,
    ) -> Result<LessonFormView, AppError> {
        ctx.authorize_branch(branch)?;

        let form = sqlx::query_as::<_, LessonForm>(&format!(
            r#"UPDATE lesson_forms
               SET "group" = $3, active = $4, name = $5, title = $6, subtitle = $7, "desc" = $8
               WHERE uid = $1 AND branch = $2
               RETURNING {FORM_COLUMNS}"#
        ))
        .bind(uid)
        .bind(branch)
        .bind(&dto.group)
        .bind(dto.active)
        .bind(dto.name.trim())
        .bind(&dto.title)
        .bind(&dto.subtitle)
        .bind(&dto.desc)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!(messages::FORM_NOT_FOUND)))?;

        info!(form.uid = %uid, "Lesson form details updated");
        Self::to_view(db, form).await
    }

    /// Copies a form under a new uid. The copy starts closed.
    #[instrument(skip(db, ctx), fields(db.operation = "INSERT", db.table = "lesson_forms"))]
    pub async fn clone_form(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        uid: &str,
    ) -> Result<LessonFormView, AppError> {
        ctx.authorize_branch(branch)?;
        let source = Self::find_form(db, branch, uid).await?;

        let form = sqlx::query_as::<_, LessonForm>(&format!(
            r#"INSERT INTO lesson_forms (uid, branch, "group", active, date, name, title, subtitle, "desc", qa)
               VALUES ($1, $2, $3, FALSE, NOW(), $4, $5, $6, $7, $8)
               RETURNING {FORM_COLUMNS}"#
        ))
        .bind(generate_uid())
        .bind(branch)
        .bind(&source.group)
        .bind(format!("{}{}", source.name, messages::COPY_SUFFIX))
        .bind(&source.title)
        .bind(&source.subtitle)
        .bind(&source.desc)
        .bind(&source.qa)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(form.uid = %uid, error = %e, "Database error cloning lesson form");
            AppError::from(e)
        })?;

        info!(form.uid = %uid, clone.uid = %form.uid, "Lesson form cloned");
        Self::to_view(db, form).await
    }

    #[instrument(skip(db, ctx), fields(db.operation = "DELETE", db.table = "lesson_forms"))]
    pub async fn delete_form(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        uid: &str,
    ) -> Result<MessageResponse, AppError> {
        ctx.authorize_branch(branch)?;

        let result = sqlx::query("DELETE FROM lesson_forms WHERE uid = $1 AND branch = $2")
            .bind(uid)
            .bind(branch)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!(messages::FORM_NOT_FOUND)));
        }

        info!(form.uid = %uid, "Lesson form deleted");
        Ok(MessageResponse::new(messages::DELETED))
    }
}

pub struct RegistrationService;

impl RegistrationService {
    /// Public sign-up to a lesson through an active form of `branch`.
    #[instrument(skip(db, dto), fields(form.uid = %dto.form_id, db.operation = "INSERT", db.table = "lesson_registrations"))]
    pub async fn register(
        db: &PgPool,
        branch: &str,
        dto: RegisterLessonDto,
    ) -> Result<MessageResponse, AppError> {
        let form = LessonFormService::find_form(db, branch, &dto.form_id).await?;
        if !form.active {
            warn!(form.uid = %form.uid, "Registration to a closed form");
            return Err(AppError::bad_request(anyhow!(messages::FORM_INACTIVE)));
        }

        let answers =
            check_answers(&form.qa, &dto.data).map_err(|msg| AppError::bad_request(anyhow!(msg)))?;

        let groups = fetch_groups(db, branch, false).await?;
        let group_name = group_name(&groups, &form.group).unwrap_or_default();

        sqlx::query(
            r#"INSERT INTO lesson_registrations
                   (branch, lesson_date_time, form_id, "group", group_name, grade, teacher, data)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(branch)
        .bind(dto.lesson_date_time)
        .bind(&form.uid)
        .bind(&form.group)
        .bind(&group_name)
        .bind(&dto.grade)
        .bind(Json(&dto.teacher))
        .bind(Json(&answers))
        .execute(db)
        .await
        .map_err(|e| {
            error!(form.uid = %form.uid, error = %e, "Database error saving registration");
            AppError::from(e)
        })?;

        mashar_observability::track_lesson_registered(branch);
        info!(form.uid = %form.uid, branch = %branch, "Lesson registration saved");

        Ok(MessageResponse::new(messages::REGISTERED))
    }

    /// Registrations with a lesson time in the range. `teacher_email`
    /// narrows the list to lessons given (or taken over) by that teacher.
    #[instrument(skip(db, ctx, range), fields(db.operation = "SELECT", db.table = "lesson_registrations"))]
    pub async fn list_registrations(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        range: RegistrationRangeDto,
        teacher_email: Option<&str>,
    ) -> Result<Vec<LessonRegistration>, AppError> {
        ctx.authorize_branch(branch)?;

        let registrations = sqlx::query_as::<_, LessonRegistration>(&format!(
            r#"SELECT {REGISTRATION_COLUMNS} FROM lesson_registrations
               WHERE branch = $1 AND lesson_date_time BETWEEN $2 AND $3
                 AND ($4::text IS NULL OR "group" = $4)
                 AND ($5::text IS NULL OR teacher->>'email' = $5 OR cur_teacher->>'email' = $5)
               ORDER BY lesson_date_time ASC, created_at ASC"#
        ))
        .bind(branch)
        .bind(range.from)
        .bind(range.to)
        .bind(range.group.as_deref())
        .bind(teacher_email)
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching registrations");
            AppError::from(e)
        })?;

        debug!(branch = %branch, count = registrations.len(), "Fetched registrations");
        Ok(registrations)
    }

    #[instrument(skip(db, ctx), fields(db.operation = "DELETE", db.table = "lesson_registrations"))]
    pub async fn delete_one(
        db: &PgPool,
        ctx: &ScopeContext,
        id: RegistrationId,
    ) -> Result<MessageResponse, AppError> {
        let branch = (!ctx.is_superadmin()).then_some(ctx.branch.as_str());

        let result = sqlx::query(
            "DELETE FROM lesson_registrations WHERE id = $1 AND ($2::text IS NULL OR branch = $2)",
        )
        .bind(id)
        .bind(branch)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!(messages::REGISTRATION_NOT_FOUND)));
        }

        info!(registration.id = %id, "Registration deleted");
        Ok(MessageResponse::new(messages::DELETED))
    }

    /// Removes every registration of one teacher's lesson slot.
    #[instrument(skip(db, ctx), fields(db.operation = "DELETE", db.table = "lesson_registrations"))]
    pub async fn delete_slot(
        db: &PgPool,
        ctx: &ScopeContext,
        branch: &str,
        group: &str,
        lesson_date_time: DateTime<Utc>,
        email: &str,
    ) -> Result<MessageResponse, AppError> {
        ctx.authorize_branch(branch)?;

        let result = sqlx::query(
            r#"DELETE FROM lesson_registrations
               WHERE branch = $1 AND "group" = $2 AND lesson_date_time = $3
                 AND (teacher->>'email' = $4 OR cur_teacher->>'email' = $4)"#,
        )
        .bind(branch)
        .bind(group)
        .bind(lesson_date_time)
        .bind(email)
        .execute(db)
        .await?;

        info!(branch = %branch, group = %group, removed = result.rows_affected(), "Lesson slot cleared");
        Ok(MessageResponse::new(messages::DELETED))
    }

    /// Deletes registrations of a branch; `old_only` keeps lessons still ahead.
    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "lesson_registrations"))]
    pub async fn purge(db: &PgPool, branch: &str, old_only: bool) -> Result<MessageResponse, AppError> {
        let result = sqlx::query(
            "DELETE FROM lesson_registrations
             WHERE branch = $1 AND (NOT $2 OR lesson_date_time < NOW())",
        )
        .bind(branch)
        .bind(old_only)
        .execute(db)
        .await
        .map_err(|e| {
            error!(branch = %branch, error = %e, "Database error purging registrations");
            AppError::from(e)
        })?;

        warn!(branch = %branch, old_only, removed = result.rows_affected(), "Registrations purged");
        Ok(MessageResponse::new(messages::DELETED))
    }
}
