//! Classes: a teacher's group for a school year, with its weekly lessons,
//! annual plan and student roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::LessonTiming;
use crate::ids::ClassId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkCheck {
    #[serde(default)]
    pub student: String,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub comments: String,
    pub grade: Option<f64>,
}

/// One row of an annual plan (also the row type of plan templates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub name: String,
    pub when: Option<DateTime<Utc>>,
    /// Minutes
    pub duration: Option<i32>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub contents: String,
    #[serde(default)]
    pub homework: String,
    #[serde(default)]
    pub homework_monitoring: Vec<HomeworkCheck>,
    #[serde(default)]
    pub has_experiment: bool,
    /// Lesson, exam, holiday, cancelled, ...
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub equip: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub is_done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub etype: String,
    pub exam_id: Option<String>,
    pub grade: Option<f64>,
    #[serde(default)]
    pub grade_text: String,
    #[serde(default)]
    pub question_grades: Vec<f64>,
    #[serde(default)]
    pub active: bool,
    pub when: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassStudent {
    pub name: String,
    #[serde(default)]
    pub status: String,
    /// `m` or `f`
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub class_num: String,
    #[serde(default)]
    pub benefits: String,
    #[serde(default)]
    pub majors: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub evaluation: Vec<Evaluation>,
    #[serde(default)]
    pub finals: Vec<Evaluation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: ClassId,
    pub branch: String,
    /// Username of the owning teacher
    pub teacher: String,
    pub year: String,
    pub name: String,
    pub grade: String,
    pub comments: String,
    #[schema(value_type = Vec<String>)]
    pub schools: Json<Vec<String>>,
    #[schema(value_type = Vec<LessonTiming>)]
    pub lessons: Json<Vec<LessonTiming>>,
    #[schema(value_type = Vec<PlanItem>)]
    pub plan: Json<Vec<PlanItem>>,
    #[schema(value_type = Vec<ClassStudent>)]
    pub students: Json<Vec<ClassStudent>>,
    pub updated_at: DateTime<Utc>,
}

/// List row without the heavy plan/student documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub id: ClassId,
    pub teacher: String,
    pub year: String,
    pub name: String,
    pub grade: String,
    #[schema(value_type = Vec<String>)]
    pub schools: Json<Vec<String>>,
    #[schema(value_type = Vec<LessonTiming>)]
    pub lessons: Json<Vec<LessonTiming>>,
}

/// `?teacher=` filter of the class list.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ClassQuery {
    pub teacher: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassDto {
    #[validate(length(min = 1, max = 100, message = "Class name is required"))]
    pub name: String,
    /// Defaults to the caller for teachers
    pub teacher: Option<String>,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default, alias = "school")]
    pub schools: Vec<String>,
    #[serde(default)]
    pub lessons: Vec<LessonTiming>,
    #[serde(default)]
    pub plan: Vec<PlanItem>,
    #[serde(default)]
    pub students: Vec<ClassStudent>,
}
