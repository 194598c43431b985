use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::ExamId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExamQuestion {
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub subsection: String,
    #[serde(default)]
    pub max_grade: f64,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: ExamId,
    pub branch: String,
    pub name: String,
    #[schema(value_type = Vec<String>)]
    pub subject: Json<Vec<String>>,
    pub year: String,
    pub link: String,
    pub class_grade: String,
    pub period: String,
    #[schema(value_type = Vec<ExamQuestion>)]
    pub questions: Json<Vec<ExamQuestion>>,
    pub comments: String,
    pub date: Option<DateTime<Utc>>,
    /// Sitting number (first attempt, resit, ...)
    pub chance: String,
    pub is_private: bool,
    pub eval_type: String,
    /// External reference (bank id, ministry code)
    #[serde(rename = "ref")]
    pub reference: String,
    /// Username of the author
    pub created_by: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExamDto {
    #[validate(length(min = 1, max = 200, message = "Exam name is required"))]
    pub name: String,
    #[serde(default)]
    pub subject: Vec<String>,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub class_grade: String,
    #[serde(default)]
    pub period: String,
    #[serde(default, alias = "grades")]
    pub questions: Vec<ExamQuestion>,
    #[serde(default)]
    pub comments: String,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub chance: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub eval_type: String,
    #[serde(default, rename = "ref")]
    pub reference: String,
}

/// Typed exam search. Every field is optional; set fields are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExamFilter {
    pub year: Option<String>,
    /// Matches exams whose subject list contains this subject
    pub subject: Option<String>,
    pub class_grade: Option<String>,
    pub period: Option<String>,
    pub eval_type: Option<String>,
    pub chance: Option<String>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub is_private: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CloneExamDto {
    pub id: ExamId,
}
