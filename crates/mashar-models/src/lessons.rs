//! Lesson groups, registration forms and registrations.
//!
//! Students (anonymous) open an active form of their branch, pick a lesson
//! slot offered by a teacher of the form's group and submit their answers.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use mashar_core::PaginationMeta;
use mashar_core::serde::deserialize_bool_or_string;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::ids::RegistrationId;

/// uid sent by the client for "create a new one".
pub const NEW_ENTITY_UID: &str = "-1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonGroup {
    pub gid: String,
    pub name: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default = "default_true", deserialize_with = "deserialize_bool_or_string")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonGroupDto {
    /// `-1` (or absent) creates a new group
    #[serde(default)]
    pub gid: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Group name is required"))]
    pub name: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default = "default_true", deserialize_with = "deserialize_bool_or_string")]
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SaveLessonGroupsDto {
    #[validate(nested)]
    pub groups: Vec<LessonGroupDto>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedLessonGroupsResponse {
    pub data: Vec<LessonGroup>,
    pub meta: PaginationMeta,
}

/// Groups of a branch together with one teacher's availability.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub groups: Vec<LessonGroup>,
    pub user: Option<crate::users::TeacherSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Select,
    Checkbox,
    Radio,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuestionOption {
    pub value: String,
    pub option: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuestionValidation {
    #[serde(default)]
    pub required: bool,
    pub minlength: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Question {
    pub qid: String,
    pub q: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub validation: QuestionValidation,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonForm {
    pub uid: String,
    pub branch: String,
    /// Lesson group id
    pub group: String,
    pub active: bool,
    pub date: DateTime<Utc>,
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub desc: String,
    #[schema(value_type = Vec<Question>)]
    pub qa: Json<Vec<Question>>,
}

/// A form as listed or opened by clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonFormView {
    pub uid: String,
    pub name: String,
    pub active: bool,
    pub branch_code: String,
    pub branch: String,
    pub date: String,
    pub group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub desc: String,
    pub qa: Vec<Question>,
}

fn validate_unique_qids(qa: &[Question]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if qa.iter().all(|q| seen.insert(q.qid.as_str())) {
        Ok(())
    } else {
        let mut err = ValidationError::new("duplicate_qid");
        err.message = Some("Question ids must be unique".into());
        Err(err)
    }
}

/// Create or replace a form including its questions.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveFormDto {
    /// `-1` creates a new form
    pub uid: String,
    #[validate(length(min = 1, max = 200, message = "Form name is required"))]
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub active: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub desc: String,
    /// Questions; an empty list is rejected
    #[serde(alias = "form")]
    #[validate(
        length(min = 1, message = "Please fill in all fields"),
        custom(function = "validate_unique_qids")
    )]
    pub qa: Vec<Question>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormDetailsDto {
    #[validate(length(min = 1, max = 200, message = "Form name is required"))]
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub active: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeacherRef {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Answer {
    pub qid: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonRegistration {
    pub id: RegistrationId,
    pub branch: String,
    pub lesson_date_time: DateTime<Utc>,
    pub form_id: String,
    pub group: String,
    pub group_name: String,
    pub grade: String,
    #[schema(value_type = TeacherRef)]
    pub teacher: Json<TeacherRef>,
    /// Teacher currently assigned, if reassigned after registration
    #[schema(value_type = Option<TeacherRef>)]
    pub cur_teacher: Option<Json<TeacherRef>>,
    #[schema(value_type = Vec<Answer>)]
    pub data: Json<Vec<Answer>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLessonDto {
    #[validate(length(min = 1, message = "Form is required"))]
    pub form_id: String,
    pub lesson_date_time: DateTime<Utc>,
    #[serde(default)]
    pub grade: String,
    pub teacher: TeacherRef,
    #[serde(default)]
    pub data: Vec<Answer>,
}

/// Registrations whose lesson time falls in `[from, to]`, optionally for one group.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegistrationRangeDto {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    #[serde(default)]
    pub group: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(qid: &str) -> Question {
        Question {
            qid: qid.to_string(),
            q: "Name?".to_string(),
            kind: QuestionType::Text,
            options: vec![],
            validation: QuestionValidation::default(),
        }
    }

    fn form(qa: Vec<Question>) -> SaveFormDto {
        SaveFormDto {
            uid: NEW_ENTITY_UID.to_string(),
            name: "Spring".to_string(),
            group: "g1".to_string(),
            active: true,
            title: String::new(),
            subtitle: String::new(),
            desc: String::new(),
            qa,
        }
    }

    #[test]
    fn test_empty_form_is_rejected() {
        assert!(form(vec![]).validate().is_err());
    }

    #[test]
    fn test_duplicate_qids_are_rejected() {
        assert!(form(vec![question("a"), question("a")]).validate().is_err());
        assert!(form(vec![question("a"), question("b")]).validate().is_ok());
    }

    #[test]
    fn test_question_type_field_name() {
        let q: Question =
            serde_json::from_str(r#"{"qid":"q1","q":"Grade","type":"radio","options":[{"value":"10","option":"10th"}]}"#)
                .unwrap();
        assert_eq!(q.kind, QuestionType::Radio);
        assert!(!q.validation.required);
    }

    #[test]
    fn test_group_active_accepts_string() {
        let g: LessonGroup =
            serde_json::from_str(r#"{"gid":"a1","name":"Robotics","active":"false"}"#).unwrap();
        assert!(!g.active);
        let g: LessonGroup = serde_json::from_str(r#"{"gid":"a1","name":"Robotics"}"#).unwrap();
        assert!(g.active);
    }
}
