//! Users, credentials and teacher lesson availability.

use chrono::{DateTime, Utc};
use mashar_auth::Role;
use mashar_core::PaginationMeta;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::LessonTiming;
use crate::ids::UserId;

/// Lesson groups a teacher is available for, with their weekly slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserLesson {
    /// Lesson group id (`gid`)
    pub group: String,
    #[serde(default)]
    pub timing: Vec<LessonTiming>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub email: String,
    pub branch: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[schema(value_type = Vec<UserLesson>)]
    pub lessons: Json<Vec<UserLesson>>,
    pub created_at: DateTime<Utc>,
}

/// The subset of a user row needed to authenticate.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub branch: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
}

/// Public teacher listing used by the lesson registration form.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub username: String,
    pub name: String,
    pub email: String,
    #[schema(value_type = Vec<UserLesson>)]
    pub lessons: Json<Vec<UserLesson>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// New user. Field rules mirror the admin registration form.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserDto {
    #[validate(email(message = "Username must be an email address"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Branch is required"))]
    pub branch: String,
    pub role: Role,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangeRoleDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    pub role: Role,
}

/// Partial user update; absent fields are left untouched.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveUserDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    pub role: Option<Role>,
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetLessonsDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[serde(default)]
    pub lessons: Vec<UserLesson>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SaveLessonListDto {
    #[validate(nested)]
    pub users: Vec<SetLessonsDto>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserCountResponse {
    pub branch: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, password: &str, email: &str) -> RegisterUserDto {
        RegisterUserDto {
            username: username.to_string(),
            password: password.to_string(),
            name: "Dana".to_string(),
            branch: "ksv".to_string(),
            role: Role::Teacher,
            email: email.to_string(),
        }
    }

    #[test]
    fn test_register_accepts_valid_input() {
        assert!(register("dana@mashar.org", "secret1", "dana@mashar.org").validate().is_ok());
    }

    #[test]
    fn test_register_requires_email_username() {
        let errors = register("dana", "secret1", "dana@mashar.org")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_register_requires_six_char_password() {
        let errors = register("dana@mashar.org", "12345", "dana@mashar.org")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_register_requires_email() {
        let errors = register("dana@mashar.org", "secret1", "")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_save_user_skips_absent_fields() {
        let dto: SaveUserDto = serde_json::from_str(r#"{"username":"a@b.cd"}"#).unwrap();
        assert!(dto.validate().is_ok());

        let dto: SaveUserDto =
            serde_json::from_str(r#"{"username":"a@b.cd","password":"123"}"#).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_user_lesson_defaults_timing() {
        let lesson: UserLesson = serde_json::from_str(r#"{"group":"g1"}"#).unwrap();
        assert!(lesson.timing.is_empty());
    }
}
