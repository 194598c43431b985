use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::SchoolId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchoolContact {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: SchoolId,
    pub branch: String,
    pub name: String,
    pub start_year: Option<DateTime<Utc>>,
    pub end_year: Option<DateTime<Utc>>,
    pub end_semester: Option<DateTime<Utc>>,
    pub sector: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    /// Holiday calendar this school follows
    pub holiday_id: Option<String>,
    #[schema(value_type = Vec<SchoolContact>)]
    pub people: Json<Vec<SchoolContact>>,
}

/// Body of both create and update.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchoolDto {
    #[validate(length(min = 1, max = 200, message = "School name is required"))]
    pub name: String,
    pub start_year: Option<DateTime<Utc>>,
    pub end_year: Option<DateTime<Utc>>,
    pub end_semester: Option<DateTime<Utc>>,
    pub sector: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub holiday_id: Option<String>,
    #[serde(default)]
    pub people: Vec<SchoolContact>,
}
