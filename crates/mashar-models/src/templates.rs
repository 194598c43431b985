//! Reusable annual-plan templates.
//!
//! Updates are compare-and-swap on `version`: a client must send back the
//! version it loaded, and a stale version is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::Validate;

use crate::classes::PlanItem;
use crate::ids::TemplateId;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanTemplate {
    pub id: TemplateId,
    pub branch: String,
    pub name: String,
    pub grade: String,
    pub version: i32,
    #[schema(value_type = Vec<PlanItem>)]
    pub template: Json<Vec<PlanItem>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateDto {
    #[validate(length(min = 1, max = 100, message = "Template name is required"))]
    pub name: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub template: Vec<PlanItem>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateDto {
    #[validate(length(min = 1, max = 100, message = "Template name is required"))]
    pub name: String,
    #[serde(default)]
    pub grade: String,
    /// The version the client loaded
    pub version: i32,
    #[serde(default)]
    pub template: Vec<PlanItem>,
}
