use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Branch {
    pub code: String,
    pub name: String,
}

/// A branch plus whether any game or user still references it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BranchWithUsage {
    pub code: String,
    pub name: String,
    pub used: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBranchDto {
    #[validate(length(min = 1, max = 100, message = "Branch name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Branch code is required"))]
    pub code: String,
}
