use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic acknowledgement body: `{"msg": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// A weekly lesson slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonTiming {
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: i32,
    /// `HH:MM`
    pub time: String,
    /// Minutes
    #[serde(default)]
    pub duration: i32,
}

/// Optional `?branch=` filter; only superadmins may name a branch other than their own.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct BranchQuery {
    pub branch: Option<String>,
}

/// Liveness report of the API and its database.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok` when the process answers
    pub status: String,
    /// `connected` or `disconnected`
    pub database: String,
}
