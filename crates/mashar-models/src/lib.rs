//! # Mashar Models
//!
//! Persisted records, nested documents and request/response DTOs.
//!
//! Nested arrays (riddles, attempts, lesson plans, questions...) are stored as
//! JSONB and surface here as [`sqlx::types::Json`] fields. JSON on the wire is
//! camelCase to match the front-end.
//!
//! # Modules
//!
//! - [`ids`]: UUID newtypes for row identifiers
//! - [`common`]: shared small documents and responses
//! - [`users`], [`branches`], [`games`], [`schools`], [`classes`],
//!   [`templates`], [`exams`], [`holidays`], [`lessons`], [`playlists`]

pub mod branches;
pub mod classes;
pub mod common;
pub mod exams;
pub mod games;
pub mod holidays;
pub mod ids;
pub mod lessons;
pub mod playlists;
pub mod schools;
pub mod templates;
pub mod users;

pub use common::{BranchQuery, HealthResponse, LessonTiming, MessageResponse};
pub use games::{
    Attempt, Game, GameStatusRecord, GameStatusView, Riddle, Team, TeamData, TeamProgress,
};
pub use users::{User, UserCredentials, UserLesson};
