//! Lesson groups, registration forms and student registrations.

pub mod controller;
pub mod forms;
pub mod groups;
pub mod router;
pub mod service;

pub use router::init_lessons_router;
