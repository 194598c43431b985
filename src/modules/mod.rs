//! Feature modules. Each one has a `service` with the business rules, a
//! `controller` with the HTTP handlers and a `router`.

pub mod auth;
pub mod branches;
pub mod classes;
pub mod exams;
pub mod games;
pub mod health;
pub mod holidays;
pub mod lessons;
pub mod playlists;
pub mod schools;
pub mod templates;
pub mod users;
